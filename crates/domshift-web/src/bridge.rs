#![forbid(unsafe_code)]

//! Mapping between engine values and their JS-facing shape.

use domshift_core::{ErrorKind, RelocateError, Threshold};

/// JS error constructor used to surface a construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JsErrorClass {
    TypeError,
    RangeError,
    Error,
}

impl From<ErrorKind> for JsErrorClass {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Config => Self::TypeError,
            ErrorKind::Range => Self::RangeError,
            ErrorKind::Dom => Self::Error,
        }
    }
}

/// Error class and message for `err`.
pub(crate) fn js_error_parts(err: &RelocateError) -> (JsErrorClass, String) {
    (err.kind().into(), err.to_string())
}

/// `activeThreshold()` result: a pixel value or the `"default"` marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ThresholdKey {
    Width(f64),
    Default,
}

impl From<Threshold> for ThresholdKey {
    fn from(threshold: Threshold) -> Self {
        match threshold {
            Threshold::Width(px) => Self::Width(px.get()),
            Threshold::Default => Self::Default,
        }
    }
}

pub(crate) const DEFAULT_KEY: &str = "default";

#[cfg(test)]
mod tests {
    use super::*;
    use domshift_core::{ConfigError, DomError, Px, RangeError};
    use pretty_assertions::assert_eq;

    #[test]
    fn error_classes() {
        let config = RelocateError::from(ConfigError::NoSpecs);
        let range = RelocateError::from(RangeError::PositionExceedsChildren {
            position: 4,
            max: 1,
        });
        let dom = RelocateError::from(DomError::new("HierarchyRequestError"));

        assert_eq!(js_error_parts(&config).0, JsErrorClass::TypeError);
        assert_eq!(
            js_error_parts(&range),
            (
                JsErrorClass::RangeError,
                "'targetPosition' 4 exceeds the maximum allowed value of '1'".to_string()
            )
        );
        assert_eq!(js_error_parts(&dom).0, JsErrorClass::Error);
    }

    #[test]
    fn threshold_keys() {
        let px = Px::new(768.0).unwrap();
        assert_eq!(ThresholdKey::from(Threshold::Width(px)), ThresholdKey::Width(768.0));
        assert_eq!(ThresholdKey::from(Threshold::Default), ThresholdKey::Default);
    }
}
