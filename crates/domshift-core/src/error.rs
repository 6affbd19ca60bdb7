#![forbid(unsafe_code)]

//! Error taxonomy for relocation construction.
//!
//! Construction either succeeds completely or fails with one of these errors
//! and leaves the tree untouched. Runtime relocation never surfaces an error:
//! out-of-range positions append and host write failures are logged.

use thiserror::Error;

/// Largest integer a double can represent exactly (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Structural, shape, or identity violation in caller-supplied specs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one relocation spec must be supplied")]
    NoSpecs,
    #[error("{what} must be a plain record, got {found}")]
    NotARecord { what: &'static str, found: String },
    #[error("the '{key}' parameter is not specified for the {owner} object")]
    MissingKey {
        key: &'static str,
        owner: &'static str,
    },
    #[error("the value of '{key}' must be an element, got {found}")]
    NotAnElement { key: &'static str, found: String },
    #[error("only one spec may use the source element '{element}'")]
    DuplicateSource { element: String },
    #[error("at least one breakpoint must be specified for '{element}'")]
    EmptyBreakpoints { element: String },
    #[error("breakpoint {threshold}px is specified twice for '{element}'")]
    DuplicateThreshold { threshold: f64, element: String },
    #[error("'targetElement' must be different from the source element '{element}'")]
    TargetIsSource { element: String },
    #[error("'targetElement' '{target}' is a descendant of the source element '{element}'")]
    TargetInsideSource { target: String, element: String },
    #[error("'targetElement' '{target}' cannot contain children")]
    VoidTarget { target: String },
    #[error("'targetPosition' must be a number, got {found}")]
    PositionNotANumber { found: String },
    #[error("source element '{element}' has no parent to restore to")]
    Detached { element: String },
    #[error("no element with id '{id}'")]
    UnknownElementId { id: String },
    #[error("invalid relocation config: {message}")]
    InvalidJson { message: String },
}

/// Numeric-range violation in thresholds or positions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error(
        "breakpoint '{key}' must be a safe (integer or fractional) number greater than zero"
    )]
    InvalidThreshold { key: String },
    #[error("'targetPosition' {value} must be a non-negative safe integer")]
    InvalidPosition { value: f64 },
    #[error("'targetPosition' {position} exceeds the maximum allowed value of '{max}'")]
    PositionExceedsChildren { position: usize, max: usize },
}

/// A host tree refused a write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tree write failed: {message}")]
pub struct DomError {
    pub message: String,
}

impl DomError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Coarse classification of a [`RelocateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Range,
    Dom,
}

/// Any failure that aborts construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelocateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl RelocateError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Range(_) => ErrorKind::Range,
            Self::Dom(_) => ErrorKind::Dom,
        }
    }
}

pub type Result<T, E = RelocateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        assert_eq!(
            RelocateError::from(ConfigError::NoSpecs).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            RelocateError::from(RangeError::InvalidPosition { value: -1.0 }).kind(),
            ErrorKind::Range
        );
        assert_eq!(RelocateError::from(DomError::new("x")).kind(), ErrorKind::Dom);
    }

    #[test]
    fn range_message_names_maximum() {
        let err = RangeError::PositionExceedsChildren {
            position: 7,
            max: 3,
        };
        assert_eq!(
            err.to_string(),
            "'targetPosition' 7 exceeds the maximum allowed value of '3'"
        );
    }

    #[test]
    fn transparent_display() {
        let err = RelocateError::from(ConfigError::DuplicateSource {
            element: "<p id=\"a\"></p>".into(),
        });
        assert_eq!(
            err.to_string(),
            "only one spec may use the source element '<p id=\"a\"></p>'"
        );
    }
}
