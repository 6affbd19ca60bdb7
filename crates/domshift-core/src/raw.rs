#![forbid(unsafe_code)]

//! Dynamically-typed spec intake.
//!
//! Hosts that receive specs as loosely-typed records (JS objects, JSON) lift
//! them into [`RawValue`] and call [`validate_raw_specs`]. Shape checks
//! (records vs. other values, required keys, element references, numeric
//! fields) interleave with the tree checks of [`validate_spec`] so the first
//! fault in walk order decides the error kind.
//!
//! [`validate_spec`]: crate::spec::validate_spec
//!
//! Record keys keep their declaration order so the first offending entry is
//! the one reported.

use crate::error::{ConfigError, RelocateError};
use crate::spec::{
    PlacementRule, SpecBuilder, ValidatedSpec, check_position, check_target, check_unclaimed,
};
use crate::threshold::Px;
use crate::tree::ElementTree;

/// A loosely-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<N> {
    /// A plain key/value record.
    Record(Vec<(String, RawValue<N>)>),
    /// A reference to an element of the host tree.
    Element(N),
    Number(f64),
    /// Anything else, labelled with its host type name.
    Other(String),
}

impl<N> RawValue<N> {
    /// Build a record from `(key, value)` pairs.
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, RawValue<N>)>) -> Self {
        Self::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Host type label used in error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Record(_) => "object".to_string(),
            Self::Element(_) => "element".to_string(),
            Self::Number(_) => "number".to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    fn take_key(entries: &mut Vec<(String, RawValue<N>)>, key: &str) -> Option<RawValue<N>> {
        let index = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(index).1)
    }
}

fn expect_record<N>(
    value: RawValue<N>,
    what: &'static str,
) -> Result<Vec<(String, RawValue<N>)>, ConfigError> {
    match value {
        RawValue::Record(entries) => Ok(entries),
        other => Err(ConfigError::NotARecord {
            what,
            found: other.type_name(),
        }),
    }
}

fn expect_element<N>(value: RawValue<N>, key: &'static str) -> Result<N, ConfigError> {
    match value {
        RawValue::Element(node) => Ok(node),
        other => Err(ConfigError::NotAnElement {
            key,
            found: other.type_name(),
        }),
    }
}

fn parse_rule<T: ElementTree>(
    tree: &T,
    source: &T::Node,
    value: RawValue<T::Node>,
) -> Result<PlacementRule<T::Node>, RelocateError> {
    let mut entries = expect_record(value, "breakpoint object")?;
    let target = RawValue::take_key(&mut entries, "targetElement").ok_or(
        ConfigError::MissingKey {
            key: "targetElement",
            owner: "breakpoint",
        },
    )?;
    let target = expect_element(target, "targetElement")?;
    check_target(tree, source, &target)?;

    let position = match RawValue::take_key(&mut entries, "targetPosition") {
        None => 0,
        Some(RawValue::Number(value)) => check_position(value)?,
        Some(other) => {
            return Err(ConfigError::PositionNotANumber {
                found: other.type_name(),
            }
            .into());
        }
    };
    Ok(PlacementRule::new(target).at_position(position))
}

/// Lift and validate one raw record against the tree and the sources
/// claimed so far.
///
/// Checks run one entry at a time, so a record with several faults reports
/// the one an ordered walk reaches first: record shape, required keys,
/// source element, duplicate source, then per breakpoint the key, the rule
/// shape, the target and the position.
pub fn validate_raw_spec<T: ElementTree>(
    tree: &T,
    value: RawValue<T::Node>,
    claimed: &[T::Node],
) -> Result<ValidatedSpec<T::Node>, RelocateError> {
    let mut entries = expect_record(value, "relocation spec")?;
    for key in ["sourceElement", "breakpoints"] {
        if !entries.iter().any(|(k, _)| k == key) {
            return Err(ConfigError::MissingKey { key, owner: "main" }.into());
        }
    }
    let source = RawValue::take_key(&mut entries, "sourceElement").ok_or(
        ConfigError::MissingKey {
            key: "sourceElement",
            owner: "main",
        },
    )?;
    let source = expect_element(source, "sourceElement")?;
    check_unclaimed(tree, &source, claimed)?;

    let breakpoints = RawValue::take_key(&mut entries, "breakpoints").ok_or(
        ConfigError::MissingKey {
            key: "breakpoints",
            owner: "main",
        },
    )?;
    let breakpoints = expect_record(breakpoints, "'breakpoints'")?;
    if breakpoints.is_empty() {
        return Err(ConfigError::EmptyBreakpoints {
            element: tree.describe(&source),
        }
        .into());
    }

    let mut builder = SpecBuilder::new(source);
    for (key, value) in breakpoints {
        let px = Px::parse(&key)?;
        let rule = parse_rule(tree, builder.source(), value)?;
        builder.insert(tree, px, rule)?;
    }
    Ok(builder.finish(tree)?)
}

/// Validate every raw record in order; the first violation aborts.
pub fn validate_raw_specs<T: ElementTree>(
    tree: &T,
    values: Vec<RawValue<T::Node>>,
) -> Result<Vec<ValidatedSpec<T::Node>>, RelocateError> {
    if values.is_empty() {
        return Err(ConfigError::NoSpecs.into());
    }
    let mut claimed: Vec<T::Node> = Vec::with_capacity(values.len());
    let mut validated = Vec::with_capacity(values.len());
    for value in values {
        let spec = validate_raw_spec(tree, value, &claimed)?;
        claimed.push(spec.source.clone());
        validated.push(spec);
    }
    Ok(validated)
}
