#![forbid(unsafe_code)]

//! JSON relocation configs.
//!
//! A config is either a bare array of spec records or an object with a
//! `specs` array and the [`RelocatorOptions`] fields beside it:
//!
//! ```json
//! {
//!   "coverage": "retain",
//!   "specs": [
//!     { "sourceElement": "main-transfer-desc",
//!       "breakpoints": { "768": { "targetElement": "main-transfer-cont" } } }
//!   ]
//! }
//! ```
//!
//! Element references are `id` strings resolved against the tree. Every
//! other value is lifted into [`RawValue`] unchanged, so shape errors match
//! the ones reported for host records.

use serde_json::Value;

use crate::engine::{Relocator, RelocatorOptions};
use crate::error::{ConfigError, RelocateError};
use crate::raw::RawValue;
use crate::tree::ElementTree;

const ELEMENT_KEYS: [&str; 2] = ["sourceElement", "targetElement"];

/// A parsed config whose element ids are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationConfig<N> {
    pub options: RelocatorOptions,
    pub specs: Vec<RawValue<N>>,
}

impl<N: Clone + PartialEq + std::fmt::Debug> RelocationConfig<N> {
    /// Parse `text` and resolve element ids through `tree`.
    pub fn from_json<T: ElementTree<Node = N>>(tree: &T, text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text).map_err(|err| ConfigError::InvalidJson {
            message: err.to_string(),
        })?;
        Self::from_value(tree, value)
    }

    pub fn from_value<T: ElementTree<Node = N>>(tree: &T, value: Value) -> Result<Self, ConfigError> {
        let (options, specs) = match value {
            Value::Array(specs) => (RelocatorOptions::default(), specs),
            Value::Object(mut map) => {
                let specs = match map.remove("specs") {
                    Some(Value::Array(specs)) => specs,
                    Some(other) => {
                        return Err(ConfigError::InvalidJson {
                            message: format!("'specs' must be an array, got {}", json_type(&other)),
                        });
                    }
                    None => {
                        return Err(ConfigError::MissingKey {
                            key: "specs",
                            owner: "config",
                        });
                    }
                };
                let options = serde_json::from_value(Value::Object(map)).map_err(|err| {
                    ConfigError::InvalidJson {
                        message: err.to_string(),
                    }
                })?;
                (options, specs)
            }
            other => {
                return Err(ConfigError::InvalidJson {
                    message: format!("expected an array or object, got {}", json_type(&other)),
                });
            }
        };
        let specs = specs
            .into_iter()
            .map(|spec| lift(tree, spec, None))
            .collect::<Result<_, _>>()?;
        Ok(Self { options, specs })
    }

    /// Build a relocator from this config.
    pub fn build<T: ElementTree<Node = N>>(self, tree: &mut T) -> Result<Relocator<N>, RelocateError> {
        Relocator::from_raw(tree, self.specs, self.options)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lift<T: ElementTree>(
    tree: &T,
    value: Value,
    key: Option<&str>,
) -> Result<RawValue<T::Node>, ConfigError> {
    let element_slot = key.is_some_and(|k| ELEMENT_KEYS.contains(&k));
    Ok(match value {
        Value::String(id) if element_slot => {
            let node = tree
                .element_by_id(&id)
                .ok_or(ConfigError::UnknownElementId { id })?;
            RawValue::Element(node)
        }
        Value::Number(n) => match n.as_f64() {
            Some(v) => RawValue::Number(v),
            None => RawValue::Other("number".to_string()),
        },
        Value::Object(map) => RawValue::Record(
            map.into_iter()
                .map(|(k, v)| lift(tree, v, Some(k.as_str())).map(|lifted| (k, lifted)))
                .collect::<Result<_, _>>()?,
        ),
        other => RawValue::Other(json_type(&other).to_string()),
    })
}
