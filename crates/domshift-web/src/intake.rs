#![forbid(unsafe_code)]

//! JS values into [`RawValue`] records.
//!
//! Only plain objects (prototype `Object.prototype` or `null`) become
//! records; class instances, arrays, and functions keep just their type name
//! so shape errors read the same as for any other non-record value.

use domshift_core::RawValue;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

fn is_plain_object(value: &JsValue) -> bool {
    if !value.is_object() || Array::is_array(value) {
        return false;
    }
    let proto = Object::get_prototype_of(value);
    let object_proto = Object::get_prototype_of(&Object::new().into());
    proto.is_null() || proto == object_proto
}

fn type_name(value: &JsValue) -> String {
    if value.is_null() {
        return "null".to_string();
    }
    if Array::is_array(value) {
        return "array".to_string();
    }
    value
        .js_typeof()
        .as_string()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Lift one JS value.
#[must_use]
pub fn raw_value(value: &JsValue) -> RawValue<Element> {
    if let Some(element) = value.dyn_ref::<Element>() {
        return RawValue::Element(element.clone());
    }
    if let Some(number) = value.as_f64() {
        return RawValue::Number(number);
    }
    if !is_plain_object(value) {
        return RawValue::Other(type_name(value));
    }
    let entries = Object::keys(value.unchecked_ref::<Object>())
        .iter()
        .filter_map(|key| {
            let name = key.as_string()?;
            let field = Reflect::get(value, &key).unwrap_or(JsValue::UNDEFINED);
            Some((name, raw_value(&field)))
        })
        .collect();
    RawValue::Record(entries)
}
