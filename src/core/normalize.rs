//! Key normalization for parameter trees.
//!
//! Two entry families:
//! - string-keyed trees (`Params`, `serde_json::Value`) are folded in place
//! - arbitrary-keyed trees (`RawValue`, i.e. YAML-shaped data whose map keys
//!   may be integers, bools, null...) are rebuilt into new canonical nodes,
//!   moving the owned values across
//!
//! In both cases every map reachable through maps, or through a sequence
//! directly holding maps, ends up with lower-cased string keys. Other
//! sequence elements are carried through as they are.

use crate::params::{Params, StringMap};
use serde_json::Value;

/// Heterogeneous input tree. Mapping keys may be any YAML value.
pub type RawValue = serde_yml::Value;

/// A map key before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawKey<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// Sequences and mappings used as keys.
    Other(&'a RawValue),
}

impl<'a> RawKey<'a> {
    pub fn classify(key: &'a RawValue) -> Self {
        match key {
            RawValue::String(s) => RawKey::Str(s),
            RawValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawKey::Int(i)
                } else if let Some(u) = n.as_u64() {
                    RawKey::UInt(u)
                } else {
                    n.as_f64().map_or(RawKey::Other(key), RawKey::Float)
                }
            }
            RawValue::Bool(b) => RawKey::Bool(*b),
            RawValue::Null => RawKey::Null,
            RawValue::Tagged(tagged) => RawKey::classify(&tagged.value),
            RawValue::Sequence(_) | RawValue::Mapping(_) => RawKey::Other(key),
        }
    }

    /// String form of the key with its original casing.
    pub fn to_plain_string(&self) -> String {
        match self {
            RawKey::Str(s) => (*s).to_string(),
            RawKey::Int(i) => i.to_string(),
            RawKey::UInt(u) => u.to_string(),
            RawKey::Float(f) => f.to_string(),
            RawKey::Bool(b) => b.to_string(),
            RawKey::Null => String::new(),
            RawKey::Other(value) => {
                serde_json::to_string(&plain_json((*value).clone())).unwrap_or_default()
            }
        }
    }

    /// The key as it appears in `Params`.
    pub fn canonical(&self) -> String {
        self.to_plain_string().to_lowercase()
    }
}

/// Fold every key of `params` in place, at every depth.
pub fn prepare_params(params: &mut Params) {
    fold_map(params.as_map_mut());
}

/// Fold a JSON tree in place.
///
/// Objects are folded at every depth; a top-level array gets its object
/// elements folded. Scalars are left alone.
pub fn normalize_json(value: &mut Value) {
    match value {
        Value::Object(map) => fold_map(map),
        Value::Array(items) => fold_sequence(items),
        _ => {}
    }
}

/// Rebuild an arbitrary-keyed tree in canonical JSON form.
pub fn normalize_raw(raw: RawValue) -> Value {
    match raw {
        RawValue::Mapping(mapping) => Value::Object(canonical_map(mapping)),
        RawValue::Sequence(items) => Value::Array(canonical_sequence(items)),
        RawValue::Tagged(tagged) => normalize_raw(tagged.value),
        scalar => scalar_json(scalar),
    }
}

fn fold_map(map: &mut StringMap) {
    if map.keys().all(|key| is_folded(key)) {
        map.values_mut().for_each(fold_value);
        return;
    }

    // serde_json maps cannot rename a key in place; re-insert everything.
    for (key, mut value) in std::mem::take(map) {
        fold_value(&mut value);
        map.insert(key.to_lowercase(), value);
    }
}

fn fold_value(value: &mut Value) {
    match value {
        Value::Object(map) => fold_map(map),
        Value::Array(items) => fold_sequence(items),
        _ => {}
    }
}

fn fold_sequence(items: &mut [Value]) {
    for item in items {
        if let Value::Object(map) = item {
            fold_map(map);
        }
    }
}

fn is_folded(key: &str) -> bool {
    !key.chars().any(|c| c.to_lowercase().ne(std::iter::once(c)))
}

pub(crate) fn canonical_map(mapping: serde_yml::Mapping) -> StringMap {
    let mut map = StringMap::new();
    for (key, value) in mapping {
        map.insert(RawKey::classify(&key).canonical(), canonical_nested(value));
    }
    map
}

fn canonical_nested(value: RawValue) -> Value {
    match value {
        RawValue::Mapping(mapping) => Value::Object(canonical_map(mapping)),
        RawValue::Sequence(items) => Value::Array(canonical_sequence(items)),
        RawValue::Tagged(tagged) => canonical_nested(tagged.value),
        scalar => scalar_json(scalar),
    }
}

fn canonical_sequence(items: Vec<RawValue>) -> Vec<Value> {
    items
        .into_iter()
        .map(|item| match untag(item) {
            RawValue::Mapping(mapping) => Value::Object(canonical_map(mapping)),
            other => plain_json(other),
        })
        .collect()
}

/// Structural conversion with keys stringified but not folded.
pub(crate) fn plain_json(raw: RawValue) -> Value {
    match raw {
        RawValue::Mapping(mapping) => Value::Object(plain_map(mapping)),
        RawValue::Sequence(items) => Value::Array(items.into_iter().map(plain_json).collect()),
        RawValue::Tagged(tagged) => plain_json(tagged.value),
        scalar => scalar_json(scalar),
    }
}

pub(crate) fn plain_map(mapping: serde_yml::Mapping) -> StringMap {
    let mut map = StringMap::new();
    for (key, value) in mapping {
        map.insert(RawKey::classify(&key).to_plain_string(), plain_json(value));
    }
    map
}

pub(crate) fn untag(raw: RawValue) -> RawValue {
    match raw {
        RawValue::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

fn scalar_json(scalar: RawValue) -> Value {
    match scalar {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::String(s) => Value::String(s),
        RawValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                // NaN and infinities have no JSON form.
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        other => plain_json(other),
    }
}

/// Lift a JSON tree into the heterogeneous model.
pub fn raw_from_json(value: Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(b),
        Value::String(s) => RawValue::String(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                RawValue::Number(u.into())
            } else {
                RawValue::Number(n.as_f64().unwrap_or(f64::NAN).into())
            }
        }
        Value::Array(items) => RawValue::Sequence(items.into_iter().map(raw_from_json).collect()),
        Value::Object(map) => {
            let mut mapping = serde_yml::Mapping::new();
            for (key, value) in map {
                mapping.insert(RawValue::String(key), raw_from_json(value));
            }
            RawValue::Mapping(mapping)
        }
    }
}

/// Short type label used in diagnostics.
pub fn raw_type_name(raw: &RawValue) -> &'static str {
    match raw {
        RawValue::Null => "null",
        RawValue::Bool(_) => "bool",
        RawValue::Number(_) => "number",
        RawValue::String(_) => "string",
        RawValue::Sequence(_) => "sequence",
        RawValue::Mapping(_) => "mapping",
        RawValue::Tagged(tagged) => raw_type_name(&tagged.value),
    }
}
