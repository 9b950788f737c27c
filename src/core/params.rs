//! Canonical parameter maps.
//!
//! `Params` is the hand-off type between this crate and whatever consumes
//! configuration. Every key at every depth is lower-case, so consumers can
//! look values up with a plain exact match on the folded key.

use crate::normalize::{self, RawValue};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A string-keyed map with no casing guarantees.
pub type StringMap = serde_json::Map<String, Value>;

/// Map with lower-cased string keys at every depth.
///
/// Nested maps are stored as `Value::Object` nodes that satisfy the same
/// invariant. Keys enter through folding entry points (`insert`, `set`,
/// `merge`, `from_map`, deserialization, the normalizer); raw edits through
/// `get_mut` are the exception and need `prepare_params` afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(StringMap);

impl Params {
    pub fn new() -> Self {
        Self(StringMap::new())
    }

    /// Take ownership of a string-keyed map and fold it into canonical form.
    pub fn from_map(map: StringMap) -> Self {
        let mut params = Self(map);
        normalize::prepare_params(&mut params);
        params
    }

    /// Wrap a map the caller already knows is canonical.
    pub(crate) fn from_canonical(map: StringMap) -> Self {
        Self(map)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&key.to_lowercase())
    }

    /// Mutable access to the value under the folded key.
    ///
    /// Keys written into a nested object through this reference are not
    /// folded. Use `insert` or `set` for nested edits, or run
    /// `prepare_params` afterwards to restore lower-case keys.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_lowercase())
    }

    /// Walk nested maps one key at a time.
    ///
    /// Returns `None` as soon as a key is missing or an intermediate value
    /// is not a map. An empty path yields `None`.
    pub fn get_path<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        let mut current = self.get(first.as_ref())?;

        for key in rest {
            current = match current {
                Value::Object(map) => map.get(&key.as_ref().to_lowercase())?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Insert under the folded key. The value is normalized first.
    pub fn insert(&mut self, key: impl Into<String>, mut value: Value) -> Option<Value> {
        normalize::normalize_json(&mut value);
        self.0.insert(key.into().to_lowercase(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &StringMap {
        &self.0
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut StringMap {
        &mut self.0
    }

    pub fn into_map(self) -> StringMap {
        self.0
    }

    /// Deep overwrite: values from `other` replace ours, except that when
    /// both sides hold a map for the same key the two maps are combined
    /// the same way.
    pub fn set(&mut self, other: Params) {
        set_into(&mut self.0, other.0);
    }

    /// Deep fill: only keys missing here are taken from `other`. When both
    /// sides hold a map for the same key the maps are filled recursively.
    pub fn merge(&mut self, other: Params) {
        merge_into(&mut self.0, other.0);
    }
}

fn set_into(base: &mut StringMap, patch: StringMap) {
    for (key, value) in patch {
        match value {
            Value::Object(patch_obj) => match base.get_mut(&key) {
                Some(Value::Object(base_obj)) => set_into(base_obj, patch_obj),
                _ => {
                    base.insert(key, Value::Object(patch_obj));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn merge_into(base: &mut StringMap, patch: StringMap) {
    for (key, value) in patch {
        match base.get_mut(&key) {
            Some(Value::Object(base_obj)) => {
                if let Value::Object(patch_obj) = value {
                    merge_into(base_obj, patch_obj);
                }
            }
            Some(_) => {}
            None => {
                base.insert(key, value);
            }
        }
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        Value::Object(params.0)
    }
}

impl From<StringMap> for Params {
    fn from(map: StringMap) -> Self {
        Self::from_map(map)
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Params {
    /// Any serde source that yields a mapping deserializes straight into
    /// canonical form, whatever its key types.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawValue::deserialize(deserializer)?;
        let actual = normalize::raw_type_name(&raw);
        match crate::convert::to_params_and_prepare(Some(raw)) {
            (params, true) => Ok(params),
            (_, false) => Err(D::Error::custom(format!(
                "expected a mapping for params, found {}",
                actual
            ))),
        }
    }
}

/// Find `key` in the first candidate that has it.
///
/// The key is folded first. Every candidate is checked for a direct match
/// before any candidate is searched as a `separator`-delimited nested path,
/// so `"mymap.name"` prefers a literal `mymap.name` key anywhere over
/// `mymap` -> `name` in an earlier candidate.
pub fn get_nested_param<'a>(
    key: &str,
    separator: &str,
    candidates: &[&'a Params],
) -> Option<&'a Value> {
    let key = key.to_lowercase();

    if let Some(value) = candidates
        .iter()
        .copied()
        .find_map(|params| params.0.get(&key))
    {
        return Some(value);
    }

    if separator.is_empty() {
        return None;
    }

    let segments: Vec<&str> = key.split(separator).collect();
    candidates
        .iter()
        .copied()
        .find_map(|params| params.get_path(&segments))
}

/// Case-insensitive lookup in a map that was never normalized.
///
/// An exact key match wins; otherwise the first key equal under Unicode
/// lower-casing is returned together with its stored spelling.
pub fn lookup_equal_fold<'a>(map: &'a StringMap, key: &str) -> Option<(&'a str, &'a Value)> {
    if let Some((stored, value)) = map.get_key_value(key) {
        return Some((stored.as_str(), value));
    }

    let folded = key.to_lowercase();
    map.iter()
        .find(|(stored, _)| stored.to_lowercase() == folded)
        .map(|(stored, value)| (stored.as_str(), value))
}
