//! Path-pattern key renaming.
//!
//! A `KeyRenamer` holds an ordered list of `RenameRule`s and rewrites keys of
//! a parameter tree whose path from the root matches one of them:
//! 1. Walk the tree depth-first, pre-order, through nested maps only
//! 2. For each key, test `parent path + key` against the rules in order
//! 3. On the first match, move the value under the rule's replacement key
//! 4. Descend into the value if it is a map, using the path as encountered
//!
//! A value is renamed at most once per walk: a key that a rename just
//! created is skipped when the walk reaches it.
//!
//! Maps inside sequences are not visited.

use crate::error::{Error, Result};
use crate::params::{Params, StringMap};
use crate::pattern::RenameRule;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRenamer {
    rules: Vec<RenameRule>,
}

impl KeyRenamer {
    /// Build from ordered `(pattern, replacement)` pairs.
    ///
    /// Every pattern is compiled here; the first malformed one fails the
    /// whole construction.
    pub fn new<P, K, I>(pairs: I) -> Result<Self>
    where
        P: AsRef<str>,
        K: AsRef<str>,
        I: IntoIterator<Item = (P, K)>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, replacement)| {
                RenameRule::compile(replacement.as_ref(), &[pattern.as_ref()])
            })
            .collect::<Result<Vec<_>>>()?;

        log_status!("rename", "Compiled {} rename rule(s)", rules.len());

        Ok(Self { rules })
    }

    /// Build from a flat `pattern, replacement, pattern, replacement, ...` list.
    pub fn from_flat_pairs<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        if items.len() % 2 != 0 {
            return Err(Error::validation_invalid_argument(
                "patternKeys",
                format!(
                    "Expected pattern/replacement pairs, got {} item(s)",
                    items.len()
                ),
                items.last().map(|last| last.as_ref().to_string()),
            ));
        }

        Self::new(
            items
                .chunks_exact(2)
                .map(|pair| (pair[0].as_ref(), pair[1].as_ref())),
        )
    }

    pub fn from_rules(rules: Vec<RenameRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RenameRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replacement key for `path`, from the first rule that matches it.
    pub fn new_key<S: AsRef<str>>(&self, path: &[S]) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(RenameRule::replacement)
    }

    /// Rename keys of a canonical tree in place. Returns how many keys moved.
    pub fn rename(&self, params: &mut Params) -> usize {
        if self.rules.is_empty() {
            return 0;
        }
        let mut path = Vec::new();
        self.rename_map(params.as_map_mut(), &mut path)
    }

    /// Same walk over any JSON object; other values are left alone.
    pub fn rename_json(&self, value: &mut Value) -> usize {
        match value {
            Value::Object(map) if !self.rules.is_empty() => {
                let mut path = Vec::new();
                self.rename_map(map, &mut path)
            }
            _ => 0,
        }
    }

    fn rename_map(&self, map: &mut StringMap, path: &mut Vec<String>) -> usize {
        let mut renamed = 0;
        let keys: Vec<String> = map.keys().cloned().collect();
        // Values moved during this pass; their new keys are not visited again.
        let mut moved: HashSet<String> = HashSet::new();

        for key in keys {
            if moved.contains(&key) {
                continue;
            }
            path.push(key.clone());
            let mut current = key;

            if let Some(new_key) = self.new_key(path.as_slice()) {
                if new_key != current {
                    if let Some(value) = map.remove(&current) {
                        log_status!("rename", "{} -> {}", path.join("/"), new_key);
                        map.insert(new_key.to_string(), value);
                        moved.insert(new_key.to_string());
                        renamed += 1;
                    }
                    current = new_key.to_string();
                }
            }

            if let Some(Value::Object(child)) = map.get_mut(&current) {
                renamed += self.rename_map(child, path);
            }

            path.pop();
        }

        renamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Params {
        Params::from_map(value.as_object().cloned().unwrap())
    }

    #[test]
    fn first_matching_rule_wins() {
        let renamer = KeyRenamer::new([("a/b", "first"), ("a/*", "second")]).unwrap();
        let mut params = tree(json!({"a": {"b": 1, "c": 2}}));

        assert_eq!(renamer.rename(&mut params), 2);
        assert_eq!(Value::from(params), json!({"a": {"first": 1, "second": 2}}));
    }

    #[test]
    fn pattern_length_must_equal_path_length() {
        let renamer = KeyRenamer::new([("*/x", "y")]).unwrap();
        let mut params = tree(json!({"x": 1, "a": {"x": 2, "b": {"x": 3}}}));

        renamer.rename(&mut params);

        assert_eq!(
            Value::from(params),
            json!({"x": 1, "a": {"y": 2, "b": {"x": 3}}})
        );
    }

    #[test]
    fn replacement_key_is_folded() {
        let renamer = KeyRenamer::new([("old", "NewName")]).unwrap();
        let mut params = tree(json!({"old": true}));

        renamer.rename(&mut params);

        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["newname"]);
    }

    #[test]
    fn descends_into_renamed_subtree_using_original_path() {
        let rules = [("legacy", "modern"), ("legacy/inner", "deep")];
        let renamer = KeyRenamer::new(rules).unwrap();
        let mut params = tree(json!({"legacy": {"inner": 1}}));

        renamer.rename(&mut params);

        assert_eq!(Value::from(params), json!({"modern": {"deep": 1}}));
    }

    #[test]
    fn moved_value_is_not_renamed_again() {
        let renamer = KeyRenamer::new([("a", "b"), ("b", "c")]).unwrap();
        let mut params = tree(json!({"a": 1, "b": 2}));

        assert_eq!(renamer.rename(&mut params), 1);
        assert_eq!(Value::from(params), json!({"b": 1}));
    }

    #[test]
    fn moved_subtree_keeps_its_encountered_path() {
        let renamer = KeyRenamer::new([("a", "b"), ("b/x", "y")]).unwrap();
        let mut params = tree(json!({"a": {"x": 1}, "b": 2}));

        assert_eq!(renamer.rename(&mut params), 1);
        assert_eq!(Value::from(params), json!({"b": {"x": 1}}));
    }

    #[test]
    fn folded_literal_matches_folded_key() {
        let renamer = KeyRenamer::new([("ΟΔΟΣ", "road")]).unwrap();
        let mut params = tree(json!({"ΟΔΟΣ": 1}));

        let folded = "ΟΔΟΣ".to_lowercase();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec![folded.as_str()]);
        assert_eq!(renamer.rename(&mut params), 1);
        assert_eq!(params.get("road"), Some(&json!(1)));
    }

    #[test]
    fn second_pass_changes_nothing() {
        let renamer = KeyRenamer::new([("{a,b}", "c")]).unwrap();
        let mut params = tree(json!({"a": 1, "d": {"a": 2}}));

        assert_eq!(renamer.rename(&mut params), 1);
        let after_first = params.clone();

        assert_eq!(renamer.rename(&mut params), 0);
        assert_eq!(params, after_first);
    }

    #[test]
    fn maps_inside_sequences_are_not_visited() {
        let renamer = KeyRenamer::new([("list/*", "renamed"), ("*/old", "new")]).unwrap();
        let mut params = tree(json!({"list": [{"old": 1}]}));

        assert_eq!(renamer.rename(&mut params), 0);
        assert_eq!(Value::from(params), json!({"list": [{"old": 1}]}));
    }

    #[test]
    fn identity_rename_is_not_counted() {
        let renamer = KeyRenamer::new([("same", "Same")]).unwrap();
        let mut params = tree(json!({"same": 1}));

        assert_eq!(renamer.rename(&mut params), 0);
        assert_eq!(params.get("same"), Some(&json!(1)));
    }

    #[test]
    fn construction_fails_on_bad_pattern() {
        let err = KeyRenamer::new([("ok", "x"), ("{broken", "y")]).unwrap_err();
        assert_eq!(err.code.as_str(), "pattern.syntax");
        assert_eq!(err.details["pattern"], "{broken");
    }

    #[test]
    fn flat_pairs_must_be_even() {
        let err = KeyRenamer::from_flat_pairs(&["a", "b", "c"]).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");

        let renamer = KeyRenamer::from_flat_pairs(&["a", "b", "c", "d"]).unwrap();
        assert_eq!(renamer.rules().len(), 2);
        assert_eq!(renamer.new_key(&["C"]), Some("d"));
    }

    #[test]
    fn rename_json_works_on_uncanonical_objects() {
        let renamer = KeyRenamer::new([("Top/*/leaf", "Fixed")]).unwrap();
        let mut value = json!({"TOP": {"Mid": {"LEAF": 1}}});

        assert_eq!(renamer.rename_json(&mut value), 1);
        assert_eq!(value, json!({"TOP": {"Mid": {"fixed": 1}}}));

        let mut scalar = json!(3);
        assert_eq!(renamer.rename_json(&mut scalar), 0);
    }

    #[test]
    fn empty_renamer_is_a_no_op() {
        let renamer = KeyRenamer::default();
        let mut params = tree(json!({"a": 1}));

        assert!(renamer.is_empty());
        assert_eq!(renamer.rename(&mut params), 0);
    }

    #[test]
    fn renamer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyRenamer>();
    }
}
