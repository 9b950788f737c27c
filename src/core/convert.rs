//! Entry and exit coercions around the normalizer.

use crate::error::{Error, Result};
use crate::normalize::{self, RawValue};
use crate::params::{Params, StringMap};

/// Turn anything into canonical `Params`.
///
/// Returns `(params, true)` for a mapping and for absent or null input, which
/// yields an empty map. Any other shape returns `(empty, false)`. The result
/// is always fully normalized.
pub fn to_params_and_prepare(input: Option<RawValue>) -> (Params, bool) {
    match input.map(normalize::untag) {
        None | Some(RawValue::Null) => (Params::new(), true),
        Some(RawValue::Mapping(mapping)) => (
            Params::from_canonical(normalize::canonical_map(mapping)),
            true,
        ),
        Some(_) => (Params::new(), false),
    }
}

/// Coerce a sequence whose elements should all be mappings into a list of
/// string-keyed maps.
///
/// Keys are stringified but keep their casing; order and length are kept.
/// The first element that is not a mapping fails the whole call.
pub fn to_slice_string_map(input: RawValue) -> Result<Vec<StringMap>> {
    let items = match normalize::untag(input) {
        RawValue::Sequence(items) => items,
        other => {
            return Err(Error::type_mismatch(
                "sequence of mappings",
                normalize::raw_type_name(&other),
                None,
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match normalize::untag(item) {
            RawValue::Mapping(mapping) => Ok(normalize::plain_map(mapping)),
            other => Err(Error::type_mismatch(
                "mapping",
                normalize::raw_type_name(&other),
                Some(index),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn yaml(src: &str) -> RawValue {
        serde_yml::from_str(src).unwrap()
    }

    #[test]
    fn absent_input_is_an_empty_mapping() {
        let (params, ok) = to_params_and_prepare(None);
        assert!(ok);
        assert_eq!(params, Params::new());

        let (params, ok) = to_params_and_prepare(Some(RawValue::Null));
        assert!(ok);
        assert!(params.is_empty());
    }

    #[test]
    fn mappings_are_normalized() {
        let (params, ok) = to_params_and_prepare(Some(yaml("A: av\nNested: {7: Seven}\n")));

        assert!(ok);
        assert_eq!(
            Value::from(params),
            json!({"a": "av", "nested": {"7": "Seven"}})
        );
    }

    #[test]
    fn scalars_and_sequences_are_not_convertible() {
        let (params, ok) = to_params_and_prepare(Some(yaml("42")));
        assert!(!ok);
        assert!(params.is_empty());

        let (_, ok) = to_params_and_prepare(Some(yaml("[a: 1]")));
        assert!(!ok);
    }

    #[test]
    fn json_input_goes_through_raw_model() {
        let raw = normalize::raw_from_json(json!({"KEY": [1, {"X": 2}]}));
        let (params, ok) = to_params_and_prepare(Some(raw));

        assert!(ok);
        assert_eq!(Value::from(params), json!({"key": [1, {"x": 2}]}));
    }

    #[test]
    fn slice_of_string_maps_is_kept() {
        let maps = to_slice_string_map(yaml("- abc: 123\n")).unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(Value::Object(maps[0].clone()), json!({"abc": 123}));
    }

    #[test]
    fn slice_preserves_order_and_key_casing() {
        let maps = to_slice_string_map(yaml("- {Def: 456}\n- {1: one}\n- {}\n")).unwrap();

        assert_eq!(
            maps.into_iter().map(Value::Object).collect::<Vec<_>>(),
            vec![json!({"Def": 456}), json!({"1": "one"}), json!({})]
        );
    }

    #[test]
    fn slice_rejects_non_mapping_element() {
        let err = to_slice_string_map(yaml("- {a: 1}\n- text\n- {b: 2}\n")).unwrap_err();

        assert_eq!(err.code.as_str(), "convert.type_mismatch");
        assert_eq!(err.details["index"], 1);
        assert_eq!(err.details["actual"], "string");
    }

    #[test]
    fn slice_rejects_non_sequence_input() {
        let err = to_slice_string_map(yaml("{a: 1}")).unwrap_err();

        assert_eq!(err.details["actual"], "mapping");
        assert!(err.details.get("index").is_none());
    }
}
