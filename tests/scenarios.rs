use paramkit::{
    normalize_json, normalize_raw, to_params_and_prepare, to_slice_string_map, KeyRenamer, Params,
    RawValue,
};
use serde_json::{json, Value};

fn yaml(src: &str) -> RawValue {
    serde_yml::from_str(src).unwrap()
}

#[test]
fn single_key_is_lower_cased() {
    let mut value = json!({"abC": 32});
    normalize_json(&mut value);

    assert_eq!(value, json!({"abc": 32}));
}

#[test]
fn nested_mixed_key_maps_are_canonicalized() {
    let raw = yaml(
        r#"
abC: 32
deF:
  23: A value
  24:
    AbCDe: A value
    eFgHi: Another value
gHi:
  J: 25
jKl:
  M: "26"
"#,
    );

    assert_eq!(
        normalize_raw(raw),
        json!({
            "abc": 32,
            "def": {
                "23": "A value",
                "24": {"abcde": "A value", "efghi": "Another value"}
            },
            "ghi": {"j": 25},
            "jkl": {"m": "26"}
        })
    );
}

#[test]
fn renamer_applies_wildcard_and_alternation_rules() {
    let rules = [
        ("{ren1,sub/*/ren1}", "new1"),
        ("{Ren2,sub/ren2}", "new2"),
    ];
    let renamer = KeyRenamer::new(rules).unwrap();

    let mut value = json!({
        "a": 32,
        "ren1": "m1",
        "ren2": "m1_2",
        "sub": {"subsub": {"REN1": "m2", "ren2": "m2_2"}},
        "no": {"ren1": "m2", "ren2": "m2_2"}
    });

    assert_eq!(renamer.rename_json(&mut value), 3);
    assert_eq!(
        value,
        json!({
            "a": 32,
            "new1": "m1",
            "new2": "m1_2",
            "sub": {"subsub": {"new1": "m2", "ren2": "m2_2"}},
            "no": {"ren1": "m2", "ren2": "m2_2"}
        })
    );
}

#[test]
fn normalize_then_rename_pipeline() {
    let input = yaml("Sub:\n  SubSub:\n    REN1: m2\nREN2: top\n");
    let (mut params, ok) = to_params_and_prepare(Some(input));
    assert!(ok);

    let pairs = [
        "{ren1,sub/*/ren1}",
        "new1",
        "{Ren2,sub/ren2}",
        "new2",
    ];
    let renamer = KeyRenamer::from_flat_pairs(&pairs).unwrap();
    renamer.rename(&mut params);

    assert_eq!(params.get_path(&["sub", "subsub", "new1"]), Some(&json!("m2")));
    assert_eq!(params.get("NEW2"), Some(&json!("top")));
}

#[test]
fn slice_string_map_accepts_string_keyed_elements() {
    let maps = to_slice_string_map(yaml("- abc: 123\n")).unwrap();
    assert_eq!(
        maps.into_iter().map(Value::Object).collect::<Vec<_>>(),
        vec![json!({"abc": 123})]
    );

    let generic = paramkit::raw_from_json(json!([{"def": 456}]));
    let maps = to_slice_string_map(generic).unwrap();
    assert_eq!(
        maps.into_iter().map(Value::Object).collect::<Vec<_>>(),
        vec![json!({"def": 456})]
    );
}

#[test]
fn nil_input_prepares_to_empty_params() {
    let (params, ok) = to_params_and_prepare(Some(yaml("A: av")));
    assert!(ok);
    assert_eq!(params.get("a"), Some(&json!("av")));

    let (params, ok) = to_params_and_prepare(None);
    assert!(ok);
    assert_eq!(params, Params::new());
}

#[test]
fn normalization_is_idempotent_on_params() {
    let (params, _) = to_params_and_prepare(Some(yaml("X: {Y: [{Z: 1}]}\n")));

    let mut again = params.clone();
    paramkit::prepare_params(&mut again);

    assert_eq!(again, params);
}
