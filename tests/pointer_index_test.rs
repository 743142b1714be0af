//! End-to-end tests for building and querying a pointer index.

use std::collections::BTreeSet;

use jsonptr_index::{Error, IndexConfig, PointerIndex};
use proptest::prelude::*;
use serde_json::{json, Value};

const COMPACT: &str = r#"{"a":1,"b":2,"c":{"d":3,"e":4},"f":[5,6,"g",{"h":7},["i",8,9]]}"#;

const INDENTED: &str = r#"
	{
		"a": 1,
		"b": 2,
		"c": {"d": 3, "e": 4},
		"f": [
			5,
			6,
			"g",
			{
				"h": 7
			},
			[
				"i",
				8,
				9
			]
		]
	}"#;

// ============================================================================
// Fixed documents
// ============================================================================

#[test]
fn test_compact_document_spans() {
    let index = PointerIndex::build(COMPACT.as_bytes()).unwrap();

    assert_eq!(index.raw_span("/a").unwrap(), b"1");
    assert_eq!(index.raw_span("/c").unwrap(), br#"{"d":3,"e":4}"#);
    assert_eq!(index.raw_span("/f/3/h").unwrap(), b"7");
    assert_eq!(index.raw_span("/f/4/0").unwrap(), br#""i""#);
    assert!(matches!(index.lookup("/g"), Err(Error::NotFound { .. })));
    assert!(matches!(index.lookup("/f/5"), Err(Error::NotFound { .. })));
}

#[test]
fn test_indented_document_decodes() {
    let index = PointerIndex::build(INDENTED.as_bytes()).unwrap();

    assert_eq!(index.decode::<i32>("/a").unwrap(), 1);
    assert_eq!(index.decode::<i32>("/b").unwrap(), 2);
    assert_eq!(index.decode::<i32>("/c/d").unwrap(), 3);
    assert_eq!(index.decode::<i32>("/c/e").unwrap(), 4);
    assert_eq!(index.decode::<i32>("/f/0").unwrap(), 5);
    assert_eq!(index.decode::<i32>("/f/1").unwrap(), 6);
    assert_eq!(index.decode::<String>("/f/2").unwrap(), "g");
    assert_eq!(index.decode::<i32>("/f/3/h").unwrap(), 7);
    assert_eq!(index.decode::<String>("/f/4/0").unwrap(), "i");
    assert_eq!(index.decode::<i32>("/f/4/1").unwrap(), 8);
    assert_eq!(index.decode::<i32>("/f/4/2").unwrap(), 9);

    assert_eq!(index.value("/c").unwrap().to_string(), r#"{"d":3,"e":4}"#);
    assert_eq!(index.value("/f").unwrap(), json!([5, 6, "g", {"h": 7}, ["i", 8, 9]]));
    assert_eq!(index.raw_span("/f/3").unwrap(), b"{\n\t\t\t\t\"h\": 7\n\t\t\t}");
}

#[test]
fn test_indented_and_compact_agree() {
    let compact = PointerIndex::build(COMPACT.as_bytes()).unwrap();
    let indented = PointerIndex::build(INDENTED.as_bytes()).unwrap();

    let compact_paths: Vec<&str> = compact.paths().collect();
    let indented_paths: Vec<&str> = indented.paths().collect();
    assert_eq!(compact_paths, indented_paths);

    for path in compact_paths {
        assert_eq!(
            compact.value(path).unwrap(),
            indented.value(path).unwrap(),
            "{}",
            path
        );
    }
}

#[test]
fn test_absent_paths() {
    let index = PointerIndex::build(COMPACT.as_bytes()).unwrap();
    // Missing key, index past the end, path through a scalar, bad syntax
    for path in ["/z", "/c/z", "/f/5", "/f/-1", "/a/0", "/f/2/0", "/c/d/x", "f", "//a"] {
        assert!(index.lookup(path).unwrap_err().is_not_found(), "{}", path);
        assert!(index.raw_span(path).unwrap_err().is_not_found(), "{}", path);
        assert!(index.decode::<Value>(path).unwrap_err().is_not_found(), "{}", path);
    }
}

#[test]
fn test_decode_mismatch() {
    let index = PointerIndex::build(COMPACT.as_bytes()).unwrap();
    assert!(matches!(index.decode::<u32>("/f/2"), Err(Error::Decode(_))));
    assert!(matches!(index.decode::<String>("/c"), Err(Error::Decode(_))));

    // A generic decode always succeeds
    assert_eq!(index.value("/f/2").unwrap(), Value::from("g"));
}

#[test]
fn test_malformed_documents_fail_fast() {
    let cases: [&[u8]; 7] = [
        b"",
        b"{\"a\":1",
        b"{\"a\" 1}",
        b"[1,,2]",
        b"{\"a\":01}",
        b"[\"unterminated]",
        b"{} {}",
    ];
    for text in cases {
        match PointerIndex::build(text) {
            Err(Error::MalformedDocument(_)) => {}
            other => panic!("{:?}: expected malformed, got {:?}", text, other),
        }
    }
}

#[test]
fn test_depth_limit_config() {
    let text = "[".repeat(10) + &"]".repeat(10);
    let config = IndexConfig::default().with_max_depth(5);
    match PointerIndex::build_with_config(text.as_bytes(), &config) {
        Err(Error::DepthLimitExceeded { limit, position }) => {
            assert_eq!(limit, 5);
            assert_eq!(position.offset, 6);
        }
        other => panic!("expected depth error, got {:?}", other),
    }
    assert_eq!(PointerIndex::build(text.as_bytes()).unwrap().len(), 10);
}

#[test]
fn test_deep_documents_are_not_malformed() {
    // Deeper than the default limit but well-formed
    let text = "[".repeat(200) + &"]".repeat(200);
    let err = PointerIndex::build(text.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::DepthLimitExceeded { limit: 127, .. }));
    assert!(jsonptr_index::validate(text.as_bytes()).is_ok());

    let config = IndexConfig::default().with_max_depth(200);
    let index = PointerIndex::build_with_config(text.as_bytes(), &config).unwrap();
    assert_eq!(index.len(), 200);
    assert_eq!(index.raw_span("").unwrap(), text.as_bytes());
}

#[test]
fn test_duplicate_key_replaces_subtree() {
    let index = PointerIndex::build(br#"{"a": {"x": 1}, "a": 2}"#).unwrap();
    assert_eq!(index.paths().collect::<Vec<_>>(), ["", "/a"]);
    assert_eq!(index.raw_span("/a").unwrap(), b"2");
    assert!(index.raw_span("/a/x").unwrap_err().is_not_found());

    let tree: Value = serde_json::from_slice(index.text()).unwrap();
    for path in index.paths() {
        let parsed: Value = serde_json::from_slice(index.raw_span(path).unwrap()).unwrap();
        assert_eq!(Some(&parsed), tree.pointer(path), "{}", path);
    }
}

#[test]
fn test_concurrent_lookups() {
    let index = PointerIndex::build(INDENTED.as_bytes()).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (path, offset) in index.iter() {
                    assert_eq!(index.lookup(path).unwrap(), offset);
                    assert!(index.raw_span(path).is_ok());
                }
            });
        }
    });
}

// ============================================================================
// Properties over generated documents
// ============================================================================

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        "[a-z \\n\"\\\\é~/]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(5, 96, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{0,4}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Every pointer in `value`, by tree navigation. Generated keys never
/// contain `~` or `/`, so no RFC 6901 escaping is needed.
fn collect_pointers(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
    out.insert(prefix.to_string());
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_pointers(item, &format!("{}/{}", prefix, i), out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect_pointers(item, &format!("{}/{}", prefix, key), out);
            }
        }
        _ => {}
    }
}

/// Serialize `value`, then reparse it so float formatting cannot skew
/// comparisons against the source text.
fn render(value: &Value, pretty: bool) -> (String, Value) {
    let text = if pretty {
        serde_json::to_string_pretty(value).unwrap()
    } else {
        serde_json::to_string(value).unwrap()
    };
    let doc = serde_json::from_str(&text).unwrap();
    (text, doc)
}

proptest! {
    #[test]
    fn prop_raw_span_round_trips(doc in arb_json(), pretty in any::<bool>()) {
        let (text, doc) = render(&doc, pretty);
        let index = PointerIndex::build(text.as_bytes()).unwrap();

        for path in index.paths() {
            let span = index.raw_span(path).unwrap();
            let parsed: Value = serde_json::from_slice(span).unwrap();
            prop_assert_eq!(Some(&parsed), doc.pointer(path), "path {:?}", path);
        }
    }

    #[test]
    fn prop_every_value_is_registered(doc in arb_json(), pretty in any::<bool>()) {
        let (text, doc) = render(&doc, pretty);
        let index = PointerIndex::build(text.as_bytes()).unwrap();

        let mut expected = BTreeSet::new();
        collect_pointers(&doc, "", &mut expected);
        let actual: BTreeSet<String> = index.paths().map(str::to_string).collect();
        prop_assert_eq!(index.len(), expected.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_offsets_land_on_value_starts(doc in arb_json(), pretty in any::<bool>()) {
        let (text, _) = render(&doc, pretty);
        let index = PointerIndex::build(text.as_bytes()).unwrap();

        for (path, offset) in index.iter() {
            let b = text.as_bytes()[offset];
            prop_assert!(
                matches!(b, b'{' | b'[' | b'"' | b'-' | b'0'..=b'9' | b't' | b'f' | b'n'),
                "{:?} starts at {:?}",
                path,
                b as char
            );
        }
    }

    #[test]
    fn prop_build_is_idempotent(doc in arb_json()) {
        let (text, _) = render(&doc, true);
        let first = PointerIndex::build(text.as_bytes()).unwrap();
        let second = PointerIndex::build(text.as_bytes()).unwrap();
        prop_assert!(first.iter().eq(second.iter()));
    }

    #[test]
    fn prop_past_the_end_is_absent(doc in arb_json()) {
        let (text, doc) = render(&doc, false);
        let index = PointerIndex::build(text.as_bytes()).unwrap();

        let mut pointers = BTreeSet::new();
        collect_pointers(&doc, "", &mut pointers);
        for path in &pointers {
            match doc.pointer(path) {
                Some(Value::Array(items)) => {
                    let past = format!("{}/{}", path, items.len());
                    prop_assert!(index.lookup(&past).unwrap_err().is_not_found());
                }
                Some(Value::Object(_)) => {
                    let missing = format!("{}/not-a-generated-key", path);
                    prop_assert!(index.lookup(&missing).unwrap_err().is_not_found());
                }
                _ => {
                    let through_scalar = format!("{}/0", path);
                    prop_assert!(index.lookup(&through_scalar).unwrap_err().is_not_found());
                }
            }
        }
    }
}
