use reqgate_lib::fingerprint::{stable_json, CIRCULAR_SENTINEL};
use reqgate_lib::{FingerprintBuilder, RequestDescriptor, Value};
use serde_json::json;

const BASE: &str = "http://node:3000";

fn builder() -> FingerprintBuilder {
    FingerprintBuilder::new(BASE)
}

#[test]
fn test_get_without_payload() {
    let fp = builder().fingerprint(&RequestDescriptor::get("/blocks"));
    assert_eq!(fp.as_str(), "GET:/blocks:");
}

#[test]
fn test_layout_is_method_path_body_then_query() {
    let request = RequestDescriptor::post("/tx")
        .with_body(json!({"a": 1}))
        .with_query_param("limit", 10);
    let fp = builder().fingerprint(&request);
    assert_eq!(fp.as_str(), r#"POST:/tx:{"a":1}{"limit":10}"#);
}

#[test]
fn test_key_order_does_not_matter() {
    let first = Value::object();
    first.insert("b", 2);
    first.insert("a", 1);
    let nested = Value::object();
    nested.insert("y", true);
    nested.insert("x", "v");
    first.insert("c", nested);

    let second = Value::from(json!({"c": {"x": "v", "y": true}, "a": 1, "b": 2}));

    let b = builder();
    assert_eq!(
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(first)),
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(second))
    );
}

#[test]
fn test_query_key_order_does_not_matter() {
    let b = builder();
    let one = RequestDescriptor::get("/blocks").with_query_param("from", 1).with_query_param("to", 9);
    let two = RequestDescriptor::get("/blocks").with_query_param("to", 9).with_query_param("from", 1);
    assert_eq!(b.fingerprint(&one), b.fingerprint(&two));
}

#[test]
fn test_undefined_member_is_omitted() {
    let with_undefined = Value::object();
    with_undefined.insert("a", 1);
    with_undefined.insert("b", Value::Undefined);

    let b = builder();
    assert_eq!(
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(json!({"a": 1}))),
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(with_undefined))
    );
}

#[test]
fn test_none_member_is_omitted() {
    let body = Value::object();
    body.insert("a", 1);
    body.insert("b", Option::<i32>::None);
    assert_eq!(stable_json(&body), r#"{"a":1}"#);
}

#[test]
fn test_different_bodies_differ() {
    let b = builder();
    assert_ne!(
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(json!({"a": 1}))),
        b.fingerprint(&RequestDescriptor::post("/tx").with_body(json!({"a": 2})))
    );
}

#[test]
fn test_methods_differ() {
    let b = builder();
    assert_ne!(
        b.fingerprint(&RequestDescriptor::get("/blocks")),
        b.fingerprint(&RequestDescriptor::delete("/blocks"))
    );
}

#[test]
fn test_absolute_url_matches_relative_path() {
    let b = builder();
    assert_eq!(
        b.fingerprint(&RequestDescriptor::get("http://node:3000/blocks")),
        b.fingerprint(&RequestDescriptor::get("/blocks"))
    );
}

#[test]
fn test_duplicate_slashes_collapse() {
    let b = builder();
    assert_eq!(
        b.fingerprint(&RequestDescriptor::get("http://node:3000//blocks//latest")),
        b.fingerprint(&RequestDescriptor::get("/blocks/latest"))
    );
}

#[test]
fn test_self_reference_uses_sentinel() {
    let body = Value::object();
    body.insert("name", "loop");
    body.insert("me", body.clone());

    let fp = builder().fingerprint(&RequestDescriptor::post("/tx").with_body(body));
    assert_eq!(fp.as_str(), format!(r#"POST:/tx:{{"me":"{CIRCULAR_SENTINEL}","name":"loop"}}"#));
}

#[test]
fn test_indirect_cycle_uses_sentinel() {
    let parent = Value::object();
    let children = Value::array();
    let child = Value::object();
    child.insert("parent", parent.clone());
    children.push(child);
    parent.insert("children", children);

    assert_eq!(stable_json(&parent), r#"{"children":[{"parent":"[Circular]"}]}"#);
}

#[test]
fn test_shared_node_is_not_circular() {
    let shared = Value::from(json!({"k": 1}));
    let body = Value::object();
    body.insert("left", shared.clone());
    body.insert("right", shared);

    assert_eq!(stable_json(&body), r#"{"left":{"k":1},"right":{"k":1}}"#);
}

#[test]
fn test_bigint_is_decimal_string() {
    let body = Value::object();
    body.insert("amount", u64::MAX);
    assert_eq!(stable_json(&body), r#"{"amount":"18446744073709551615"}"#);
}

#[test]
fn test_integer_bodies_fingerprint_alike_however_built() {
    #[derive(serde::Serialize)]
    struct Amounts {
        amount: i64,
        supply: u64,
    }

    let typed: Value = [("amount", Value::from(100_i64)), ("supply", Value::from(u64::MAX))]
        .into_iter()
        .collect();
    let from_json = Value::from(json!({"amount": 100, "supply": u64::MAX}));
    let serialized = Value::from_serialize(&Amounts { amount: 100, supply: u64::MAX });

    let b = builder();
    let fingerprint = |body: Value| b.fingerprint(&RequestDescriptor::post("/tx").with_body(body));
    let expected = fingerprint(typed);
    assert_eq!(expected.as_str(), r#"POST:/tx:{"amount":100,"supply":"18446744073709551615"}"#);
    assert_eq!(fingerprint(from_json), expected);
    assert_eq!(fingerprint(serialized), expected);
}

#[test]
fn test_string_body_is_verbatim() {
    let fp = builder().fingerprint(&RequestDescriptor::post("/raw").with_body("a=1"));
    assert_eq!(fp.as_str(), "POST:/raw:a=1");
}

#[test]
fn test_from_serialize_struct() {
    #[derive(serde::Serialize)]
    struct Transfer {
        to: &'static str,
        amount: u32,
    }

    let value = Value::from_serialize(&Transfer { to: "alice", amount: 5 });
    assert_eq!(stable_json(&value), r#"{"amount":5,"to":"alice"}"#);
}
