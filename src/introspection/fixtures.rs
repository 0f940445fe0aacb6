//! Introspection payloads shared by unit tests.

use serde_json::{Value, json};

fn load(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

/// `Query { user } User { name, id, posts @deprecated } Post { id }`.
pub fn blog() -> Value {
    load(include_str!("../../tests/fixtures/blog.json"))
}

/// Connections, edges, `Node`, `PageInfo` and a look-alike `FollowerConnection`.
pub fn relay() -> Value {
    load(include_str!("../../tests/fixtures/relay.json"))
}

/// Union, interface, enum, input object and a mutation root.
pub fn search() -> Value {
    load(include_str!("../../tests/fixtures/search.json"))
}

pub fn named(kind: &str, name: &str) -> Value {
    json!({"kind": kind, "name": name, "ofType": null})
}

pub fn field(name: &str, type_ref: Value) -> Value {
    json!({
        "name": name,
        "description": null,
        "args": [],
        "type": type_ref,
        "isDeprecated": false,
        "deprecationReason": null
    })
}

pub fn object(name: &str, fields: Vec<Value>) -> Value {
    json!({
        "kind": "OBJECT",
        "name": name,
        "description": null,
        "fields": fields,
        "interfaces": []
    })
}
