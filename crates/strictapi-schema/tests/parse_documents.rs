//! Integration test: parse the shared fixture documents end to end.
//!
//! Covers the properties that only show up on a whole document: idempotent
//! normalization, canonical path order, `$ref` resolution into independent
//! copies, and nullable flattening inside operation schemas.

use std::path::PathBuf;

use serde_json::{json, Value};
use strictapi_schema::{parse, ContentType, HttpMethod, ResponseContent, StatusKey};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn load_fixture(name: &str) -> Value {
    let path = repo_root().join("fixtures").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn request_schema(document: &Value, template: &str, method: HttpMethod) -> Value {
    let schema = parse(document).unwrap();
    let entry = schema
        .paths
        .iter()
        .find(|entry| entry.original() == template)
        .unwrap();
    let body = entry.operations[&method].request_body.as_ref().unwrap();
    body.content[&ContentType::ApplicationJson].to_json_schema()
}

#[test]
fn test_petstore_parses() {
    let schema = parse(&load_fixture("petstore.yaml")).unwrap();
    assert_eq!(schema.paths.len(), 6);
}

#[test]
fn test_parsing_is_idempotent() {
    let document = load_fixture("petstore.yaml");
    let first = parse(&document).unwrap();
    let second = parse(&document).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_paths_are_in_specificity_order() {
    let schema = parse(&load_fixture("petstore.yaml")).unwrap();
    let order: Vec<&str> = schema.paths.iter().map(|entry| entry.original()).collect();
    assert_eq!(
        order,
        vec![
            "/nullable",
            "/one_of",
            "/owners/{name}/pets",
            "/pets",
            "/pets/mine",
            "/pets/{id}",
        ]
    );
}

#[test]
fn test_refs_are_inlined() {
    let rendered = request_schema(&load_fixture("petstore.yaml"), "/pets", HttpMethod::Post);
    assert_eq!(rendered["required"], json!(["pet"]));
    assert_eq!(
        rendered["properties"]["pet"]["properties"]["name"]["pattern"],
        json!(r"^[a-z][a-z0-9\-_]+$")
    );
    assert_eq!(
        rendered["properties"]["pet"]["properties"]["kind"],
        json!({"type": ["string", "null"], "enum": ["cat", "dog"]})
    );
}

#[test]
fn test_nullable_fields_are_flattened() {
    let rendered = request_schema(&load_fixture("petstore.yaml"), "/nullable", HttpMethod::Post);
    let properties = &rendered["properties"];
    assert_eq!(properties["note"], json!({"type": ["string", "null"]}));
    assert_eq!(properties["score"], json!({"type": ["number", "null"]}));
    assert_eq!(properties["tags"]["oneOf"][1], json!({"type": "null"}));
    assert_eq!(properties["pet"]["type"], json!("object"));
}

#[test]
fn test_one_of_branches_resolve_refs() {
    let rendered = request_schema(&load_fixture("petstore.yaml"), "/one_of", HttpMethod::Post);
    let branches = rendered["oneOf"].as_array().unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0]["required"], json!(["id"]));
    assert_eq!(branches[1]["required"], json!(["note"]));
}

#[test]
fn test_text_plain_response_keeps_example() {
    let schema = parse(&load_fixture("petstore.yaml")).unwrap();
    let pet = schema
        .paths
        .iter()
        .find(|entry| entry.original() == "/pets/{id}")
        .unwrap();
    let op = &pet.operations[&HttpMethod::Get];
    let default = &op.responses[&StatusKey::Default];
    assert_eq!(
        default.content[&ContentType::TextPlain],
        ResponseContent::Text {
            example: json!("something went wrong")
        }
    );
    assert_eq!(op.response_for(500), Some(default));
    assert!(op.response_for(200).is_some());
    assert!(op.response_for(404).unwrap().content.is_empty());
}

#[test]
fn test_undeclared_tag_is_rejected() {
    let err = parse(&load_fixture("broken.yaml")).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Broken schema: "/paths:/pets:get:tags[pets]" is not descripted in "tags" section of schema"#
    );
}

#[test]
fn test_component_sibling_ref_is_rejected() {
    let mut document = load_fixture("petstore.yaml");
    document["components"]["schemas"]["PetList"] = json!({
        "type": "array",
        "items": {"$ref": "#/components/schemas/Pet"}
    });
    let err = parse(&document).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Broken schema: "/components:PetList:items:$ref" unknown component "Pet""#
    );
}

#[test]
fn test_json_fixture_parses() {
    let path = repo_root().join("fixtures").join("petstore.json");
    let document: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let schema = parse(&document).unwrap();
    assert_eq!(schema.paths.len(), 1);
    assert_eq!(schema.paths[0].original(), "/pets");
}
