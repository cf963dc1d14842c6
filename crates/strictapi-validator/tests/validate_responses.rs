//! Integration test: response validation against `fixtures/petstore.yaml`.

use std::path::PathBuf;

use strictapi_validator::{SpecSource, ValidationError, Validator};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn validator_for(fixture: &str) -> Validator {
    let path = repo_root().join("fixtures").join(fixture);
    Validator::new(SpecSource::new(path.to_string_lossy()))
}

fn petstore() -> Validator {
    validator_for("petstore.yaml")
}

fn respond(method: &str, path: &str, status: u16, content_type: &str, body: &str) -> Result<(), ValidationError> {
    petstore().validate_response(method, path, status, Some(content_type), Some(body))
}

fn respond_err(method: &str, path: &str, status: u16, content_type: &str, body: &str) -> String {
    respond(method, path, status, content_type, body)
        .unwrap_err()
        .to_string()
}

#[test]
fn test_broken_schema_is_reported() {
    let err = validator_for("broken.yaml")
        .validate_response("GET", "/pets", 200, Some("application/json; charset=utf-8"), Some(r#"{"pets":[]}"#))
        .unwrap_err();
    assert!(matches!(err, ValidationError::BrokenSchema(_)));
}

#[test]
fn test_unknown_path() {
    assert_eq!(
        respond_err("POST", "/unknown", 200, "application/json; charset=utf-8", ""),
        r#"Not found spec for "/unknown""#
    );
}

#[test]
fn test_unknown_verb() {
    assert_eq!(
        respond_err("TEAPOT", "/pets", 200, "application/json; charset=utf-8", ""),
        r#"Not found spec for "/pets" "teapot""#
    );
}

#[test]
fn test_unknown_status() {
    let err = respond("GET", "/pets", 201, "application/json", "").unwrap_err();
    assert_eq!(
        err,
        ValidationError::NotFoundSpecForStatus(r#"Not found spec for "/pets" "get" "201""#.into())
    );
}

#[test]
fn test_unknown_content_type() {
    assert_eq!(
        respond_err("GET", "/pets", 200, "application/xml", "<root/>"),
        r#"Not found spec for "/pets" "get" "200" "application/xml""#
    );
}

#[test]
fn test_response_without_content_rejects_bodies() {
    assert_eq!(
        respond_err("GET", "/pets/1", 404, "application/json", r#"{"x":1}"#),
        r#"Not found spec for "/pets/1" "get" "404" "application/json""#
    );
    assert!(respond("GET", "/pets/1", 404, "application/json", "").is_ok());
}

#[test]
fn test_malformed_body() {
    let err = respond_err("GET", "/pets", 200, "application/json", r#"{"pets":"#);
    assert!(
        err.starts_with(r#"schema failed for "/pets" "get" "200" "application/json": "#),
        "{err}"
    );
}

#[test]
fn test_schema_violation() {
    let err = respond_err("GET", "/pets", 200, "application/json", r#"{"pets":[{"age":48}]}"#);
    assert!(
        err.starts_with(r#"schema failed for "/pets" "get" "200" "application/json": #/pets/0: "#),
        "{err}"
    );
    assert!(err.contains("id"), "{err}");
}

#[test]
fn test_valid_response() {
    assert!(respond("GET", "/pets", 200, "application/json", r#"{"pets":[{"id":123,"name":"bob"}]}"#).is_ok());
}

#[test]
fn test_empty_body_passes() {
    assert!(respond("POST", "/pets", 201, "application/json", "").is_ok());
    assert!(petstore()
        .validate_response("POST", "/pets", 422, None, None)
        .is_ok());
}

#[test]
fn test_default_response_covers_other_statuses() {
    assert!(respond("GET", "/pets/1", 500, "text/plain; charset=utf-8", "boom").is_ok());
    assert_eq!(
        respond_err("GET", "/pets/1", 500, "application/json", "{}"),
        r#"Not found spec for "/pets/1" "get" "500" "application/json""#
    );
}

#[test]
fn test_nullable_object() {
    assert!(respond("GET", "/nullable", 200, "application/json", r#"{"obj":null}"#).is_ok());
    assert!(respond("GET", "/nullable", 200, "application/json", r#"{"obj":{"some":"abc"}}"#).is_ok());
    let err = respond_err(
        "GET",
        "/nullable",
        200,
        "application/json",
        r#"{"obj":{"some":"abc","another":"cde"}}"#,
    );
    assert!(
        err.starts_with(r#"schema failed for "/nullable" "get" "200" "application/json": #/obj: "#),
        "{err}"
    );
}

#[test]
fn test_one_of_response() {
    let ok = [
        r#"{"image":{"image_type":"image","image_name":"redis"}}"#,
        r#"{"image":{"image_type":"repo","image_repo":"uchiru/uchiru"}}"#,
    ];
    for body in ok {
        assert!(respond("GET", "/one_of", 200, "application/json", body).is_ok(), "{body}");
    }

    let bad = [
        r#"{"image":{"image_type":"some","image_repo":"uchiru/uchiru"}}"#,
        r#"{"image":{"image_type":"image","image_repo":"uchiru/uchiru"}}"#,
    ];
    for body in bad {
        let err = respond_err("GET", "/one_of", 200, "application/json", body);
        assert!(
            err.starts_with(r#"schema failed for "/one_of" "get" "200" "application/json": #/image: "#),
            "{err}"
        );
    }
}
