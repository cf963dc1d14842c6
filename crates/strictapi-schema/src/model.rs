//! # Schema Artifacts
//!
//! Typed products of the parser. A [`Schema`] is built once, never mutated,
//! and replaced wholesale when the document is parsed again. Methods,
//! status keys and content types are enumerations so that the validator
//! never compares raw strings once a request has crossed the boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::canonical::{BooleanSchema, CanonicalSchema, IntegerSchema, StringSchema};
use crate::path::PathTemplate;

// ─── Enumerations ────────────────────────────────────────────────────

/// HTTP verbs the dialect allows under a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl HttpMethod {
    /// Document spelling of every verb, in declaration order.
    pub const NAMES: [&'static str; 5] = ["get", "post", "patch", "put", "delete"];

    /// Parse a method name case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "patch" => Some(Self::Patch),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Patch => "patch",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response keys the dialect allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatusKey {
    #[serde(rename = "200")]
    Ok,
    #[serde(rename = "201")]
    Created,
    #[serde(rename = "301")]
    MovedPermanently,
    #[serde(rename = "302")]
    Found,
    #[serde(rename = "404")]
    NotFound,
    #[serde(rename = "409")]
    Conflict,
    #[serde(rename = "422")]
    UnprocessableEntity,
    #[serde(rename = "default")]
    Default,
}

impl StatusKey {
    /// Document spelling of every key.
    pub const NAMES: [&'static str; 8] = ["200", "201", "301", "302", "404", "409", "422", "default"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "default" => Some(Self::Default),
            code => code.parse().ok().and_then(Self::from_code),
        }
    }

    /// Map a runtime status code to its key, if the dialect allows one.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            201 => Some(Self::Created),
            301 => Some(Self::MovedPermanently),
            302 => Some(Self::Found),
            404 => Some(Self::NotFound),
            409 => Some(Self::Conflict),
            422 => Some(Self::UnprocessableEntity),
            _ => None,
        }
    }
}

/// Media types the dialect knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ContentType {
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "text/plain")]
    TextPlain,
}

impl ContentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "application/json" => Some(Self::ApplicationJson),
            "text/plain" => Some(Self::TextPlain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationJson => "application/json",
            Self::TextPlain => "text/plain",
        }
    }

    /// Strip parameters (`; charset=...`) and case-fold a header value.
    ///
    /// Returns the normalized text together with the recognized variant.
    pub fn normalize(raw: &str) -> (String, Option<Self>) {
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let parsed = Self::parse(&essence);
        (essence, parsed)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Parameters ──────────────────────────────────────────────────────

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
}

/// Scalar type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

/// A declared path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    pub description: String,
    pub required: bool,
    #[serde(rename = "schema", serialize_with = "serialize_param_type")]
    pub param_type: ParamType,
}

impl ParameterSpec {
    /// The canonical schema equivalent to the declared scalar type.
    pub fn schema(&self) -> CanonicalSchema {
        match self.param_type {
            ParamType::String => CanonicalSchema::String(StringSchema::default()),
            ParamType::Integer => CanonicalSchema::Integer(IntegerSchema::default()),
            ParamType::Boolean => CanonicalSchema::Boolean(BooleanSchema::default()),
        }
    }
}

fn serialize_param_type<S: serde::Serializer>(ty: &ParamType, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("type", ty)?;
    map.end()
}

// ─── Bodies ──────────────────────────────────────────────────────────

/// Declared request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodySpec {
    pub description: String,
    pub required: bool,
    pub content: BTreeMap<ContentType, CanonicalSchema>,
}

/// Body declared for one response content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseContent {
    Json(CanonicalSchema),
    /// `text/plain` carries an example and no schema.
    Text { example: serde_json::Value },
}

/// Declared response for one status key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSpec {
    pub description: String,
    pub content: BTreeMap<ContentType, ResponseContent>,
}

// ─── Operations and paths ────────────────────────────────────────────

/// One HTTP method under a path template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tag: String,
    pub parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    pub responses: BTreeMap<StatusKey, ResponseSpec>,
}

impl OperationSpec {
    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of required parameters, in declaration order.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    /// Exact status entry, falling back to `default`.
    pub fn response_for(&self, status: u16) -> Option<&ResponseSpec> {
        StatusKey::from_code(status)
            .and_then(|key| self.responses.get(&key))
            .or_else(|| self.responses.get(&StatusKey::Default))
    }
}

/// A path template with its operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEntry {
    pub template: PathTemplate,
    pub operations: BTreeMap<HttpMethod, OperationSpec>,
}

impl PathEntry {
    /// The template as written in the document.
    pub fn original(&self) -> &str {
        self.template.original()
    }
}

/// Root artifact: every path entry in specificity order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub paths: Vec<PathEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("Patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("TEAPOT"), None);
    }

    #[test]
    fn status_keys_accept_only_the_allow_list() {
        assert_eq!(StatusKey::parse("422"), Some(StatusKey::UnprocessableEntity));
        assert_eq!(StatusKey::parse("default"), Some(StatusKey::Default));
        assert_eq!(StatusKey::parse("500"), None);
        assert_eq!(StatusKey::from_code(204), None);
    }

    #[test]
    fn content_type_drops_parameters() {
        let (raw, parsed) = ContentType::normalize("Application/JSON; charset=utf-8");
        assert_eq!(raw, "application/json");
        assert_eq!(parsed, Some(ContentType::ApplicationJson));

        let (raw, parsed) = ContentType::normalize("application/xml");
        assert_eq!(raw, "application/xml");
        assert_eq!(parsed, None);
    }

    #[test]
    fn status_key_serializes_as_code() {
        let json = serde_json::to_string(&StatusKey::Created).unwrap();
        assert_eq!(json, "\"201\"");
    }

    #[test]
    fn parameter_schema_matches_type() {
        let param = ParameterSpec {
            name: "id".into(),
            location: ParamLocation::Path,
            description: "pet id".into(),
            required: true,
            param_type: ParamType::Integer,
        };
        assert_eq!(
            param.schema().to_json_schema(),
            serde_json::json!({"type": "integer"})
        );
        assert_eq!(
            serde_json::to_value(&param).unwrap()["schema"],
            serde_json::json!({"type": "integer"})
        );
    }
}
