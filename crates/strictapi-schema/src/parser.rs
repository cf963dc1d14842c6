//! # Specification Parser
//!
//! Validates a raw OpenAPI 3.0 document (already decoded into a JSON value
//! tree) against the restricted dialect and produces a [`Schema`]. Parsing
//! is a pure function: no I/O, no partial results, and the first violation
//! aborts with a [`ParseError`] naming the offending location.
//!
//! ## Document Walk
//!
//! ```text
//! /            {openapi, info, paths} + {components, tags}
//! ├─ openapi   must be "3.0.0"
//! ├─ info      {version, title} + {description}
//! ├─ tags[i]   {name, description}
//! ├─ components.schemas.<Name>   canonicalized against an EMPTY table
//! └─ paths.<template>.<verb>     canonicalized against the full table
//! ```
//!
//! Components never see each other: a `$ref` inside a component fails with
//! "unknown component". Only operation-level schemas resolve against the
//! complete component table.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use crate::canonical::{
    AdditionalProperties, ArraySchema, BooleanSchema, CanonicalSchema, FloatSchema,
    IntegerSchema, ObjectSchema, StringSchema,
};
use crate::error::{ParseError, ParseResult};
use crate::keys::{
    assert_equal, assert_keys, assert_one_of, assert_one_of_str, expect_array, expect_object,
    expect_optional_string, render_list, render_value,
};
use crate::model::{
    ContentType, HttpMethod, OperationSpec, ParamLocation, ParamType, ParameterSpec, PathEntry,
    RequestBodySpec, ResponseContent, ResponseSpec, Schema, StatusKey,
};
use crate::path::{sort_by_specificity, PathTemplate};

/// The only accepted `openapi` version string.
pub const OPENAPI_VERSION: &str = "3.0.0";

const REF_PREFIX: &str = "#/components/schemas/";

/// Every key a schema node may carry, whatever its type.
const SCHEMA_KEYS: [&str; 11] = [
    "type",
    "items",
    "required",
    "properties",
    "enum",
    "additionalProperties",
    "nullable",
    "pattern",
    "minLength",
    "$ref",
    "oneOf",
];

/// Named component schemas, resolved by `$ref`.
pub type ComponentTable = BTreeMap<String, CanonicalSchema>;

/// Parse a raw specification document into a canonical [`Schema`].
pub fn parse(document: &Value) -> ParseResult<Schema> {
    let root = expect_object("/", document)?;
    assert_keys("/", root, &["openapi", "info", "paths"], &["components", "tags"])?;

    assert_equal("/openapi", &root["openapi"], OPENAPI_VERSION)?;
    parse_info(&root["info"])?;
    let tags = parse_tags(root.get("tags"))?;
    let components = match root.get("components") {
        Some(value) => parse_components(value)?,
        None => ComponentTable::new(),
    };
    let paths = parse_paths(&root["paths"], &components, &tags)?;

    tracing::debug!(
        paths = paths.len(),
        components = components.len(),
        tags = tags.len(),
        "parsed specification document"
    );
    Ok(Schema { paths })
}

fn parse_info(value: &Value) -> ParseResult<()> {
    let info = expect_object("/info", value)?;
    assert_keys("/info", info, &["version", "title"], &["description"])
}

fn parse_tags(value: Option<&Value>) -> ParseResult<Vec<String>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for (index, tag) in expect_array("/tags", value)?.iter().enumerate() {
        let prefix = format!("/tags[{index}]");
        let tag = expect_object(&prefix, tag)?;
        assert_keys(&prefix, tag, &["name", "description"], &[])?;
        names.push(render_value(&tag["name"]));
    }
    Ok(names)
}

fn parse_components(value: &Value) -> ParseResult<ComponentTable> {
    let components = expect_object("/components", value)?;
    assert_keys("/components", components, &["schemas"], &[])?;
    let schemas = expect_object("/components:schemas", &components["schemas"])?;

    let empty = ComponentTable::new();
    schemas
        .iter()
        .map(|(name, schema)| {
            let canonical = canonicalize_schema(&format!("/components:{name}"), schema, &empty)?;
            Ok((name.clone(), canonical))
        })
        .collect()
}

// ─── Schema canonicalization ─────────────────────────────────────────

/// Validate one schema node and normalize it.
///
/// `$ref` nodes resolve to an owned copy of the component, so widening one
/// resolved reference to nullable never leaks into another.
pub fn canonicalize_schema(
    prefix: &str,
    value: &Value,
    components: &ComponentTable,
) -> ParseResult<CanonicalSchema> {
    let node = expect_object(prefix, value)?;
    assert_keys(prefix, node, &[], &SCHEMA_KEYS)?;

    let ty = node.get("type");
    if ty.is_none() && node.contains_key("$ref") {
        assert_keys(&format!("{prefix}[no type]"), node, &[], &["$ref"])?;
        return resolve_ref(prefix, &node["$ref"], components);
    }
    if ty.is_none() && node.contains_key("oneOf") {
        assert_keys(&format!("{prefix}[no type]"), node, &[], &["oneOf"])?;
        let branches = expect_array(&format!("{prefix}:oneOf"), &node["oneOf"])?;
        let branches = branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                canonicalize_schema(&format!("{prefix}:oneOf[{i}]"), branch, components)
            })
            .collect::<ParseResult<Vec<_>>>()?;
        return Ok(CanonicalSchema::OneOf(branches));
    }

    let Some(ty) = ty else {
        return Err(ParseError::at(prefix, "missed type"));
    };
    let typed_prefix = format!("{prefix}[{}]", render_value(ty));
    let schema = match ty.as_str() {
        Some("object") => {
            assert_keys(
                &typed_prefix,
                node,
                &["type", "properties"],
                &["required", "additionalProperties", "nullable"],
            )?;
            CanonicalSchema::Object(parse_object(prefix, node, components)?)
        }
        Some("array") => {
            assert_keys(&typed_prefix, node, &["type", "items"], &["nullable"])?;
            let items = canonicalize_schema(&format!("{prefix}:items"), &node["items"], components)?;
            CanonicalSchema::Array(ArraySchema {
                items: Box::new(items),
            })
        }
        Some("string") => {
            assert_keys(
                &typed_prefix,
                node,
                &["type"],
                &["nullable", "pattern", "enum", "minLength"],
            )?;
            CanonicalSchema::String(parse_string(prefix, node)?)
        }
        Some("integer") => {
            assert_keys(&typed_prefix, node, &["type"], &["nullable", "enum"])?;
            CanonicalSchema::Integer(IntegerSchema {
                accepts_null: false,
                enum_values: parse_enum(prefix, node, "integers", Value::as_i64)?,
            })
        }
        Some("boolean") => {
            assert_keys(&typed_prefix, node, &["type"], &["nullable", "enum"])?;
            CanonicalSchema::Boolean(BooleanSchema {
                accepts_null: false,
                enum_values: parse_enum(prefix, node, "booleans", Value::as_bool)?,
            })
        }
        Some("float") => {
            assert_keys(&typed_prefix, node, &["type"], &["nullable", "enum"])?;
            CanonicalSchema::Float(FloatSchema {
                accepts_null: false,
                enum_values: parse_enum(prefix, node, "numbers", Value::as_f64)?,
            })
        }
        _ => {
            return Err(ParseError::at(
                prefix,
                format!("unknown type \"{}\"", render_value(ty)),
            ))
        }
    };

    if is_nullable(prefix, node)? {
        Ok(schema.or_null())
    } else {
        Ok(schema)
    }
}

fn resolve_ref(
    prefix: &str,
    reference: &Value,
    components: &ComponentTable,
) -> ParseResult<CanonicalSchema> {
    let ref_prefix = format!("{prefix}:$ref");
    let name = reference
        .as_str()
        .and_then(|r| r.strip_prefix(REF_PREFIX))
        .ok_or_else(|| {
            ParseError::at(
                &ref_prefix,
                "should have form \"#/components/schemas/ComponentName\"",
            )
        })?;
    components
        .get(name)
        .cloned()
        .ok_or_else(|| ParseError::at(&ref_prefix, format!("unknown component \"{name}\"")))
}

fn parse_object(
    prefix: &str,
    node: &Map<String, Value>,
    components: &ComponentTable,
) -> ParseResult<ObjectSchema> {
    let declared = expect_object(&format!("{prefix}:properties"), &node["properties"])?;

    let mut required = BTreeSet::new();
    if let Some(value) = node.get("required") {
        let names = expect_array(&format!("{prefix}:required"), value)?;
        let mut undeclared = Vec::new();
        for name in names {
            let name = render_value(name);
            if !declared.contains_key(&name) {
                undeclared.push(name.clone());
            }
            required.insert(name);
        }
        if !undeclared.is_empty() {
            return Err(ParseError::at(
                prefix,
                format!(
                    "\"{}\" are required but not descipted in properties section",
                    render_list(&undeclared)
                ),
            ));
        }
    }

    let additional_properties = match node.get("additionalProperties") {
        None => AdditionalProperties::default(),
        Some(Value::Bool(flag)) => AdditionalProperties::Allowed(*flag),
        Some(schema) => AdditionalProperties::Schema(Box::new(canonicalize_schema(
            &format!("{prefix}:additionalProperties"),
            schema,
            components,
        )?)),
    };

    let properties = declared
        .iter()
        .map(|(name, schema)| {
            let canonical = canonicalize_schema(&format!("{prefix}:{name}"), schema, components)?;
            Ok((name.clone(), canonical))
        })
        .collect::<ParseResult<BTreeMap<_, _>>>()?;

    Ok(ObjectSchema {
        properties,
        required,
        additional_properties,
    })
}

fn parse_string(prefix: &str, node: &Map<String, Value>) -> ParseResult<StringSchema> {
    let enum_values = parse_enum(prefix, node, "strings", |v| v.as_str().map(str::to_string))?;
    let pattern = match node.get("pattern") {
        None => None,
        Some(Value::String(p)) => Some(p.clone()),
        Some(_) => return Err(ParseError::at(format!("{prefix}:pattern"), "should be string")),
    };
    let min_length = match node.get("minLength") {
        None => None,
        Some(value) => Some(value.as_u64().ok_or_else(|| {
            ParseError::at(format!("{prefix}:minLength"), "should be non-negative integer")
        })?),
    };
    Ok(StringSchema {
        accepts_null: false,
        enum_values,
        pattern,
        min_length,
    })
}

/// Read an optional `enum` whose members must all convert with `member`.
fn parse_enum<T>(
    prefix: &str,
    node: &Map<String, Value>,
    kind: &str,
    member: impl Fn(&Value) -> Option<T>,
) -> ParseResult<Option<Vec<T>>> {
    let Some(value) = node.get("enum") else {
        return Ok(None);
    };
    value
        .as_array()
        .and_then(|items| items.iter().map(&member).collect::<Option<Vec<T>>>())
        .map(Some)
        .ok_or_else(|| ParseError::at(format!("{prefix}:enum"), format!("should be array of {kind}")))
}

fn is_nullable(prefix: &str, node: &Map<String, Value>) -> ParseResult<bool> {
    match node.get("nullable") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(ParseError::at(format!("{prefix}:nullable"), "should be boolean")),
    }
}

// ─── Paths and operations ────────────────────────────────────────────

fn parse_paths(
    value: &Value,
    components: &ComponentTable,
    tags: &[String],
) -> ParseResult<Vec<PathEntry>> {
    let paths = expect_object("/paths", value)?;
    let mut entries = Vec::with_capacity(paths.len());
    for (name, item) in paths {
        let prefix = format!("/paths:{name}");
        let template = PathTemplate::parse(&prefix, name)?;
        let operations = parse_path_item(&prefix, item, &template, components, tags)?;
        entries.push(PathEntry {
            template,
            operations,
        });
    }
    sort_by_specificity(&mut entries);
    Ok(entries)
}

fn parse_path_item(
    prefix: &str,
    value: &Value,
    template: &PathTemplate,
    components: &ComponentTable,
    tags: &[String],
) -> ParseResult<BTreeMap<HttpMethod, OperationSpec>> {
    let item = expect_object(prefix, value)?;
    let mut operations = BTreeMap::new();
    for (verb, operation) in item {
        assert_one_of_str(prefix, verb, &HttpMethod::NAMES)?;
        let method = HttpMethod::parse(verb)
            .ok_or_else(|| ParseError::at(prefix, format!("unknown \"{verb}\"")))?;
        let spec = parse_operation(
            &format!("{prefix}:{verb}"),
            operation,
            template,
            components,
            tags,
        )?;
        operations.insert(method, spec);
    }
    Ok(operations)
}

fn parse_operation(
    prefix: &str,
    value: &Value,
    template: &PathTemplate,
    components: &ComponentTable,
    tags: &[String],
) -> ParseResult<OperationSpec> {
    let op = expect_object(prefix, value)?;
    assert_keys(
        prefix,
        op,
        &["responses", "summary", "tags"],
        &["description", "requestBody", "parameters"],
    )?;
    let description = expect_optional_string(&format!("{prefix}:description"), op.get("description"))?;
    let summary = expect_optional_string(&format!("{prefix}:summary"), op.get("summary"))?;

    let tag = match op["tags"].as_array().map(Vec::as_slice) {
        Some([tag]) => render_value(tag),
        _ => {
            return Err(ParseError::at(
                format!("{prefix}:tags"),
                "should be array with one element",
            ))
        }
    };
    if !tags.contains(&tag) {
        return Err(ParseError::at(
            format!("{prefix}:tags[{tag}]"),
            "is not descripted in \"tags\" section of schema",
        ));
    }

    let parameters = match op.get("parameters") {
        None => Vec::new(),
        Some(value) => expect_array(&format!("{prefix}:parameters"), value)?
            .iter()
            .enumerate()
            .map(|(i, param)| parse_parameter(&format!("{prefix}:parameters[{i}]"), param))
            .collect::<ParseResult<Vec<_>>>()?,
    };
    check_path_parameters(prefix, template, &parameters)?;

    let request_body = match op.get("requestBody") {
        None => None,
        Some(value) => Some(parse_request_body(
            &format!("{prefix}:requestBody"),
            value,
            components,
        )?),
    };

    let responses_prefix = format!("{prefix}:responses");
    let mut responses = BTreeMap::new();
    for (code, response) in expect_object(&responses_prefix, &op["responses"])? {
        let response_prefix = format!("{responses_prefix}:{code}");
        assert_one_of_str(&response_prefix, code, &StatusKey::NAMES)?;
        let key = StatusKey::parse(code)
            .ok_or_else(|| ParseError::at(&response_prefix, format!("unknown \"{code}\"")))?;
        responses.insert(key, parse_response(&response_prefix, response, components)?);
    }

    Ok(OperationSpec {
        summary: summary.unwrap_or_default().to_string(),
        description: description.map(str::to_string),
        tag,
        parameters,
        request_body,
        responses,
    })
}

/// Declared path parameters must set-equal the template variables.
fn check_path_parameters(
    prefix: &str,
    template: &PathTemplate,
    parameters: &[ParameterSpec],
) -> ParseResult<()> {
    let variables = template.variables();
    let declared: Vec<&str> = parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| p.name.as_str())
        .collect();

    let missed: Vec<&str> = variables
        .iter()
        .copied()
        .filter(|v| !declared.contains(v))
        .collect();
    if !missed.is_empty() {
        return Err(ParseError::at(
            format!("{prefix}:parameters"),
            format!("missed path params {}", render_list(&missed)),
        ));
    }
    let unknown: Vec<&str> = declared
        .iter()
        .copied()
        .filter(|d| !variables.contains(d))
        .collect();
    if !unknown.is_empty() {
        return Err(ParseError::at(
            format!("{prefix}:parameters"),
            format!("unknown path params {}", render_list(&unknown)),
        ));
    }
    Ok(())
}

fn parse_parameter(prefix: &str, value: &Value) -> ParseResult<ParameterSpec> {
    let param = expect_object(prefix, value)?;
    assert_keys(
        prefix,
        param,
        &["name", "in", "description", "required", "schema"],
        &[],
    )?;
    let name = render_value(&param["name"]);
    let description = render_value(&param["description"]);

    let (location, required, param_type) = match param["in"].as_str() {
        Some("path") => {
            if param["required"] != Value::Bool(true) {
                return Err(ParseError::at(
                    format!("{prefix}:in[path]"),
                    "required should be true",
                ));
            }
            let allowed = [json!({"type": "string"}), json!({"type": "integer"})];
            let schema_prefix = format!("{prefix}:in[schema]");
            assert_one_of(&schema_prefix, &param["schema"], &allowed)?;
            (ParamLocation::Path, true, param_type(&schema_prefix, &param["schema"])?)
        }
        Some("query") => {
            assert_one_of(
                &format!("{prefix}:query[required]"),
                &param["required"],
                &[json!(true), json!(false)],
            )?;
            let allowed = [
                json!({"type": "string"}),
                json!({"type": "integer"}),
                json!({"type": "boolean"}),
            ];
            let schema_prefix = format!("{prefix}:query[schema]");
            assert_one_of(&schema_prefix, &param["schema"], &allowed)?;
            let required = param["required"].as_bool().unwrap_or(false);
            (ParamLocation::Query, required, param_type(&schema_prefix, &param["schema"])?)
        }
        _ => {
            return Err(ParseError::at(
                format!("{prefix}:in"),
                format!(
                    "unknown value \"{}\", allow to use [\"path\", \"query\"]",
                    render_value(&param["in"])
                ),
            ))
        }
    };

    Ok(ParameterSpec {
        name,
        location,
        description,
        required,
        param_type,
    })
}

fn param_type(prefix: &str, schema: &Value) -> ParseResult<ParamType> {
    match schema["type"].as_str() {
        Some("string") => Ok(ParamType::String),
        Some("integer") => Ok(ParamType::Integer),
        Some("boolean") => Ok(ParamType::Boolean),
        _ => Err(ParseError::at(
            prefix,
            format!("unknown \"{}\"", render_value(schema)),
        )),
    }
}

fn parse_request_body(
    prefix: &str,
    value: &Value,
    components: &ComponentTable,
) -> ParseResult<RequestBodySpec> {
    let body = expect_object(prefix, value)?;
    assert_keys(prefix, body, &["content", "description", "required"], &[])?;
    assert_one_of(
        &format!("{prefix}:required"),
        &body["required"],
        &[json!(true), json!(false)],
    )?;

    let mut content = BTreeMap::new();
    for (media, entry) in expect_object(&format!("{prefix}:content"), &body["content"])? {
        let media_prefix = format!("{prefix}:{media}");
        assert_one_of_str(&media_prefix, media, &[ContentType::ApplicationJson.as_str()])?;
        let entry = expect_object(&media_prefix, entry)?;
        assert_keys(&media_prefix, entry, &["schema"], &[])?;
        let schema = canonicalize_schema(&format!("{media_prefix}:schema"), &entry["schema"], components)?;
        content.insert(ContentType::ApplicationJson, schema);
    }

    Ok(RequestBodySpec {
        description: render_value(&body["description"]),
        required: body["required"].as_bool().unwrap_or(false),
        content,
    })
}

fn parse_response(
    prefix: &str,
    value: &Value,
    components: &ComponentTable,
) -> ParseResult<ResponseSpec> {
    let response = expect_object(prefix, value)?;
    assert_keys(prefix, response, &["description"], &["content"])?;

    let mut content = BTreeMap::new();
    if let Some(value) = response.get("content") {
        for (media, entry) in expect_object(&format!("{prefix}:content"), value)? {
            let media_prefix = format!("{prefix}:{media}");
            assert_one_of_str(
                &media_prefix,
                media,
                &[ContentType::ApplicationJson.as_str(), ContentType::TextPlain.as_str()],
            )?;
            let entry = expect_object(&media_prefix, entry)?;
            match ContentType::parse(media) {
                Some(ContentType::ApplicationJson) => {
                    assert_keys(&media_prefix, entry, &["schema"], &[])?;
                    let schema = canonicalize_schema(
                        &format!("{media_prefix}:schema"),
                        &entry["schema"],
                        components,
                    )?;
                    content.insert(ContentType::ApplicationJson, ResponseContent::Json(schema));
                }
                Some(ContentType::TextPlain) => {
                    assert_keys(&media_prefix, entry, &["example"], &[])?;
                    content.insert(
                        ContentType::TextPlain,
                        ResponseContent::Text {
                            example: entry["example"].clone(),
                        },
                    );
                }
                None => return Err(ParseError::at(&media_prefix, format!("unknown \"{media}\""))),
            }
        }
    }

    Ok(ResponseSpec {
        description: render_value(&response["description"]),
        content,
    })
}
