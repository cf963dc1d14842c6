//! # Key-Set Assertions
//!
//! Data-driven shape checks shared by every level of the parser. Each
//! document node declares which keys it requires and which it tolerates;
//! [`assert_keys`] rejects anything else. The remaining helpers cover the
//! other literal checks (allow-lists, exact values, container kinds) so that
//! every rejection message is produced in one place.

use serde_json::{Map, Value};

use crate::error::{ParseError, ParseResult};

/// Check that `object` has every `required` key and nothing outside
/// `required ∪ optional`.
///
/// Missing keys are reported first, in the order given by `required`;
/// unknown keys are reported in document order.
pub fn assert_keys(
    prefix: &str,
    object: &Map<String, Value>,
    required: &[&str],
    optional: &[&str],
) -> ParseResult<()> {
    let missed: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missed.is_empty() {
        return Err(ParseError::at(
            prefix,
            format!("missed required keys {}", render_list(&missed)),
        ));
    }

    let unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !required.contains(key) && !optional.contains(key))
        .collect();
    if !unknown.is_empty() {
        return Err(ParseError::at(
            prefix,
            format!("unknown keys {}", render_list(&unknown)),
        ));
    }
    Ok(())
}

/// Check that `value` is one of `allowed`.
pub fn assert_one_of(prefix: &str, value: &Value, allowed: &[Value]) -> ParseResult<()> {
    if allowed.contains(value) {
        return Ok(());
    }
    let rendered: Vec<String> = allowed.iter().map(Value::to_string).collect();
    Err(ParseError::at(
        prefix,
        format!(
            "unknown \"{}\", allow to use [{}]",
            render_value(value),
            rendered.join(", ")
        ),
    ))
}

/// String flavour of [`assert_one_of`].
pub fn assert_one_of_str(prefix: &str, value: &str, allowed: &[&str]) -> ParseResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ParseError::at(
        prefix,
        format!("unknown \"{value}\", allow to use {}", render_list(allowed)),
    ))
}

/// Check that `value` is exactly the string `expected`.
pub fn assert_equal(prefix: &str, value: &Value, expected: &str) -> ParseResult<()> {
    if value.as_str() == Some(expected) {
        return Ok(());
    }
    Err(ParseError::at(
        prefix,
        format!("expect \"{expected}\" but get \"{}\"", render_value(value)),
    ))
}

/// Require a mapping node.
pub fn expect_object<'a>(prefix: &str, value: &'a Value) -> ParseResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ParseError::at(prefix, "should be hash"))
}

/// Require a sequence node.
pub fn expect_array<'a>(prefix: &str, value: &'a Value) -> ParseResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ParseError::at(prefix, "should be array"))
}

/// Accept an absent or string node, returning the string.
pub fn expect_optional_string<'a>(
    prefix: &str,
    value: Option<&'a Value>,
) -> ParseResult<Option<&'a str>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ParseError::at(
            prefix,
            format!("expect nil or string, but \"{}\"", render_value(other)),
        )),
    }
}

/// Render names as `["a", "b"]`.
pub fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| Value::String(item.as_ref().to_string()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Render a value for interpolation inside quotes: strings verbatim,
/// `null` as empty, anything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
