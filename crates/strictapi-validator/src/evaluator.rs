//! # JSON-Schema Evaluator
//!
//! Body checks are delegated to a JSON-Schema engine through the
//! [`Evaluator`] trait. The default [`JsonSchemaEvaluator`] compiles the
//! rendered canonical schema with the `jsonschema` crate under Draft 4,
//! the draft whose `type: [T, "null"]` arrays and boolean
//! `additionalProperties` the canonical form is written against.
//!
//! Failure messages are forwarded verbatim by the validator, wrapped in its
//! own `request failed: ` / `schema failed for …: ` prefixes.

use std::fmt;

use jsonschema::Draft;
use serde_json::Value;
use strictapi_schema::CanonicalSchema;

/// Checks an instance against a canonical schema.
pub trait Evaluator: Send + Sync {
    /// `Err` carries a human-readable description of every violation.
    fn evaluate(&self, schema: &CanonicalSchema, instance: &Value) -> Result<(), String>;
}

/// A single violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value in the instance.
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.instance_path, self.message)
    }
}

/// Every violation of one evaluation, rendered joined by `; `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// [`Evaluator`] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEvaluator;

impl JsonSchemaEvaluator {
    /// Collect every violation of `instance` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns `invalid schema: <reason>` when the rendered schema does not
    /// compile (for example a `pattern` that is not a valid regex).
    pub fn violations(&self, schema: &CanonicalSchema, instance: &Value) -> Result<Violations, String> {
        let rendered = schema.to_json_schema();
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft4);
        let validator = opts
            .build(&rendered)
            .map_err(|e| format!("invalid schema: {e}"))?;

        let violations = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        Ok(Violations(violations))
    }
}

impl Evaluator for JsonSchemaEvaluator {
    fn evaluate(&self, schema: &CanonicalSchema, instance: &Value) -> Result<(), String> {
        let violations = self.violations(schema, instance)?;
        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = violations.len(), "instance rejected by schema");
            Err(violations.to_string())
        }
    }
}
