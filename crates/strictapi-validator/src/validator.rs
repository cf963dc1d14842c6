//! # Validator
//!
//! Checks concrete requests and responses against the live specification.
//!
//! Each call takes one schema snapshot from the [`SpecLifecycle`] and then
//! works lock-free against it:
//!
//! 1. Route the path, then pick the operation by method.
//! 2. Requests: merge path and query parameters, type-check each one, then
//!    check required parameters as a set.
//! 3. Bodies: empty bodies only matter when one is required; non-empty
//!    bodies need a declared content type, and JSON bodies are handed to the
//!    [`Evaluator`].
//!
//! Every failure carries a literal message naming the path and method as
//! received (method lowercased).

use std::sync::Arc;

use serde_json::Value;
use strictapi_schema::keys::render_list;
use strictapi_schema::{
    ContentType, HttpMethod, OperationSpec, ParamType, ResponseContent, Schema,
};

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::evaluator::{Evaluator, JsonSchemaEvaluator};
use crate::lifecycle::{LifecycleStatus, SpecLifecycle};
use crate::router::Router;
use crate::source::{SpecFetcher, SpecSource};

/// Shared, thread-safe validator for one specification.
pub struct Validator {
    lifecycle: SpecLifecycle,
    evaluator: Box<dyn Evaluator>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

/// The operation a call resolved to, plus the context its messages need.
struct Resolved<'a> {
    operation: &'a OperationSpec,
    params: Vec<(String, String)>,
    method: String,
}

impl Validator {
    /// Validator over `fetcher` with the default JSON-Schema evaluator.
    pub fn new(fetcher: impl SpecFetcher + 'static) -> Self {
        Self::with_evaluator(fetcher, JsonSchemaEvaluator)
    }

    pub fn with_evaluator(
        fetcher: impl SpecFetcher + 'static,
        evaluator: impl Evaluator + 'static,
    ) -> Self {
        Self {
            lifecycle: SpecLifecycle::new(Box::new(fetcher)),
            evaluator: Box::new(evaluator),
        }
    }

    /// Validator over a [`SpecSource`] built from `config`.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        let source = SpecSource::new(config.spec_target.clone()).with_timeout(config.fetch_timeout);
        Self::new(source)
    }

    /// The live schema, refreshing first when eligible.
    pub fn schema(&self) -> Result<Arc<Schema>, ValidationError> {
        self.lifecycle.snapshot()
    }

    pub fn status(&self) -> LifecycleStatus {
        self.lifecycle.status()
    }

    /// Check an incoming request.
    ///
    /// `query` holds decoded query pairs in arrival order. An empty `body`
    /// counts as absent.
    pub fn validate_request(
        &self,
        method: &str,
        path: &str,
        query: &[(String, String)],
        content_type: Option<&str>,
        body: Option<&str>,
    ) -> Result<(), ValidationError> {
        let schema = self.lifecycle.snapshot()?;
        let resolved = resolve(&schema, method, path)?;
        let m = resolved.method.as_str();
        let op = resolved.operation;

        let params = merge_params(resolved.params, query);
        for (name, value) in &params {
            let spec = op.parameter(name).ok_or_else(|| {
                reject(format!("Unknown param \"{name}\" for \"{path}\" \"{m}\""))
            })?;
            match spec.param_type {
                ParamType::Integer if !is_positive_decimal(value) => {
                    return Err(reject(format!(
                        "Expect integer param \"{name}\" but get \"{value}\" for \"{path}\" \"{m}\""
                    )))
                }
                ParamType::Boolean if !is_boolean(value) => {
                    return Err(reject(format!(
                        "Expect boolean param \"{name}\" but get \"{value}\" for \"{path}\" \"{m}\""
                    )))
                }
                _ => {}
            }
        }

        let missed: Vec<&str> = op
            .required_parameters()
            .filter(|required| !params.iter().any(|(name, _)| name == required))
            .collect();
        if !missed.is_empty() {
            return Err(reject(format!(
                "Missed required params {} for \"{path}\" \"{m}\"",
                render_list(&missed)
            )));
        }

        let Some(body) = body.filter(|b| !b.is_empty()) else {
            if op.request_body.as_ref().is_some_and(|rb| rb.required) {
                return Err(reject(format!(
                    "Request body required but missed for \"{path}\" \"{m}\""
                )));
            }
            tracing::debug!(method = m, path, "request conforms");
            return Ok(());
        };

        let (content_type, parsed) = ContentType::normalize(content_type.unwrap_or_default());
        let Some(request_body) = &op.request_body else {
            return Err(reject(format!(
                "Request body provided but not defined in schema for \"{path}\" \"{m}\" \"{content_type}\""
            )));
        };
        let body_schema = parsed
            .and_then(|ct| request_body.content.get(&ct))
            .ok_or_else(|| {
                reject(format!(
                    "Not found request body spec for \"{path}\" \"{m}\" \"{content_type}\""
                ))
            })?;

        self.evaluate_json(body_schema, body)
            .map_err(|message| reject(format!("request failed: {message}")))?;
        tracing::debug!(method = m, path, "request conforms");
        Ok(())
    }

    /// Check an outgoing response.
    ///
    /// The status is looked up exactly, then under `default`. An empty
    /// `body` always passes once the status is documented.
    pub fn validate_response(
        &self,
        method: &str,
        path: &str,
        status: u16,
        content_type: Option<&str>,
        body: Option<&str>,
    ) -> Result<(), ValidationError> {
        let schema = self.lifecycle.snapshot()?;
        let resolved = resolve(&schema, method, path)?;
        let m = resolved.method.as_str();

        let response = resolved.operation.response_for(status).ok_or_else(|| {
            ValidationError::NotFoundSpecForStatus(format!(
                "Not found spec for \"{path}\" \"{m}\" \"{status}\""
            ))
        })?;

        let Some(body) = body.filter(|b| !b.is_empty()) else {
            return Ok(());
        };

        let (content_type, parsed) = ContentType::normalize(content_type.unwrap_or_default());
        let content = parsed
            .and_then(|ct| response.content.get(&ct))
            .ok_or_else(|| {
                reject(format!(
                    "Not found spec for \"{path}\" \"{m}\" \"{status}\" \"{content_type}\""
                ))
            })?;

        match content {
            ResponseContent::Json(body_schema) => {
                self.evaluate_json(body_schema, body).map_err(|message| {
                    reject(format!(
                        "schema failed for \"{path}\" \"{m}\" \"{status}\" \"{content_type}\": {message}"
                    ))
                })?;
            }
            ResponseContent::Text { .. } => {}
        }
        tracing::debug!(method = m, path, status, "response conforms");
        Ok(())
    }

    fn evaluate_json(
        &self,
        schema: &strictapi_schema::CanonicalSchema,
        body: &str,
    ) -> Result<(), String> {
        let instance: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
        self.evaluator.evaluate(schema, &instance)
    }
}

fn reject(message: String) -> ValidationError {
    ValidationError::RequestValidation(message)
}

fn resolve<'a>(schema: &'a Schema, method: &str, path: &str) -> Result<Resolved<'a>, ValidationError> {
    let route = Router::new(&schema.paths)
        .resolve(path)
        .ok_or_else(|| reject(format!("Not found spec for \"{path}\"")))?;
    let lowered = method.to_lowercase();
    let operation = HttpMethod::parse(&lowered)
        .and_then(|m| route.entry.operations.get(&m))
        .ok_or_else(|| reject(format!("Not found spec for \"{path}\" \"{lowered}\"")))?;
    Ok(Resolved {
        operation,
        params: route.params,
        method: lowered,
    })
}

/// Overlay query pairs onto path values, keeping first-seen key order.
fn merge_params(path: Vec<(String, String)>, query: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = path;
    for (name, value) in query {
        match merged.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value.clone(),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}

/// `^[1-9][0-9]*$`
fn is_positive_decimal(value: &str) -> bool {
    let mut bytes = value.bytes();
    matches!(bytes.next(), Some(b'1'..=b'9')) && bytes.all(|b| b.is_ascii_digit())
}

fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}
