//! Request-path routing over the canonical path order.
//!
//! Resolution is a first-match scan with no backtracking: precedence comes
//! entirely from [`sort_by_specificity`](strictapi_schema::sort_by_specificity),
//! which the parser has already applied.

use strictapi_schema::{request_segments, PathEntry};

/// A resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub entry: &'a PathEntry,
    /// Path-variable values, in template order.
    pub params: Vec<(String, String)>,
}

/// Borrowing view over a schema's ordered path entries.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    entries: &'a [PathEntry],
}

impl<'a> Router<'a> {
    pub fn new(entries: &'a [PathEntry]) -> Self {
        Self { entries }
    }

    /// First template, in canonical order, that matches `path`.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'a>> {
        let segments = request_segments(path);
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.template.matches(&segments))?;
        tracing::debug!(path, template = entry.original(), "route resolved");
        Some(RouteMatch {
            entry,
            params: entry.template.extract(&segments),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strictapi_schema::parse;

    fn schema() -> strictapi_schema::Schema {
        let get = |params: serde_json::Value| {
            json!({"get": {
                "summary": "s",
                "tags": ["t"],
                "parameters": params,
                "responses": {"200": {"description": "ok"}}
            }})
        };
        let id = json!([{"name": "id", "in": "path", "required": true, "description": "", "schema": {"type": "integer"}}]);
        parse(&json!({
            "openapi": "3.0.0",
            "info": {"version": "1", "title": "t"},
            "tags": [{"name": "t", "description": ""}],
            "paths": {
                "/pets/{id}": get(id),
                "/pets": get(json!([])),
                "/pets/mine": get(json!([])),
            }
        }))
        .unwrap()
    }

    #[test]
    fn literal_template_wins() {
        let schema = schema();
        let router = Router::new(&schema.paths);
        assert_eq!(router.resolve("/pets").unwrap().entry.original(), "/pets");
        assert_eq!(router.resolve("/pets/mine").unwrap().entry.original(), "/pets/mine");
        assert_eq!(router.resolve("/pets/123").unwrap().entry.original(), "/pets/{id}");
    }

    #[test]
    fn constants_match_case_insensitively() {
        let schema = schema();
        let router = Router::new(&schema.paths);
        assert_eq!(router.resolve("/PETS/Mine").unwrap().entry.original(), "/pets/mine");
    }

    #[test]
    fn params_are_extracted_from_the_request_path() {
        let schema = schema();
        let router = Router::new(&schema.paths);
        let route = router.resolve("/pets/42/").unwrap();
        assert_eq!(route.params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let schema = schema();
        let router = Router::new(&schema.paths);
        assert!(router.resolve("/").is_none());
        assert!(router.resolve("/pets/1/toys").is_none());
        assert!(router.resolve("/owners").is_none());
    }
}
