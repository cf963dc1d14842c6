//! # Path Templates and Specificity Ordering
//!
//! A path template such as `/pets/{id}` is a sequence of constant and
//! variable segments. After every template of a document is parsed, the
//! whole set is sorted into one canonical order that serves both the
//! deterministic dump and first-match routing.
//!
//! ## Ordering
//!
//! Templates are padded to the longest segment count. At each position a
//! missing segment ranks 0, a constant ranks 1 (then by literal), a variable
//! ranks 2 (then by name). Comparing the padded `(rank, value)` sequences
//! lexicographically puts a literal ahead of a variable at every shared
//! position, so `/pets/mine` is always tried before `/pets/{id}`.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{ParseError, ParseResult};
use crate::model::PathEntry;

/// Grammar every template must satisfy, quoted in rejection messages.
pub const PATH_GRAMMAR: &str = r"^(/(\{?[a-zA-Z0-9_]+\}?)?)+$";

/// One `/`-separated piece of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathSegment {
    Const { value: String },
    Variable { name: String },
}

impl PathSegment {
    fn rank(&self) -> (u8, &str) {
        match self {
            Self::Const { value } => (1, value),
            Self::Variable { name } => (2, name),
        }
    }

    /// Whether a concrete request segment satisfies this template segment.
    /// Constants compare case-insensitively; variables match anything.
    pub fn accepts(&self, segment: &str) -> bool {
        match self {
            Self::Const { value } => value.to_lowercase() == segment.to_lowercase(),
            Self::Variable { .. } => true,
        }
    }
}

/// A parsed route definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTemplate {
    original: String,
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    /// Parse `raw`, reporting grammar violations against `prefix`.
    ///
    /// Every segment must be either a bare identifier or a whole `{identifier}`;
    /// empty segments are accepted and dropped.
    pub fn parse(prefix: &str, raw: &str) -> ParseResult<Self> {
        let reject = || ParseError::at(prefix, format!("expect match \"{PATH_GRAMMAR}\""));

        let rest = raw.strip_prefix('/').ok_or_else(reject)?;
        let mut segments = Vec::new();
        for piece in rest.split('/') {
            if piece.is_empty() {
                continue;
            }
            let segment = match piece.strip_prefix('{') {
                Some(inner) => {
                    let name = inner.strip_suffix('}').ok_or_else(reject)?;
                    if !is_identifier(name) {
                        return Err(reject());
                    }
                    PathSegment::Variable { name: name.to_string() }
                }
                None => {
                    if !is_identifier(piece) {
                        return Err(reject());
                    }
                    PathSegment::Const { value: piece.to_string() }
                }
            };
            segments.push(segment);
        }
        Ok(Self {
            original: raw.to_string(),
            segments,
        })
    }

    /// The template as written in the document.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Variable names in template order.
    pub fn variables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Variable { name } => Some(name.as_str()),
                PathSegment::Const { .. } => None,
            })
            .collect()
    }

    /// Whether the non-empty request segments satisfy this template.
    pub fn matches(&self, request: &[&str]) -> bool {
        request.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(request)
                .all(|(segment, value)| segment.accepts(value))
    }

    /// Pair each variable with its request segment, in template order.
    pub fn extract(&self, request: &[&str]) -> Vec<(String, String)> {
        self.segments
            .iter()
            .zip(request)
            .filter_map(|(segment, value)| match segment {
                PathSegment::Variable { name } => Some((name.clone(), (*value).to_string())),
                PathSegment::Const { .. } => None,
            })
            .collect()
    }

    /// Compare two templates by specificity, both padded to `width` segments.
    fn cmp_padded(&self, other: &Self, width: usize) -> Ordering {
        for i in 0..width {
            let left = self.segments.get(i).map_or((0, ""), PathSegment::rank);
            let right = other.segments.get(i).map_or((0, ""), PathSegment::rank);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

/// Split a concrete request path into its non-empty segments.
pub fn request_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Sort entries into canonical specificity order.
pub fn sort_by_specificity(entries: &mut [PathEntry]) {
    let width = entries
        .iter()
        .map(|entry| entry.template.segments.len())
        .max()
        .unwrap_or(0);
    entries.sort_by(|a, b| a.template.cmp_padded(&b.template, width));
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn template(raw: &str) -> PathTemplate {
        PathTemplate::parse("/paths", raw).unwrap()
    }

    fn entry(raw: &str) -> PathEntry {
        PathEntry {
            template: template(raw),
            operations: BTreeMap::new(),
        }
    }

    #[test]
    fn parses_const_and_variable_segments() {
        let t = template("/pets/{id}/toys");
        assert_eq!(
            t.segments(),
            &[
                PathSegment::Const { value: "pets".into() },
                PathSegment::Variable { name: "id".into() },
                PathSegment::Const { value: "toys".into() },
            ]
        );
        assert_eq!(t.variables(), vec!["id"]);
    }

    #[test]
    fn root_has_no_segments() {
        assert!(template("/").segments().is_empty());
        assert!(template("/pets/").segments().len() == 1);
    }

    #[test]
    fn rejects_malformed_templates() {
        for raw in ["this-is-not-valid-path", "/ xxx", "/{{abc}}", "/{ab}a", "/a{b}", "/{ab", ""] {
            let err = PathTemplate::parse(&format!("/paths:{raw}"), raw).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Broken schema: \"/paths:{raw}\" expect match \"{PATH_GRAMMAR}\""),
                "template {raw:?}"
            );
        }
    }

    #[test]
    fn literal_sorts_before_variable_at_same_position() {
        let mut entries = vec![entry("/pets/{id}"), entry("/pets/mine"), entry("/pets")];
        sort_by_specificity(&mut entries);
        let order: Vec<&str> = entries.iter().map(PathEntry::original).collect();
        assert_eq!(order, vec!["/pets", "/pets/mine", "/pets/{id}"]);
    }

    #[test]
    fn shorter_templates_sort_first_on_shared_prefix() {
        let mut entries = vec![entry("/{kind}"), entry("/a/b"), entry("/a")];
        sort_by_specificity(&mut entries);
        let order: Vec<&str> = entries.iter().map(PathEntry::original).collect();
        assert_eq!(order, vec!["/a", "/a/b", "/{kind}"]);
    }

    #[test]
    fn matching_is_case_insensitive_for_constants() {
        let t = template("/Pets/{id}");
        assert!(t.matches(&["pets", "12"]));
        assert!(!t.matches(&["pets"]));
        assert!(!t.matches(&["toys", "12"]));
        assert_eq!(
            t.extract(&["pets", "12"]),
            vec![("id".to_string(), "12".to_string())]
        );
    }

    #[test]
    fn request_segments_drop_empty_pieces() {
        assert_eq!(request_segments("//pets///12/"), vec!["pets", "12"]);
        assert!(request_segments("/").is_empty());
    }
}
