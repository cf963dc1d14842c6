//! # Spec Source
//!
//! Retrieves the raw specification document named by a target string and
//! decodes it into the JSON value model the parser consumes.
//!
//! ## Target Classification
//!
//! | Target | Retrieval | Decoding |
//! |--------|-----------|----------|
//! | `http…` | blocking GET | JSON, or YAML when the URL path ends in `.yml`/`.yaml` |
//! | `*.json` | file read | JSON |
//! | `*.yml`, `*.yaml` | file read | YAML |
//! | anything else | none | fails on every attempt |
//!
//! Classification happens on every fetch, never at construction, so a
//! misconfigured target surfaces through the validator's retained error on
//! each refresh instead of aborting start-up.

use std::path::Path;
use std::time::Duration;

use serde_json::{Map, Value};
use serde_yaml::Value as Yaml;
use thiserror::Error;
use url::Url;

/// Default timeout for HTTP targets.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to retrieve or decode a specification document.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The target is neither a URL nor a file with a known extension.
    #[error("don't know how to open target \"{0}\"")]
    UnknownTarget(String),

    /// The target looks like a URL but does not parse as one.
    #[error("invalid URL \"{target}\": {reason}")]
    InvalidUrl { target: String, reason: String },

    /// Transport-level HTTP failure.
    #[error("failed to fetch \"{target}\": {source}")]
    Http {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("failed to fetch \"{target}\": HTTP {status}")]
    Status { target: String, status: u16 },

    /// The file could not be read.
    #[error("failed to read \"{target}\": {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The retrieved bytes are not a valid document.
    #[error("failed to decode \"{target}\": {reason}")]
    Decode { target: String, reason: String },
}

/// Anything able to produce the raw specification document.
///
/// The validator calls `fetch` on every refresh attempt and never caches
/// the returned value.
pub trait SpecFetcher: Send + Sync {
    fn fetch(&self) -> Result<Value, SourceError>;
}

impl<F> SpecFetcher for F
where
    F: Fn() -> Result<Value, SourceError> + Send + Sync,
{
    fn fetch(&self) -> Result<Value, SourceError> {
        self()
    }
}

/// How the document bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &str) -> Option<Self> {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yml" | "yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// The stock [`SpecFetcher`]: an HTTP(S) URL or a local file path.
#[derive(Debug, Clone)]
pub struct SpecSource {
    target: String,
    timeout: Duration,
}

impl SpecSource {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Override the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn fetch_http(&self) -> Result<Value, SourceError> {
        let url = Url::parse(&self.target).map_err(|e| SourceError::InvalidUrl {
            target: self.target.clone(),
            reason: e.to_string(),
        })?;
        let format = Format::from_path(url.path()).unwrap_or(Format::Json);

        let http_err = |source| SourceError::Http {
            target: self.target.clone(),
            source,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(http_err)?;
        let resp = client.get(url).send().map_err(http_err)?;
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                target: self.target.clone(),
                status: resp.status().as_u16(),
            });
        }
        let text = resp.text().map_err(http_err)?;
        decode(&self.target, &text, format)
    }

    fn fetch_file(&self, format: Format) -> Result<Value, SourceError> {
        let text = std::fs::read_to_string(&self.target).map_err(|source| SourceError::Io {
            target: self.target.clone(),
            source,
        })?;
        decode(&self.target, &text, format)
    }
}

impl SpecFetcher for SpecSource {
    fn fetch(&self) -> Result<Value, SourceError> {
        tracing::info!(target_spec = %self.target, "fetching specification");
        if self.target.starts_with("http") {
            return self.fetch_http();
        }
        match Format::from_path(&self.target) {
            Some(format) => self.fetch_file(format),
            None => Err(SourceError::UnknownTarget(self.target.clone())),
        }
    }
}

fn decode(target: &str, text: &str, format: Format) -> Result<Value, SourceError> {
    let decode_err = |reason: String| SourceError::Decode {
        target: target.to_string(),
        reason,
    };
    match format {
        Format::Json => serde_json::from_str(text).map_err(|e| decode_err(format!("invalid JSON: {e}"))),
        Format::Yaml => {
            let yaml: Yaml =
                serde_yaml::from_str(text).map_err(|e| decode_err(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml).map_err(decode_err)
        }
    }
}

/// Convert a decoded YAML document into the JSON value model the parser
/// walks.
///
/// Status keys are usually written unquoted (`200:`), which YAML reads as
/// integers, so scalar mapping keys take their JSON text. Two keys that
/// render the same (`200:` beside `'200':`) are rejected instead of letting
/// the later one win. Errors name the node with the parser's `:`-joined
/// prefix notation.
pub fn yaml_to_json_value(yaml: &Yaml) -> Result<Value, String> {
    convert(yaml, "")
}

fn convert(node: &Yaml, at: &str) -> Result<Value, String> {
    let value = match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => json_number(n)
            .ok_or_else(|| format!("number {n} at \"{}\" has no JSON form", root_or(at)))?,
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &format!("{at}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, child) in mapping {
                let key = scalar_key(key)
                    .ok_or_else(|| format!("non-scalar mapping key at \"{}\"", root_or(at)))?;
                let child_at = if at.is_empty() {
                    format!("/{key}")
                } else {
                    format!("{at}:{key}")
                };
                if object.contains_key(&key) {
                    return Err(format!("duplicate key at \"{child_at}\""));
                }
                let converted = convert(child, &child_at)?;
                object.insert(key, converted);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => convert(&tagged.value, at)?,
    };
    Ok(value)
}

fn root_or(at: &str) -> &str {
    if at.is_empty() {
        "/"
    } else {
        at
    }
}

fn json_number(n: &serde_yaml::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return Some(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Value::from(u));
    }
    n.as_f64().and_then(serde_json::Number::from_f64).map(Value::Number)
}

fn scalar_key(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Tagged(tagged) => scalar_key(&tagged.value),
        Yaml::Null | Yaml::Sequence(_) | Yaml::Mapping(_) => None,
    }
}
