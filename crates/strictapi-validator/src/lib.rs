//! # strictapi-validator — Runtime Traffic Validation
//!
//! Holds the live specification for one service and checks its traffic
//! against it. The document is fetched and parsed lazily on first use and
//! retried on a fixed one-second cooldown while broken; once loaded it is
//! kept for the lifetime of the [`Validator`].
//!
//! ## Modules
//!
//! - [`source`]: the [`SpecFetcher`] seam and the stock URL/file source.
//! - [`lifecycle`]: the Unloaded / Loaded / Error state machine.
//! - [`router`]: first-match routing over the canonical path order.
//! - [`evaluator`]: the JSON-Schema engine adapter.
//! - [`validator`]: request and response checks.
//! - [`config`]: environment-driven configuration.
//!
//! ## Usage
//!
//! ```no_run
//! use strictapi_validator::{SpecSource, Validator};
//!
//! let validator = Validator::new(SpecSource::new("fixtures/petstore.yaml"));
//! let query = vec![("extend".to_string(), "true".to_string())];
//! validator.validate_request("GET", "/pets", &query, None, None)?;
//! # Ok::<(), strictapi_validator::ValidationError>(())
//! ```
//!
//! ## Crate Policy
//!
//! - `Validator` is `Send + Sync`; share one instance across request
//!   workers behind an `Arc`.
//! - Error messages are a tested contract, matched verbatim by callers.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod lifecycle;
pub mod router;
pub mod source;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use error::ValidationError;
pub use evaluator::{Evaluator, JsonSchemaEvaluator, Violation, Violations};
pub use lifecycle::{LifecycleStatus, LoadState, SpecLifecycle, RETRY_COOLDOWN};
pub use router::{RouteMatch, Router};
pub use source::{SourceError, SpecFetcher, SpecSource};
pub use validator::Validator;
