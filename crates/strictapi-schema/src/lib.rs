//! # strictapi-schema — Strict OpenAPI Dialect Parser
//!
//! Turns a raw OpenAPI 3.0 document into a fully normalized, `$ref`-free
//! [`Schema`], rejecting anything outside the supported subset with a
//! literal, location-prefixed [`ParseError`].
//!
//! ## Modules
//!
//! - [`parser`]: the document walk and the recursive schema canonicalizer.
//! - [`canonical`]: the tagged-variant schema model and its JSON-Schema
//!   rendering.
//! - [`model`]: operations, parameters, bodies and the typed enumerations
//!   (methods, status keys, content types).
//! - [`path`]: path templates and the specificity ordering shared by the
//!   canonical dump and request routing.
//! - [`keys`]: the data-driven key-set assertions behind every rejection.
//!
//! ## Crate Policy
//!
//! - Pure: no I/O, no clocks, no global state. Fetching documents belongs
//!   to `strictapi-validator`.
//! - Error message text is a tested contract. Changing a message is a
//!   breaking change.

pub mod canonical;
pub mod error;
pub mod keys;
pub mod model;
pub mod parser;
pub mod path;

pub use canonical::{
    AdditionalProperties, ArraySchema, BooleanSchema, CanonicalSchema, FloatSchema,
    IntegerSchema, ObjectSchema, StringSchema,
};
pub use error::{ParseError, ParseResult};
pub use model::{
    ContentType, HttpMethod, OperationSpec, ParamLocation, ParamType, ParameterSpec, PathEntry,
    RequestBodySpec, ResponseContent, ResponseSpec, Schema, StatusKey,
};
pub use parser::{canonicalize_schema, parse, ComponentTable, OPENAPI_VERSION};
pub use path::{request_segments, sort_by_specificity, PathSegment, PathTemplate, PATH_GRAMMAR};
