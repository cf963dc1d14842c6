//! # Check Subcommands
//!
//! `check-request` and `check-response` run one validation call against
//! the specification and exit 0 when it conforms, 1 otherwise.
//!
//! Bodies come from `--body` or `--body-file`; omitting both checks an
//! empty body.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strictapi_validator::Validator;

/// Arguments for the check-request subcommand.
#[derive(Args, Debug)]
pub struct CheckRequestArgs {
    /// HTTP method, any case.
    #[arg(long)]
    pub method: String,

    /// Request path, e.g. `/pets/12`.
    #[arg(long)]
    pub path: String,

    /// Query parameter as `name=value`. Repeatable.
    #[arg(long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Arguments for the check-response subcommand.
#[derive(Args, Debug)]
pub struct CheckResponseArgs {
    /// HTTP method of the request being answered.
    #[arg(long)]
    pub method: String,

    /// Request path being answered.
    #[arg(long)]
    pub path: String,

    /// Response status code.
    #[arg(long)]
    pub status: u16,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Content type and body shared by both checks.
#[derive(Args, Debug, Default)]
pub struct BodyArgs {
    /// Content-Type header value; parameters such as `charset` are ignored.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Body text.
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the body from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

impl BodyArgs {
    fn load(&self) -> Result<Option<String>> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(Some(body.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("failed to read body from {}", path.display())),
            (None, None) => Ok(None),
        }
    }
}

/// Parse `name=value`; the value may itself contain `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got \"{raw}\""))
}

/// Execute the check-request subcommand.
pub fn run_check_request(args: &CheckRequestArgs, validator: &Validator) -> Result<u8> {
    let body = args.body.load()?;
    let outcome = validator.validate_request(
        &args.method,
        &args.path,
        &args.query,
        args.body.content_type.as_deref(),
        body.as_deref(),
    );
    Ok(crate::report(outcome))
}

/// Execute the check-response subcommand.
pub fn run_check_response(args: &CheckResponseArgs, validator: &Validator) -> Result<u8> {
    let body = args.body.load()?;
    let outcome = validator.validate_response(
        &args.method,
        &args.path,
        args.status,
        args.body.content_type.as_deref(),
        body.as_deref(),
    );
    Ok(crate::report(outcome))
}
