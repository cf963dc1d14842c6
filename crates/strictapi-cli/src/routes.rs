//! Routes subcommand: one line per path template, in the order requests
//! are matched against them.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use strictapi_schema::HttpMethod;
use strictapi_validator::Validator;

/// Arguments for the routes subcommand.
#[derive(Args, Debug, Default)]
pub struct RoutesArgs {}

/// Execute the routes subcommand.
///
/// Output lines look like `/pets/{id} get, delete`.
pub fn run_routes(_args: &RoutesArgs, validator: &Validator, out: &mut impl Write) -> Result<u8> {
    let schema = match validator.schema() {
        Ok(schema) => schema,
        Err(e) => return Ok(crate::report(Err(e))),
    };
    for entry in &schema.paths {
        let methods: Vec<&str> = entry.operations.keys().map(HttpMethod::as_str).collect();
        writeln!(out, "{} {}", entry.original(), methods.join(", "))
            .context("failed to write output")?;
    }
    Ok(0)
}
