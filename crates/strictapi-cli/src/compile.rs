//! # Compile Subcommand
//!
//! Fetches and parses the specification and prints the canonical schema as
//! pretty JSON: paths in match order, `$ref`s inlined, nullable flattened.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use strictapi_validator::Validator;

/// Arguments for the compile subcommand.
#[derive(Args, Debug, Default)]
pub struct CompileArgs {
    /// Print compact JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Execute the compile subcommand.
pub fn run_compile(args: &CompileArgs, validator: &Validator, out: &mut impl Write) -> Result<u8> {
    let schema = match validator.schema() {
        Ok(schema) => schema,
        Err(e) => return Ok(crate::report(Err(e))),
    };
    let rendered = if args.compact {
        serde_json::to_string(&*schema)
    } else {
        serde_json::to_string_pretty(&*schema)
    }
    .context("failed to serialize canonical schema")?;
    writeln!(out, "{rendered}").context("failed to write output")?;
    Ok(0)
}
