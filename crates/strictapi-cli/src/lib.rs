//! # strictapi-cli — Strict OpenAPI Command-Line Interface
//!
//! Thin shell over `strictapi-validator` for use in CI and by hand.
//!
//! ## Subcommands
//!
//! - `compile`: fetch and parse the specification, print the canonical form
//! - `routes`: list path templates in match order with their methods
//! - `check-request`: validate one request
//! - `check-response`: validate one response
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; handlers take parsed
//!   arguments and an output sink so they can be driven from tests.
//! - Handlers return the process exit code. Validation failures print the
//!   message to stderr and exit 1; operational errors propagate as
//!   `anyhow::Error`.

pub mod check;
pub mod compile;
pub mod routes;

use anyhow::{Context, Result};
use strictapi_validator::{ValidationError, Validator, ValidatorConfig};

/// Build the validator from `--spec`, falling back to the environment.
pub fn load_validator(spec: Option<&str>) -> Result<Validator> {
    let config = match spec {
        Some(target) => ValidatorConfig::new(target),
        None => ValidatorConfig::from_env().context("no --spec given")?,
    };
    tracing::debug!(target_spec = %config.spec_target, "using specification");
    Ok(Validator::from_config(&config))
}

/// Map a validation outcome to an exit code, reporting failures on stderr.
pub fn report(outcome: Result<(), ValidationError>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}
