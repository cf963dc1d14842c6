//! # strictapi CLI entry point
//!
//! Parses command-line arguments, initializes tracing, builds the validator
//! and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use strictapi_cli::check::{run_check_request, run_check_response, CheckRequestArgs, CheckResponseArgs};
use strictapi_cli::compile::{run_compile, CompileArgs};
use strictapi_cli::load_validator;
use strictapi_cli::routes::{run_routes, RoutesArgs};

/// Strict OpenAPI toolchain.
///
/// Compiles a restricted OpenAPI 3.0 document to its canonical form and
/// checks individual requests and responses against it.
#[derive(Parser, Debug)]
#[command(name = "strictapi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Specification URL or `.json`/`.yml`/`.yaml` path. Defaults to
    /// `STRICT_OPENAPI_SPEC`.
    #[arg(long, global = true)]
    spec: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse the specification and print its canonical form.
    Compile(CompileArgs),

    /// List path templates in match order with their methods.
    Routes(RoutesArgs),

    /// Validate one request.
    CheckRequest(CheckRequestArgs),

    /// Validate one response.
    CheckResponse(CheckResponseArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_validator(cli.spec.as_deref()).and_then(|validator| {
        let mut stdout = std::io::stdout().lock();
        match &cli.command {
            Commands::Compile(args) => run_compile(args, &validator, &mut stdout),
            Commands::Routes(args) => run_routes(args, &validator, &mut stdout),
            Commands::CheckRequest(args) => run_check_request(args, &validator),
            Commands::CheckResponse(args) => run_check_response(args, &validator),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_compile_with_spec() {
        let cli = Cli::try_parse_from(["strictapi", "--spec", "api.yaml", "compile"]).unwrap();
        assert_eq!(cli.spec.as_deref(), Some("api.yaml"));
        assert!(matches!(cli.command, Commands::Compile(_)));
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strictapi", "routes", "-vv", "--spec", "api.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.spec.as_deref(), Some("api.json"));
    }

    #[test]
    fn cli_parse_check_request() {
        let cli = Cli::try_parse_from([
            "strictapi",
            "check-request",
            "--method",
            "GET",
            "--path",
            "/pets",
            "--query",
            "extend=true",
            "--query",
            "limit=10",
            "--content-type",
            "application/json",
        ])
        .unwrap();
        let Commands::CheckRequest(args) = cli.command else {
            panic!("expected check-request");
        };
        assert_eq!(args.method, "GET");
        assert_eq!(
            args.query,
            vec![
                ("extend".to_string(), "true".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
        assert_eq!(args.body.content_type.as_deref(), Some("application/json"));
        assert!(args.body.body.is_none());
    }

    #[test]
    fn cli_parse_check_response() {
        let cli = Cli::try_parse_from([
            "strictapi",
            "check-response",
            "--method",
            "post",
            "--path",
            "/pets",
            "--status",
            "201",
            "--body",
            "{}",
        ])
        .unwrap();
        let Commands::CheckResponse(args) = cli.command else {
            panic!("expected check-response");
        };
        assert_eq!(args.status, 201);
        assert_eq!(args.body.body.as_deref(), Some("{}"));
    }

    #[test]
    fn cli_rejects_body_and_body_file_together() {
        let result = Cli::try_parse_from([
            "strictapi",
            "check-request",
            "--method",
            "post",
            "--path",
            "/pets",
            "--body",
            "{}",
            "--body-file",
            "body.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_rejects_malformed_query_pair() {
        let result = Cli::try_parse_from([
            "strictapi",
            "check-request",
            "--method",
            "get",
            "--path",
            "/pets",
            "--query",
            "extend",
        ]);
        assert!(result.is_err());
    }
}
