//! `credence` command-line interface.
//!
//! Exit codes: 0 when an evaluation is decided, 2 when the integrity gate
//! blocked the document, 1 on any error.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use credence_core::{EvaluationRequest, Policy, SourceSnapshots};

mod cli;
mod render;

use cli::{Cli, Commands, PolicyCommands, PolicyFormat, ScanArgs};

const EXIT_BLOCKED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Scan(args) => scan(args, cli.json),
        Commands::Policy { command } => match command {
            PolicyCommands::Validate { file } => validate_policy(&file, cli.json),
            PolicyCommands::ShowDefault { format } => show_default(format),
        },
    }
}

fn scan(args: ScanArgs, json: bool) -> Result<ExitCode> {
    let policy = match &args.policy {
        Some(path) => load_policy(path)?,
        None => Policy::default(),
    };

    let document = fs::read(&args.file)
        .with_context(|| format!("failed to read document {}", args.file.display()))?;
    tracing::debug!(path = %args.file.display(), bytes = document.len(), "Document loaded");

    let mut request = EvaluationRequest::new(document);
    if let Some(id) = args.evaluation_id {
        request = request.with_evaluation_id(id);
    }
    if let Some(id) = args.contact_id {
        request = request.with_contact_id(id);
    }
    if let Some(path) = &args.sources {
        let sources: SourceSnapshots = read_json(path, "sources")?;
        request = request.with_sources(sources);
    }
    if let Some(path) = &args.identity {
        request = request.with_identity(read_json(path, "identity")?);
    }

    let outcome = credence_core::evaluate(&policy, request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render::outcome(&outcome));
    }

    if outcome.is_blocked() {
        Ok(ExitCode::from(EXIT_BLOCKED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn validate_policy(path: &Path, json: bool) -> Result<ExitCode> {
    let policy = load_policy(path)?;
    if json {
        let report = serde_json::json!({
            "valid": true,
            "name": policy.name,
            "policy_version": policy.policy_version,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "policy valid: {} (version {})",
            policy.name, policy.policy_version
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn show_default(format: PolicyFormat) -> Result<ExitCode> {
    let policy = Policy::default();
    match format {
        PolicyFormat::Yaml => print!("{}", serde_yaml::to_string(&policy)?),
        PolicyFormat::Json => println!("{}", serde_json::to_string_pretty(&policy)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn load_policy(path: &Path) -> Result<Policy> {
    Policy::from_file(path).with_context(|| format!("failed to load policy {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {what} file {}", path.display()))
}
