use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "credence", version, about = "Evidence trust evaluation for résumés")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug); RUST_LOG overrides"
    )]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a document. Exits 0 when decided, 2 when blocked.
    Scan(ScanArgs),
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Document to evaluate (HTML, PDF, DOCX or plain text)
    pub file: PathBuf,
    #[arg(long, help = "Policy file (.yaml, .yml or .json); built-in policy when absent")]
    pub policy: Option<PathBuf>,
    #[arg(long, help = "JSON file with pre-fetched source snapshots")]
    pub sources: Option<PathBuf>,
    #[arg(long, help = "JSON file with the candidate identity record")]
    pub identity: Option<PathBuf>,
    #[arg(long)]
    pub evaluation_id: Option<String>,
    #[arg(long, help = "Contact id used to route review requests")]
    pub contact_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Check a policy file against the schema and semantic rules
    Validate { file: PathBuf },
    /// Print the built-in policy
    ShowDefault {
        #[arg(long, value_enum, default_value_t = PolicyFormat::Yaml)]
        format: PolicyFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PolicyFormat {
    Yaml,
    Json,
}
