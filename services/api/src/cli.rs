use crate::process::{run_process, run_rules_show, run_rules_validate, ProcessArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_pipeline::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lead-pipeline-api",
    about = "Normalize, enrich, deduplicate and score leads over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a CSV export through the pipeline and print the results
    Process(ProcessArgs),
    /// Inspect or check scoring rulesets
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Print the active ruleset as JSON
    Show(RulesShowArgs),
    /// Validate a ruleset file without installing it
    Validate(RulesValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct RulesShowArgs {
    /// Rules file to read instead of APP_RULES_PATH
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RulesValidateArgs {
    /// Ruleset JSON file to check
    pub(crate) path: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Process(args) => run_process(args),
        Command::Rules {
            command: RulesCommand::Show(args),
        } => run_rules_show(args),
        Command::Rules {
            command: RulesCommand::Validate(args),
        } => run_rules_validate(args),
    }
}
