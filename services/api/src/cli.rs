use crate::commands::{run_overrides_validate, run_score, OverridesValidateArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use persona_scoring::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Persona Scoring",
    about = "Score personality assessments and administer profile recalculation",
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
    /// Score a response file and print the resulting profile as JSON
    Score(ScoreArgs),
    /// Inspect scoring overrides documents
    Overrides {
        #[command(subcommand)]
        command: OverridesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OverridesCommand {
    /// Validate an overrides document and optionally print a normalized copy
    Validate(OverridesValidateArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Overrides {
            command: OverridesCommand::Validate(args),
        } => run_overrides_validate(args),
    }
}
