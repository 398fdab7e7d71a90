use crate::commands::{
    run_assessment, run_calculation, run_followup, AssessArgs, FollowUpArgs, InputArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use iop_target::error::AppError;
use iop_target::targets::CalculationMode;

#[derive(Parser, Debug)]
#[command(
    name = "IOP Target Engine",
    about = "Calculate glaucoma target pressures and assess patients from the command line",
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
    /// Calculate per-eye target pressures from a JSON request file
    Target {
        #[command(subcommand)]
        command: TargetCommand,
    },
    /// Assess a patient against their targets using a measurement CSV export
    Assess(AssessArgs),
    /// Look up the follow-up interval for a risk level and disease severity
    Followup(FollowUpArgs),
    /// Walk a sample patient through target setting, monitoring and follow-up
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TargetCommand {
    /// Total Risk Burden Score calculation
    Trbs(InputArgs),
    /// Grade-based calculation with a target range per eye
    Grade(InputArgs),
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
        Command::Target {
            command: TargetCommand::Trbs(args),
        } => run_calculation(CalculationMode::Trbs, args),
        Command::Target {
            command: TargetCommand::Grade(args),
        } => run_calculation(CalculationMode::GradeBased, args),
        Command::Assess(args) => run_assessment(args),
        Command::Followup(args) => run_followup(args),
        Command::Demo(args) => run_demo(args),
    }
}
