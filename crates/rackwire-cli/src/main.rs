//! rackwire CLI: inspect, check, render and run modular patches.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rackwire")]
#[command(author, version, about = "Real-time modular synthesis engine", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz, overriding the configuration file
    #[arg(long, global = true)]
    pub sample_rate: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered plugins and models
    Models(commands::models::ModelsArgs),

    /// Write a template patch
    New(commands::new::NewArgs),

    /// Validate a patch against the registry
    Check(commands::check::CheckArgs),

    /// Step a patch offline and print output values
    Render(commands::render::RenderArgs),

    /// Run a patch on the engine thread
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Models(args) => commands::models::run(args),
        Commands::New(args) => commands::new::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Render(args) => commands::render::run(args, &cli.global),
        Commands::Run(args) => commands::run::run(args, &cli.global),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}
