//! Earshot CLI - hear a mix the way it will be heard.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "earshot")]
#[command(author, version, about = "Listening-environment simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an audio file through a listening environment
    Render(commands::render::RenderArgs),

    /// List the environment catalog
    Profiles(commands::profiles::ProfilesArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),

    /// Render the ambient noise bed on its own
    Noise(commands::noise::NoiseArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Profiles(args) => commands::profiles::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Noise(args) => commands::noise::run(args),
    }
}
