use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "taskbridge-cli", version, about = "TaskBridge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and manage provider integrations
    Integration {
        #[command(subcommand)]
        action: commands::integration::IntegrationAction,
    },
    /// Run provider syncs
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Inspect the outbound-call audit log
    Logs {
        #[command(subcommand)]
        action: commands::logs::LogsAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Integration { action } => commands::integration::run(action),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Logs { action } => commands::logs::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
