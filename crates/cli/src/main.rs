use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{
    handle_alerts_command, handle_config_command, handle_hash_command, handle_sources_command,
    AlertsOptions, ConfigCommands,
};

#[derive(Parser)]
#[command(name = "pulse-cli")]
#[command(about = "Pulse CLI - run aggregation cycles and manage configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "config/config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one aggregation cycle and print the alerts
    Alerts {
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Only run this source (e.g. weather-service, road-flow)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// List configured sources
    Sources,

    /// Print the summary hash of the current alert set
    Hash,

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Alerts { json, source } => {
            handle_alerts_command(&cli.config, AlertsOptions { json, source }).await
        }
        Commands::Sources => handle_sources_command(&cli.config),
        Commands::Hash => handle_hash_command(&cli.config).await,
        Commands::Config(config_command) => handle_config_command(config_command),
    };

    if let Err(e) = result {
        commands::utils::print_error(&e.to_string());
        std::process::exit(1);
    }
}
