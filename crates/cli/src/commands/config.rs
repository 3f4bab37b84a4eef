use clap::Subcommand;
use pulse_core::{alerts::SourceId, config::AppConfig};
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

const SAMPLE_CONFIG: &str = include_str!("../../../../config/config.toml");

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show the effective configuration, environment overrides included
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Print the full configuration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file, json } => show_config(&file, json),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!("  Server: {}:{}", config.server.bind_address, config.server.bind_port);
    println!(
        "  Sources: {}/{} enabled",
        SourceId::FEEDS.iter().filter(|id| config.sources.is_enabled(**id)).count(),
        SourceId::FEEDS.len()
    );
    println!("  Cache: {}", enabled(config.cache.enabled));
    println!("  Summary: {}", enabled(config.summary.endpoint.is_some()));

    Ok(())
}

fn show_config(file: &str, json: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Configuration from {file}:");

    println!("\n[Server]");
    println!("  Bind Address: {}", config.server.bind_address);
    println!("  Bind Port: {}", config.server.bind_port);
    println!("  Request Timeout: {}s", config.server.request_timeout_seconds);

    println!("\n[HTTP]");
    println!("  Concurrent Limit: {}", config.http.concurrent_limit);
    println!("  Request Timeout: {}ms", config.http.request_timeout_ms);

    println!("\n[Location]");
    println!("  Point: {}, {}", config.location.latitude, config.location.longitude);
    println!("  Bounding Box: {}", config.location.bbox.to_query());
    println!("  UTC Offset: {} minutes", config.location.utc_offset_minutes);

    println!("\n[Sources]");
    for id in SourceId::FEEDS {
        println!("  {:<16} {}", id.as_str(), enabled(config.sources.is_enabled(id)));
    }
    let flow = &config.sources.road_flow;
    println!(
        "  road-flow thresholds: jam > {}, congestion >= {}%, segments >= {}",
        flow.min_jam_factor, flow.min_congestion_percent, flow.min_segments
    );
    println!("  road-flow credits: {}/day", flow.daily_credit_limit);

    println!("\n[Cache]");
    println!("  Enabled: {}", config.cache.enabled);
    println!("  Max Entries: {}", config.cache.max_entries);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Remember to:");
    print_info("  1. Set [location] and its bounding box to your area");
    print_info("  2. Point sources.transit.base_url at your transit proxy");
    print_info("  3. Configure [summary] if a summarization service is available");

    Ok(())
}
