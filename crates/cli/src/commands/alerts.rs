use pulse_core::{
    aggregator::{AggregateError, Aggregator, AlertsResult},
    alerts::{compute_alerts_hash, severity_counts},
    config::AppConfig,
    sources::{SourceDeps, SourceRegistry},
    upstream::CancelSignal,
};
use tracing::debug;

use super::utils::{format_alert, load_config, parse_source, print_info, CliError, CliResult};

pub struct AlertsOptions {
    pub json: bool,
    pub source: Option<String>,
}

fn build_registry(config: &AppConfig) -> CliResult<SourceRegistry> {
    let deps = SourceDeps::from_config(config)?;
    Ok(SourceRegistry::from_config(config, &deps))
}

/// Runs one cycle, cancelling it on Ctrl+C.
async fn run_cycle(registry: SourceRegistry) -> CliResult<AlertsResult> {
    let cancel = CancelSignal::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = Aggregator::new(registry).fetch_all(&cancel).await;
    interrupt.abort();

    match outcome {
        Ok(result) => Ok(result.sorted()),
        Err(AggregateError::Cancelled) => Err(CliError::Cancelled),
    }
}

pub async fn handle_alerts_command(file: &str, options: AlertsOptions) -> CliResult<()> {
    let config = load_config(file)?;
    let mut registry = build_registry(&config)?;
    if let Some(name) = &options.source {
        let id = parse_source(name)?;
        if registry.get(id).is_none() {
            return Err(CliError::Config(format!("source {id} is not enabled")));
        }
        registry = registry.subset(&[id]);
    }
    debug!(sources = ?registry.ids(), "running aggregation");

    let result = run_cycle(registry).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let [critical, high, moderate, minor] = severity_counts(&result.alerts);
    println!(
        "{} alerts ({critical} critical, {high} high, {moderate} moderate, {minor} minor)\n",
        result.alerts.len()
    );
    for alert in &result.alerts {
        println!("{}\n", format_alert(alert));
    }

    let healthy = result.sources.values().filter(|s| s.success).count();
    println!("Sources: {healthy}/{} healthy", result.sources.len());
    for (id, status) in &result.sources {
        match (&status.error, status.success) {
            (_, true) => println!("  [OK]    {id}"),
            (Some(error), false) => println!("  [ERROR] {id}: {error}"),
            (None, false) => println!("  [SKIP]  {id}"),
        }
    }

    Ok(())
}

pub fn handle_sources_command(file: &str) -> CliResult<()> {
    let config = load_config(file)?;
    let registry = build_registry(&config)?;

    print_info(&format!("{} sources enabled", registry.len()));
    for source in registry.iter() {
        println!(
            "  {:<16} {:<28} stale after {}s",
            source.id().as_str(),
            source.label(),
            source.stale_after().as_secs()
        );
    }
    Ok(())
}

pub async fn handle_hash_command(file: &str) -> CliResult<()> {
    let config = load_config(file)?;
    let result = run_cycle(build_registry(&config)?).await?;
    println!("{}", compute_alerts_hash(&result.alerts));
    Ok(())
}
