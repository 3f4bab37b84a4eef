use pulse_core::{
    alerts::{Alert, SourceId, UnknownSource},
    config::AppConfig,
    upstream::UpstreamError,
};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Config(String),
    Io(String),
    Network(String),
    Cancelled,
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Network(msg) => write!(f, "Network error: {msg}"),
            Self::Cancelled => write!(f, "Interrupted"),
            Self::General(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<UpstreamError> for CliError {
    fn from(error: UpstreamError) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<UnknownSource> for CliError {
    fn from(error: UnknownSource) -> Self {
        Self::General(error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::General(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Loads and validates the configuration at `file`.
pub fn load_config(file: &str) -> CliResult<AppConfig> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

pub fn parse_source(name: &str) -> CliResult<SourceId> {
    Ok(name.parse::<SourceId>()?)
}

/// One alert as a terminal block: severity tag and title, then the summary.
pub fn format_alert(alert: &Alert) -> String {
    let mut out = format!(
        "[{}] {} ({})\n    {}",
        alert.severity.as_str().to_uppercase(),
        alert.title,
        alert.source,
        alert.summary
    );
    if let Some(area) = &alert.affected_area {
        out.push_str(&format!("\n    Area: {area}"));
    }
    if let Some(url) = &alert.url {
        out.push_str(&format!("\n    {url}"));
    }
    out
}

pub fn print_success(message: &str) {
    println!("[SUCCESS] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn print_info(message: &str) {
    println!("[INFO] {message}");
}
