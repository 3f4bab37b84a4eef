use crate::utils::de::lenient_bool;
use serde::Deserialize;

/// Airport status from the FAA airport status web service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AirportStatus {
    #[serde(default, rename = "IATA")]
    pub iata: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub delay: bool,
    #[serde(default)]
    pub status: Vec<DelayStatus>,
}

/// One active delay program (ground delay, ground stop, departure delay, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DelayStatus {
    #[serde(default, rename = "Type")]
    pub delay_type: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub avg_delay: Option<String>,
    #[serde(default)]
    pub min_delay: Option<String>,
    #[serde(default)]
    pub max_delay: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}
