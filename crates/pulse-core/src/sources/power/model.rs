use crate::utils::de::{lenient_f64, lenient_id, lenient_u32};
use serde::Deserialize;

/// Envelope every outage-map response is wrapped in.
#[derive(Debug, Clone, Deserialize)]
pub struct OutageEnvelope<T> {
    pub data: Option<T>,
    #[serde(default, rename = "errorMessages")]
    pub error_messages: Vec<serde_json::Value>,
}

/// List-level record for one outage event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageSummary {
    #[serde(default, deserialize_with = "lenient_id")]
    pub source_event_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub device_latitude_location: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub device_longitude_location: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub customers_affected_number: Option<u32>,
    #[serde(default)]
    pub outage_cause: Option<String>,
}

/// Per-outage detail with restoration estimate and crew status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageDetail {
    #[serde(default, deserialize_with = "lenient_id")]
    pub source_event_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub customers_affected_number: Option<u32>,
    #[serde(default)]
    pub estimated_restoration_time: Option<String>,
    #[serde(default)]
    pub crew_stat_txt: Option<String>,
    #[serde(default)]
    pub cause_description: Option<String>,
    #[serde(default)]
    pub create_date_time: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}
