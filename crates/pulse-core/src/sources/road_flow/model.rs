use crate::utils::de::lenient_f64;
use serde::Deserialize;

/// Flow response with `locationReferencing=none`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    #[serde(default)]
    pub source_updated: Option<String>,
    #[serde(default)]
    pub results: Vec<FlowResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    #[serde(default)]
    pub location: FlowLocation,
    #[serde(default)]
    pub current_flow: CurrentFlow,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowLocation {
    #[serde(default)]
    pub description: Option<String>,
    /// Segment length in meters.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length: Option<f64>,
}

/// Speeds are meters per second; jam factor runs from 0 (free) to 10 (standstill).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentFlow {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub free_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub jam_factor: Option<f64>,
    #[serde(default)]
    pub traversability: Option<String>,
}
