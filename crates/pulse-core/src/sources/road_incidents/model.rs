use crate::utils::de::{lenient_bool, lenient_f64, lenient_id, lenient_u32};
use serde::Deserialize;

/// One incident record from the state DOT traveler information feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadIncident {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub lanes_closed: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub lanes_total: Option<u32>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub from_mile_marker: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub to_mile_marker: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub work_zone: bool,
    #[serde(default)]
    pub detour: Option<String>,
}
