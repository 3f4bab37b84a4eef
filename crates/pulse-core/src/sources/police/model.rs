use crate::utils::de::{lenient_f64, lenient_id};
use serde::Deserialize;

/// ArcGIS feature-layer query response. Query errors arrive with HTTP 200 and an
/// `error` object instead of features.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureQueryResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub error: Option<ArcGisError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArcGisError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: IncidentAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IncidentAttributes {
    #[serde(default, rename = "OBJECTID", deserialize_with = "lenient_id")]
    pub object_id: Option<String>,
    #[serde(default, rename = "INCIDENT_NO", deserialize_with = "lenient_id")]
    pub incident_no: Option<String>,
    #[serde(default)]
    pub type_code: Option<String>,
    #[serde(default)]
    pub type_desc: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub reported: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}
