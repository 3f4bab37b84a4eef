use serde::Deserialize;

/// GeoJSON collection returned by `/alerts/active`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherAlertCollection {
    #[serde(default)]
    pub features: Vec<WeatherFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherFeature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: WeatherAlertProperties,
}

/// CAP-style alert properties. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlertProperties {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub certainty: Option<String>,
    #[serde(default)]
    pub area_desc: Option<String>,
    #[serde(default)]
    pub effective: Option<String>,
    #[serde(default)]
    pub onset: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub ends: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
}
