/// Builds a map link for a point, or `None` unless both coordinates are finite.
#[must_use]
pub fn map_url(latitude: Option<f64>, longitude: Option<f64>) -> Option<String> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
            Some(format!("https://www.google.com/maps/search/?api=1&query={lat},{lon}"))
        }
        _ => None,
    }
}
