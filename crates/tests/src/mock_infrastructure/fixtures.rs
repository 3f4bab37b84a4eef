//! Upstream payload builders.
//!
//! Shapes follow what each feed's proxy returns; only the fields the converters read
//! are filled in.

use super::feed_mock::{
    AVIATION_PATH, POLICE_PATH, POWER_PATH, ROAD_FLOW_PATH, ROAD_INCIDENTS_PATH, SOCIAL_PATH,
    TRANSIT_PATH, WEATHER_PATH,
};
use chrono::{DateTime, Duration, Utc};
use pulse_core::config::{AppConfig, SocialFeedConfig};
use serde_json::{json, Value};

/// Latitude/longitude inside the default bounding box.
pub const IN_AREA: (f64, f64) = (35.78, -78.64);

/// Latitude/longitude outside the default bounding box.
pub const OUT_OF_AREA: (f64, f64) = (34.2, -77.9);

/// A configuration with every source pointed at `base` under its own path prefix.
#[must_use]
pub fn test_config(base: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.cache.enabled = false;
    config.http.request_timeout_ms = 2_000;

    let sources = &mut config.sources;
    sources.weather.base_url = format!("{base}{WEATHER_PATH}");
    sources.aviation.base_url = format!("{base}{AVIATION_PATH}");
    sources.power.base_url = format!("{base}{POWER_PATH}");
    sources.road_incidents.base_url = format!("{base}{ROAD_INCIDENTS_PATH}");
    sources.transit.base_url = format!("{base}{TRANSIT_PATH}");
    sources.transit.social = Some(SocialFeedConfig {
        base_url: format!("{base}{SOCIAL_PATH}"),
        actor: "goraleigh.bsky.social".to_string(),
        window_hours: 12,
        limit: 30,
    });
    sources.police.base_url = format!("{base}{POLICE_PATH}");
    sources.road_flow.base_url = format!("{base}{ROAD_FLOW_PATH}");
    config
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// `(id, event, upstream severity)` triples as an active-alerts collection.
#[must_use]
pub fn weather_alerts(alerts: &[(&str, &str, &str)]) -> Value {
    let now = Utc::now();
    let features: Vec<Value> = alerts
        .iter()
        .map(|(id, event, severity)| {
            json!({
                "id": format!("https://api.weather.gov/alerts/{id}"),
                "properties": {
                    "id": id,
                    "event": event,
                    "headline": format!("{event} issued by NWS Raleigh"),
                    "severity": severity,
                    "urgency": "Expected",
                    "certainty": "Likely",
                    "areaDesc": "Wake",
                    "effective": rfc3339(now - Duration::hours(1)),
                    "expires": rfc3339(now + Duration::hours(3)),
                }
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// `(type, reason, average delay)` triples for one airport.
#[must_use]
pub fn airport_status(code: &str, delays: &[(&str, &str, &str)]) -> Value {
    let status: Vec<Value> = delays
        .iter()
        .map(|(kind, reason, avg)| json!({ "Type": kind, "Reason": reason, "AvgDelay": avg }))
        .collect();
    json!({
        "IATA": code,
        "Name": format!("{code} International"),
        "Delay": !delays.is_empty(),
        "Status": status,
    })
}

/// `(event number, customers)` pairs in the configured area.
#[must_use]
pub fn outage_list(outages: &[(&str, u32)]) -> Value {
    let data: Vec<Value> = outages
        .iter()
        .map(|(event, customers)| outage_summary(event, *customers, IN_AREA))
        .collect();
    json!({ "data": data, "errorMessages": [] })
}

#[must_use]
pub fn outage_summary(event: &str, customers: u32, (lat, lon): (f64, f64)) -> Value {
    json!({
        "sourceEventNumber": event,
        "deviceLatitudeLocation": lat,
        "deviceLongitudeLocation": lon,
        "customersAffectedNumber": customers,
        "outageCause": "Under Investigation",
    })
}

#[must_use]
pub fn outage_detail(event: &str, customers: u32, cause: &str) -> Value {
    let now = Utc::now();
    json!({
        "data": {
            "sourceEventNumber": event,
            "customersAffectedNumber": customers,
            "estimatedRestorationTime": rfc3339(now + Duration::hours(2)),
            "crewStatTxt": "Crew on site",
            "causeDescription": cause,
            "createDateTime": rfc3339(now - Duration::minutes(40)),
            "lastUpdated": rfc3339(now - Duration::minutes(5)),
        },
        "errorMessages": []
    })
}

/// `(id, road, reason)` triples. Each is a two-lane-of-three closure that started an
/// hour ago.
#[must_use]
pub fn road_incidents(incidents: &[(&str, &str, &str)]) -> Value {
    let now = Utc::now();
    let records: Vec<Value> = incidents
        .iter()
        .map(|(id, road, reason)| {
            json!({
                "id": id,
                "latitude": IN_AREA.0,
                "longitude": IN_AREA.1,
                "road": road,
                "direction": "E",
                "location": format!("{road} near Exit 289"),
                "reason": reason,
                "condition": "Lane Closed",
                "incidentType": reason,
                "lanesClosed": 2,
                "lanesTotal": 3,
                "start": rfc3339(now - Duration::hours(1)),
                "end": rfc3339(now + Duration::hours(2)),
                "lastUpdate": rfc3339(now - Duration::minutes(10)),
            })
        })
        .collect();
    Value::Array(records)
}

/// `(id, header, effect)` triples, each active right now on route 7.
#[must_use]
pub fn transit_feed(alerts: &[(&str, &str, &str)]) -> Value {
    let now = Utc::now();
    let records: Vec<Value> = alerts
        .iter()
        .map(|(id, header, effect)| {
            json!({
                "id": id,
                "header": header,
                "effect": effect,
                "cause": "CONSTRUCTION",
                "routes": ["7"],
                "activePeriods": [{
                    "start": rfc3339(now - Duration::hours(1)),
                    "end": rfc3339(now + Duration::hours(5)),
                }],
            })
        })
        .collect();
    json!({ "alerts": records })
}

/// `(rkey, text, created at)` triples as an author feed.
#[must_use]
pub fn author_feed(posts: &[(&str, &str, DateTime<Utc>)]) -> Value {
    let feed: Vec<Value> = posts
        .iter()
        .map(|(rkey, text, created)| {
            json!({
                "post": {
                    "uri": format!("at://did:plc:goraleigh/app.bsky.feed.post/{rkey}"),
                    "record": { "text": text, "createdAt": rfc3339(*created) },
                }
            })
        })
        .collect();
    json!({ "feed": feed })
}

/// `(incident number, type code, description)` triples as an ArcGIS query result.
#[must_use]
pub fn police_features(incidents: &[(&str, &str, &str)]) -> Value {
    let reported = Utc::now().timestamp_millis() - 20 * 60 * 1000;
    let features: Vec<Value> = incidents
        .iter()
        .enumerate()
        .map(|(index, (number, code, description))| {
            json!({
                "attributes": {
                    "OBJECTID": index + 1,
                    "INCIDENT_NO": number,
                    "TYPE_CODE": code,
                    "TYPE_DESC": description,
                    "LOCATION": "GLENWOOD AVE / OBERLIN RD",
                    "REPORTED": reported,
                    "LATITUDE": IN_AREA.0,
                    "LONGITUDE": IN_AREA.1,
                }
            })
        })
        .collect();
    json!({ "features": features })
}

/// `segments` equal-length segments of one route at the given flow.
#[must_use]
pub fn flow_payload(route: &str, segments: usize, speed: f64, free_flow: f64, jam: f64) -> Value {
    let results: Vec<Value> = (0..segments)
        .map(|_| {
            json!({
                "location": { "description": route, "length": 400.0 },
                "currentFlow": {
                    "speed": speed,
                    "freeFlow": free_flow,
                    "jamFactor": jam,
                    "traversability": "open",
                },
            })
        })
        .collect();
    json!({ "sourceUpdated": rfc3339(Utc::now()), "results": results })
}
