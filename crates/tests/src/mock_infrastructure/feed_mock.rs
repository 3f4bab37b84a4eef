//! One mockito server hosting every feed.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

pub const WEATHER_PATH: &str = "/nws";
pub const AVIATION_PATH: &str = "/faa";
pub const POWER_PATH: &str = "/duke";
pub const ROAD_INCIDENTS_PATH: &str = "/ncdot";
pub const TRANSIT_PATH: &str = "/transit";
pub const SOCIAL_PATH: &str = "/bsky";
pub const POLICE_PATH: &str = "/police";
pub const ROAD_FLOW_PATH: &str = "/here";

/// Builder for feed responses on a shared mock server.
pub struct FeedMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl FeedMockBuilder {
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Serves `body` on `GET path`, whatever the query string.
    pub async fn mock_json(&mut self, path: &str, body: &Value) -> &mut Self {
        self.mock_json_with_query(path, Matcher::Any, body).await
    }

    /// Serves `body` on `GET path` when the query matches.
    pub async fn mock_json_with_query(
        &mut self,
        path: &str,
        query: Matcher,
        body: &Value,
    ) -> &mut Self {
        let mock = self
            .server
            .mock("GET", path)
            .match_query(query)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Serves `body` on `GET path` and expects exactly `hits` requests.
    ///
    /// Returns the mock so the caller can assert on it.
    pub async fn mock_json_expect(&mut self, path: &str, body: &Value, hits: usize) -> Mock {
        self.server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Answers like the proxy does on failure: non-2xx with `{"error": message}`.
    pub async fn mock_proxy_error(
        &mut self,
        path: &str,
        status: usize,
        message: &str,
    ) -> &mut Self {
        self.mock_proxy_error_with_query(path, Matcher::Any, status, message).await
    }

    pub async fn mock_proxy_error_with_query(
        &mut self,
        path: &str,
        query: Matcher,
        status: usize,
        message: &str,
    ) -> &mut Self {
        let mock = self
            .server
            .mock("GET", path)
            .match_query(query)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": message }).to_string())
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Proxy error on `GET path` that expects exactly `hits` requests.
    pub async fn mock_proxy_error_expect(
        &mut self,
        path: &str,
        status: usize,
        message: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": message }).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Serves a raw body, for malformed-payload cases.
    pub async fn mock_raw(&mut self, path: &str, status: usize, body: &str) -> &mut Self {
        let mock = self
            .server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }
}
