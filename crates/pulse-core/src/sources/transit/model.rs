use crate::utils::de::lenient_id;
use serde::Deserialize;

/// Structured service-alert feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitAlertFeed {
    #[serde(default)]
    pub alerts: Vec<TransitAlert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitAlert {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub active_periods: Vec<ActivePeriod>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivePeriod {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Author feed from the agency's social account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorFeed {
    #[serde(default)]
    pub feed: Vec<FeedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedItem {
    pub post: SocialPost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialPost {
    pub uri: String,
    #[serde(default)]
    pub record: PostRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SocialPost {
    /// Record key: the last path segment of the post URI.
    #[must_use]
    pub fn rkey(&self) -> Option<&str> {
        self.uri.rsplit('/').next().filter(|key| !key.is_empty() && !key.contains(':'))
    }
}
