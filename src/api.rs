use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::{Config, DEFAULT_API_BASE};
use crate::errors::{ApiError, Result};
use crate::match_id::MatchId;
use crate::reconcile::{self, Listings};

const USER_AGENT: &str = "matchcast/0.1 (terminal match browser)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    pub name: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamPair {
    pub home: Option<TeamRef>,
    pub away: Option<TeamRef>,
}

/// One upstream stream provider entry on a match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSource {
    pub source: String,
    pub id: String,
}

/// A match as the aggregator reports it. The shape is not ours: every field
/// can be absent or the wrong type depending on endpoint and day, so
/// everything is optional and ids go through [`MatchId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchRecord {
    pub id: MatchId,
    pub title: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    /// Kickoff as unix milliseconds.
    pub date: Option<i64>,
    pub poster: Option<String>,
    pub popular: bool,
    pub is_live: bool,
    pub status: Option<String>,
    pub teams: Option<TeamPair>,
    pub sources: Vec<StreamSource>,
}

impl MatchRecord {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled Match")
    }

    /// The identifier used for cross-endpoint reconciliation: the record's
    /// own id, else the first stream source's id, else missing.
    pub fn effective_id(&self) -> MatchId {
        if !self.id.is_missing() {
            return self.id.clone();
        }
        self.sources
            .first()
            .map(|s| MatchId::from_text(&s.id))
            .unwrap_or_default()
    }

    /// Kickoff timestamp; absent dates collapse to the epoch so they sort
    /// first and never count as upcoming.
    pub fn kickoff_ms(&self) -> i64 {
        self.date.unwrap_or(0)
    }

    pub fn is_football(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("football"))
    }

    /// Live according to the record itself, before consulting the
    /// live-identifier set.
    pub fn marked_live(&self) -> bool {
        self.is_live
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("live"))
    }

    pub fn home_badge(&self) -> Option<&str> {
        self.teams
            .as_ref()
            .and_then(|t| t.home.as_ref())
            .and_then(|t| t.badge.as_deref())
    }

    pub fn away_badge(&self) -> Option<&str> {
        self.teams
            .as_ref()
            .and_then(|t| t.away.as_ref())
            .and_then(|t| t.badge.as_deref())
    }
}

/// One playable stream for a (source, id) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamLink {
    pub id: Option<String>,
    pub stream_no: Option<i32>,
    pub language: Option<String>,
    pub hd: bool,
    pub embed_url: Option<String>,
    pub source: Option<String>,
}

/// The playable URL for a stream response: first entry's embed URL.
pub fn pick_embed_url(links: &[StreamLink]) -> Option<&str> {
    links.first().and_then(|l| l.embed_url.as_deref())
}

/// Client for the aggregator's matches and stream endpoints.
#[derive(Debug, Clone)]
pub struct MatchesClient {
    http: reqwest::Client,
    base: String,
}

impl Default for MatchesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchesClient {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_API_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base(config.api_base.clone())
    }

    async fn get_value(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        resp.json::<Value>().await.map_err(|e| ApiError::Parse {
            url,
            source: e,
        })
    }

    /// Raw live listing envelope.
    pub async fn fetch_live(&self) -> Result<Value> {
        self.get_value("matches/live").await
    }

    /// Raw all-football listing envelope.
    pub async fn fetch_football(&self) -> Result<Value> {
        self.get_value("matches/football").await
    }

    /// Raw popular-football listing envelope.
    pub async fn fetch_popular(&self) -> Result<Value> {
        self.get_value("matches/football/popular").await
    }

    /// Fetch all three listings concurrently and reconcile them.
    ///
    /// The upcoming and popular derivations need the live-identifier set, so
    /// a failed live fetch fails the whole cycle; a failed football or
    /// popular fetch only empties that one list (callers that want stale
    /// content to survive drive the endpoints individually, as the render
    /// session does).
    pub async fn fetch_listings(&self, now_ms: i64) -> Result<Listings> {
        let (live, all, popular) = tokio::join!(
            self.fetch_live(),
            self.fetch_football(),
            self.fetch_popular()
        );
        let live_raw = live?;
        let all_raw = all.unwrap_or_else(|e| {
            log::warn!("football listing fetch failed: {e}");
            Value::Null
        });
        let popular_raw = popular.unwrap_or_else(|e| {
            log::warn!("popular listing fetch failed: {e}");
            Value::Null
        });
        Ok(reconcile::reconcile(&live_raw, &all_raw, &popular_raw, now_ms))
    }

    /// Streams available from one provider for one match.
    pub async fn fetch_stream_links(&self, source: &str, id: &str) -> Result<Vec<StreamLink>> {
        let raw = self.get_value(&format!("stream/{}/{}", source, id)).await?;
        let items = match raw {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    /// Look a match up in the current live listing, for the watch page.
    pub async fn find_live_match(&self, id: &MatchId) -> Result<MatchRecord> {
        let raw = self.fetch_live().await?;
        reconcile::normalize_listing(&raw)
            .into_iter()
            .find(|r| r.effective_id() == *id)
            .ok_or_else(|| ApiError::MatchNotFound(id.to_string()))
    }
}
