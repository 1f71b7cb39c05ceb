use std::time::Duration;

/// Upstream aggregator API root. Listing endpoints live under `matches/`,
/// stream resolution under `stream/`.
pub const DEFAULT_API_BASE: &str = "https://streamed.pk/api";

/// Cadence of the background listing/sidebar refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Cadence of the kickoff countdown ticker.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Local asset substituted when a match has no usable artwork.
pub const FALLBACK_IMAGE: &str = "assets/images/logo.png";

/// Runtime settings. There is no config file or env surface; everything
/// defaults to the hardcoded constants above and is only overridden
/// programmatically (tests, mirrors).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

impl Config {
    pub fn with_api_base(base: impl Into<String>) -> Self {
        Self {
            api_base: base.into(),
            ..Self::default()
        }
    }
}
