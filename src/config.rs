// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Effective configuration for the feed (account, endpoints, cache TTLs, burst window)
// role: config/effective
// inputs: environment (GITHUB_USERNAME, GITHUB_API_BASE, GITHUB_GRAPHQL_URL, token discovery) or CLI normalization
// outputs: FeedConfig with defaults matching the upstream rate-limit budget
// invariants: TTL families are independent; merge window is inclusive and measured in whole minutes
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::github::api::get_github_token;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "gh-activity-feed";

/// Literal reference bound for burst merging: 3600 minutes (60 hours).
pub const DEFAULT_MERGE_WINDOW_MINUTES: i64 = 3600;

/// Expiry per cache key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTtls {
  pub repos: Duration,
  pub calendar: Duration,
  pub comparison: Duration,
  pub events: Duration,
  pub commits: Duration,
}

impl Default for CacheTtls {
  fn default() -> Self {
    Self {
      repos: Duration::from_secs(3600),
      calendar: Duration::from_secs(3600),
      comparison: Duration::from_secs(3600),
      events: Duration::from_secs(600),
      commits: Duration::from_secs(1800),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
  pub username: String,
  #[serde(skip_serializing)]
  pub token: Option<String>,
  pub api_base: String,
  pub graphql_url: String,
  pub user_agent: String,
  pub timeout: Duration,
  pub ttl: CacheTtls,
  pub merge_window_minutes: i64,
}

impl FeedConfig {
  pub fn new(username: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      token: None,
      api_base: DEFAULT_API_BASE.to_string(),
      graphql_url: format!("{}/graphql", DEFAULT_API_BASE),
      user_agent: DEFAULT_USER_AGENT.to_string(),
      timeout: Duration::from_secs(30),
      ttl: CacheTtls::default(),
      merge_window_minutes: DEFAULT_MERGE_WINDOW_MINUTES,
    }
  }

  /// Build from the process environment. The username is mandatory.
  pub fn from_env() -> Result<Self, ConfigError> {
    let username = non_empty_var("GITHUB_USERNAME").ok_or(ConfigError::MissingUsername)?;
    let mut cfg = Self::new(username).with_api_base(
      non_empty_var("GITHUB_API_BASE")
        .as_deref()
        .unwrap_or(DEFAULT_API_BASE),
    );

    if let Some(url) = non_empty_var("GITHUB_GRAPHQL_URL") {
      cfg.graphql_url = url;
    }

    if let Some(raw) = non_empty_var("FEED_MERGE_WINDOW_MINUTES") {
      // windows are inclusive and non-negative, matching --merge-window-minutes
      cfg.merge_window_minutes = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|w| *w >= 0)
        .ok_or_else(|| ConfigError::InvalidValue {
          name: "FEED_MERGE_WINDOW_MINUTES",
          value: raw.clone(),
        })?;
    }

    cfg.token = get_github_token();

    Ok(cfg)
  }

  /// Point REST and GraphQL at another host (e.g. GitHub Enterprise).
  pub fn with_api_base(mut self, base: &str) -> Self {
    let base = base.trim_end_matches('/');
    self.api_base = base.to_string();
    self.graphql_url = format!("{}/graphql", base);
    self
  }

  pub fn with_token(mut self, token: Option<String>) -> Self {
    self.token = token.filter(|t| !t.trim().is_empty());
    self
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
