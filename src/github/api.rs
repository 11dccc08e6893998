// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub REST + GraphQL transport behind the GithubApi trait seam (HTTP and env-fixture backends, token discovery)
// role: github/upstream-client
// inputs: FeedConfig (endpoints, user agent, timeout, token); env GITHUB_TOKEN / GH_TOKEN; optional `gh` CLI; FEED_TEST_* fixtures
// outputs: Result<serde_json::Value, UpstreamError> per endpoint
// side_effects: Network calls to the configured API base; spawns `gh` subprocess during token discovery
// invariants:
// - Never panic; non-2xx and network errors come back as Err, never retried here
// - Non-2xx errors carry the status and the upstream `message` when present
// - GraphQL bodies with `errors` and no `data` are failures
// errors: Returned to fetchers, which degrade them to empty/default values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::UpstreamError;
use crate::ext::serde_json::JsonFetch;

pub type UpstreamResult = Result<Value, UpstreamError>;

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

// --- Trait seam for GitHub API ---
pub trait GithubApi: Send + Sync {
  /// Owned repositories, most recently updated first (one page of up to 100).
  fn list_user_repos(&self, user: &str) -> UpstreamResult;
  fn get_repo(&self, owner: &str, name: &str) -> UpstreamResult;
  fn create_repo(&self, body: &Value) -> UpstreamResult;
  fn update_repo(&self, owner: &str, name: &str, body: &Value) -> UpstreamResult;
  fn delete_repo(&self, owner: &str, name: &str) -> UpstreamResult;
  fn list_user_events(&self, user: &str, per_page: u32) -> UpstreamResult;
  fn list_repo_commits(&self, owner: &str, name: &str, per_page: u32) -> UpstreamResult;
  /// `repo` is the full `owner/name`.
  fn compare_commits(&self, repo: &str, base: &str, head: &str) -> UpstreamResult;
  fn graphql(&self, query: &str, variables: &Value) -> UpstreamResult;
}

pub struct GithubHttpApi {
  agent: ureq::Agent,
  token: Option<String>,
  api_base: String,
  graphql_url: String,
  user_agent: String,
}

impl GithubHttpApi {
  pub fn new(config: &FeedConfig) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .timeout_global(Some(config.timeout))
      .build()
      .into();

    Self {
      agent,
      token: config.token.clone(),
      api_base: config.api_base.clone(),
      graphql_url: config.graphql_url.clone(),
      user_agent: config.user_agent.clone(),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.api_base, path)
  }

  fn headers<B>(&self, rb: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
    let rb = rb
      .header("Accept", "application/vnd.github+json")
      .header("User-Agent", &self.user_agent);

    match &self.token {
      Some(t) => rb.header("Authorization", &format!("Bearer {}", t)),
      None => rb,
    }
  }

  fn get(&self, url: &str, query: &[(&str, String)]) -> UpstreamResult {
    debug!(url, "GET");
    let mut rb = self.headers(self.agent.get(url));

    for (k, v) in query {
      rb = rb.query(*k, v);
    }

    read_response(rb.call())
  }

  fn send_json(&self, method: &str, url: &str, body: &Value) -> UpstreamResult {
    debug!(url, method, "sending JSON");
    let rb = match method {
      "PATCH" => self.agent.patch(url),
      _ => self.agent.post(url),
    };

    read_response(self.headers(rb).send_json(body))
  }

  fn delete(&self, url: &str) -> UpstreamResult {
    debug!(url, "DELETE");
    read_response(self.headers(self.agent.delete(url)).call())
  }
}

/// Map a ureq outcome onto the success/failure contract.
fn read_response(resp: Result<ureq::http::Response<ureq::Body>, ureq::Error>) -> UpstreamResult {
  let result = match resp {
    Ok(mut r) => {
      let status = r.status().as_u16();
      classify_read(status, r.body_mut().read_to_string())
    }
    Err(ureq::Error::StatusCode(code)) => Err(UpstreamError::Status {
      status: code,
      message: format!("HTTP {}", code),
    }),
    Err(e) => Err(UpstreamError::Transport(e.to_string())),
  };

  if let Err(e) = &result {
    warn!(error = %e, "github request failed");
  }

  result
}

/// A body that could not be read is a transport failure, whatever the status said.
pub(crate) fn classify_read(status: u16, text: Result<String, ureq::Error>) -> UpstreamResult {
  match text {
    Ok(text) => classify_body(status, &text),
    Err(e) => Err(UpstreamError::Transport(format!("reading response body: {}", e))),
  }
}

/// Interpret a status code and raw body. Empty 2xx bodies (204 on delete) are `Null`.
pub(crate) fn classify_body(status: u16, text: &str) -> UpstreamResult {
  if (200..300).contains(&status) {
    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    return serde_json::from_str::<Value>(text).map_err(|e| UpstreamError::Decode(e.to_string()));
  }

  let message = serde_json::from_str::<Value>(text)
    .ok()
    .and_then(|v| v.fetch("message").non_empty_str())
    .unwrap_or_else(|| format!("HTTP {}", status));

  Err(UpstreamError::Status { status, message })
}

/// Reject GraphQL bodies that only carry `errors`.
pub(crate) fn check_graphql(body: Value) -> UpstreamResult {
  let has_data = body.fetch("data").value().is_some();

  if !has_data {
    let message = body
      .fetch("errors.0.message")
      .non_empty_str()
      .unwrap_or_else(|| "response has no data".to_string());
    return Err(UpstreamError::Graphql(message));
  }

  Ok(body)
}

impl GithubApi for GithubHttpApi {
  fn list_user_repos(&self, user: &str) -> UpstreamResult {
    let url = self.url(&format!("/users/{}/repos", user));
    self.get(
      &url,
      &[
        ("sort", "updated".into()),
        ("direction", "desc".into()),
        ("per_page", "100".into()),
        ("type", "owner".into()),
      ],
    )
  }

  fn get_repo(&self, owner: &str, name: &str) -> UpstreamResult {
    let url = self.url(&format!("/repos/{}/{}", owner, name));
    self.get(&url, &[])
  }

  fn create_repo(&self, body: &Value) -> UpstreamResult {
    let url = self.url("/user/repos");
    self.send_json("POST", &url, body)
  }

  fn update_repo(&self, owner: &str, name: &str, body: &Value) -> UpstreamResult {
    let url = self.url(&format!("/repos/{}/{}", owner, name));
    self.send_json("PATCH", &url, body)
  }

  fn delete_repo(&self, owner: &str, name: &str) -> UpstreamResult {
    let url = self.url(&format!("/repos/{}/{}", owner, name));
    self.delete(&url)
  }

  fn list_user_events(&self, user: &str, per_page: u32) -> UpstreamResult {
    let url = self.url(&format!("/users/{}/events", user));
    self.get(&url, &[("per_page", per_page.to_string())])
  }

  fn list_repo_commits(&self, owner: &str, name: &str, per_page: u32) -> UpstreamResult {
    let url = self.url(&format!("/repos/{}/{}/commits", owner, name));
    self.get(&url, &[("per_page", per_page.to_string())])
  }

  fn compare_commits(&self, repo: &str, base: &str, head: &str) -> UpstreamResult {
    let url = self.url(&format!("/repos/{}/compare/{}...{}", repo, base, head));
    self.get(&url, &[])
  }

  fn graphql(&self, query: &str, variables: &Value) -> UpstreamResult {
    let body = json!({ "query": query, "variables": variables });
    let resp = self.send_json("POST", &self.graphql_url, &body)?;
    check_graphql(resp)
  }
}

/// Fixture-backed API driven by `FEED_TEST_*` variables (CLI integration tests).
///
/// - `FEED_TEST_REPOS_JSON`, `FEED_TEST_EVENTS_JSON`, `FEED_TEST_COMMITS_JSON`: listing bodies
/// - `FEED_TEST_COMPARE_JSON`: object keyed by `"{repo}:{base}...{head}"`
/// - `FEED_TEST_GRAPHQL_JSON`: full GraphQL response body
///
/// Missing fixtures behave like an unreachable upstream. Mutations always fail.
pub struct GithubEnvApi;

impl GithubEnvApi {
  fn fixture(name: &str) -> UpstreamResult {
    let raw = std::env::var(name).map_err(|_| UpstreamError::Transport(format!("no fixture in {}", name)))?;
    serde_json::from_str::<Value>(&raw).map_err(|e| UpstreamError::Decode(e.to_string()))
  }

  fn read_only() -> UpstreamResult {
    Err(UpstreamError::Status {
      status: 403,
      message: "fixture API is read-only".into(),
    })
  }
}

impl GithubApi for GithubEnvApi {
  fn list_user_repos(&self, _user: &str) -> UpstreamResult {
    Self::fixture("FEED_TEST_REPOS_JSON")
  }

  fn get_repo(&self, _owner: &str, name: &str) -> UpstreamResult {
    let repos = Self::fixture("FEED_TEST_REPOS_JSON")?;
    repos
      .as_array()
      .and_then(|arr| {
        arr
          .iter()
          .find(|r| r.fetch("name").to::<String>().as_deref() == Some(name))
          .cloned()
      })
      .ok_or_else(|| UpstreamError::Status {
        status: 404,
        message: "Not Found".into(),
      })
  }

  fn create_repo(&self, _body: &Value) -> UpstreamResult {
    Self::read_only()
  }

  fn update_repo(&self, _owner: &str, _name: &str, _body: &Value) -> UpstreamResult {
    Self::read_only()
  }

  fn delete_repo(&self, _owner: &str, _name: &str) -> UpstreamResult {
    Self::read_only()
  }

  fn list_user_events(&self, _user: &str, per_page: u32) -> UpstreamResult {
    let events = Self::fixture("FEED_TEST_EVENTS_JSON")?;
    Ok(match events {
      Value::Array(items) => Value::Array(items.into_iter().take(per_page as usize).collect()),
      other => other,
    })
  }

  fn list_repo_commits(&self, _owner: &str, _name: &str, per_page: u32) -> UpstreamResult {
    let commits = Self::fixture("FEED_TEST_COMMITS_JSON")?;
    Ok(match commits {
      Value::Array(items) => Value::Array(items.into_iter().take(per_page as usize).collect()),
      other => other,
    })
  }

  fn compare_commits(&self, repo: &str, base: &str, head: &str) -> UpstreamResult {
    let all = Self::fixture("FEED_TEST_COMPARE_JSON")?;
    let key = format!("{}:{}...{}", repo, base, head);

    all.get(&key).cloned().ok_or_else(|| UpstreamError::Status {
      status: 404,
      message: format!("no comparison fixture for {}", key),
    })
  }

  fn graphql(&self, _query: &str, _variables: &Value) -> UpstreamResult {
    check_graphql(Self::fixture("FEED_TEST_GRAPHQL_JSON")?)
  }
}

/// True when any `FEED_TEST_*` fixture variable is present.
pub fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("FEED_TEST_"))
}

/// Pick the backend: fixtures when requested, otherwise live HTTP.
pub fn build_api(config: &FeedConfig) -> Box<dyn GithubApi> {
  if env_wants_mock() {
    debug!("using FEED_TEST_* fixture API");
    Box::new(GithubEnvApi)
  } else {
    Box::new(GithubHttpApi::new(config))
  }
}
