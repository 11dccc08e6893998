//! Scripted `GithubApi` for unit tests: canned responses per endpoint plus call accounting.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::UpstreamError;
use crate::github::api::{GithubApi, UpstreamResult};

#[derive(Default)]
pub struct ScriptedApi {
  responses: HashMap<String, UpstreamResult>,
  calls: Mutex<HashMap<String, usize>>,
  bodies: Mutex<HashMap<String, Value>>,
}

fn not_found() -> UpstreamResult {
  Err(UpstreamError::Status {
    status: 404,
    message: "Not Found".into(),
  })
}

impl ScriptedApi {
  pub fn new() -> Self {
    Self::default()
  }

  fn with(mut self, route: &str, result: UpstreamResult) -> Self {
    self.responses.insert(route.to_string(), result);
    self
  }

  pub fn with_repos(self, r: UpstreamResult) -> Self {
    self.with("repos", r)
  }

  pub fn with_repo(self, r: UpstreamResult) -> Self {
    self.with("repo", r)
  }

  pub fn with_create(self, r: UpstreamResult) -> Self {
    self.with("create", r)
  }

  pub fn with_update(self, r: UpstreamResult) -> Self {
    self.with("update", r)
  }

  pub fn with_delete(self, r: UpstreamResult) -> Self {
    self.with("delete", r)
  }

  pub fn with_events(self, r: UpstreamResult) -> Self {
    self.with("events", r)
  }

  pub fn with_commits(self, r: UpstreamResult) -> Self {
    self.with("commits", r)
  }

  pub fn with_graphql(self, r: UpstreamResult) -> Self {
    self.with("graphql", r)
  }

  /// Comparison for `repo` between `base` and `head`.
  pub fn with_compare(self, repo: &str, base: &str, head: &str, r: UpstreamResult) -> Self {
    let route = format!("compare:{}:{}...{}", repo, base, head);
    self.with(&route, r)
  }

  pub fn calls(&self, route: &str) -> usize {
    self.calls.lock().map(|m| m.get(route).copied().unwrap_or(0)).unwrap_or(0)
  }

  /// Total comparison calls across all ranges.
  pub fn compare_calls(&self) -> usize {
    self
      .calls
      .lock()
      .map(|m| m.iter().filter(|(k, _)| k.starts_with("compare:")).map(|(_, n)| n).sum::<usize>())
      .unwrap_or(0)
  }

  pub fn last_body(&self, route: &str) -> Option<Value> {
    self.bodies.lock().ok().and_then(|m| m.get(route).cloned())
  }

  fn respond(&self, route: &str, body: Option<&Value>) -> UpstreamResult {
    if let Ok(mut calls) = self.calls.lock() {
      *calls.entry(route.to_string()).or_insert(0) += 1;
    }

    if let (Some(b), Ok(mut bodies)) = (body, self.bodies.lock()) {
      bodies.insert(route.to_string(), b.clone());
    }

    self.responses.get(route).cloned().unwrap_or_else(not_found)
  }
}

impl GithubApi for ScriptedApi {
  fn list_user_repos(&self, _user: &str) -> UpstreamResult {
    self.respond("repos", None)
  }

  fn get_repo(&self, _owner: &str, _name: &str) -> UpstreamResult {
    self.respond("repo", None)
  }

  fn create_repo(&self, body: &Value) -> UpstreamResult {
    self.respond("create", Some(body))
  }

  fn update_repo(&self, _owner: &str, _name: &str, body: &Value) -> UpstreamResult {
    self.respond("update", Some(body))
  }

  fn delete_repo(&self, _owner: &str, _name: &str) -> UpstreamResult {
    self.respond("delete", None)
  }

  fn list_user_events(&self, _user: &str, _per_page: u32) -> UpstreamResult {
    self.respond("events", None)
  }

  fn list_repo_commits(&self, _owner: &str, _name: &str, _per_page: u32) -> UpstreamResult {
    self.respond("commits", None)
  }

  fn compare_commits(&self, repo: &str, base: &str, head: &str) -> UpstreamResult {
    self.respond(&format!("compare:{}:{}...{}", repo, base, head), None)
  }

  fn graphql(&self, _query: &str, variables: &Value) -> UpstreamResult {
    self.respond("graphql", Some(variables))
  }
}
