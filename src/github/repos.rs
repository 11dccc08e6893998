// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: List and normalize the account's owned repositories; pass-through lifecycle ops (create/exists/update/delete/archive); recent commits
// role: github/repositories
// inputs: GithubApi, CacheStore, FeedConfig (username, TTLs)
// outputs: NormalizedRepo lists, RecentCommit lists, RepoOpOutcome results
// side_effects: Upstream mutations for lifecycle ops (never cached)
// invariants:
// - Listing failures yield an empty Vec and are not cached
// - update only forwards description/homepage/topics; string topics are split on commas, trimmed, empties dropped
// - An empty update never reaches upstream
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::cache::{CacheExt, CacheStore};
use crate::config::FeedConfig;
use crate::error::UpstreamError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::model::{CreatedRepo, NormalizedRepo, RecentCommit, RepoOpOutcome};

pub const REPOS_CACHE_KEY: &str = "github_repos";

/// Fields an update may touch upstream.
pub const UPDATABLE_FIELDS: [&str; 3] = ["description", "homepage", "topics"];

pub struct RepositoryFetcher<'a> {
  api: &'a dyn GithubApi,
  cache: &'a dyn CacheStore,
  config: &'a FeedConfig,
}

impl<'a> RepositoryFetcher<'a> {
  pub fn new(api: &'a dyn GithubApi, cache: &'a dyn CacheStore, config: &'a FeedConfig) -> Self {
    Self { api, cache, config }
  }

  /// Owned repositories. `use_cache = false` goes straight upstream (sync jobs).
  ///
  /// An empty result means "no data available", not "zero repositories".
  pub fn list(&self, use_cache: bool) -> Vec<NormalizedRepo> {
    let result = if use_cache {
      self
        .cache
        .get_or_compute(REPOS_CACHE_KEY, self.config.ttl.repos, || self.fetch())
    } else {
      self.fetch()
    };

    result.unwrap_or_default()
  }

  fn fetch(&self) -> Result<Vec<NormalizedRepo>, UpstreamError> {
    let body = self.api.list_user_repos(&self.config.username)?;
    let items = body
      .as_array()
      .ok_or_else(|| UpstreamError::MissingField("repository list".into()))?;

    Ok(items.iter().filter_map(normalize_repo).collect())
  }

  /// Latest commits on one of the account's repositories. Empty on failure.
  pub fn recent_commits(&self, repo: &str, limit: u32) -> Vec<RecentCommit> {
    let key = format!("github_commits_{}_{}", repo, limit);

    self
      .cache
      .get_or_compute(&key, self.config.ttl.commits, || {
        let body = self.api.list_repo_commits(&self.config.username, repo, limit)?;
        let items = body
          .as_array()
          .ok_or_else(|| UpstreamError::MissingField("commit list".into()))?;

        Ok::<_, UpstreamError>(items.iter().filter_map(normalize_commit).collect::<Vec<_>>())
      })
      .unwrap_or_default()
  }

  pub fn create(&self, name: &str, description: Option<&str>, private: bool, auto_init: bool) -> RepoOpOutcome {
    let body = json!({
      "name": name,
      "description": description,
      "private": private,
      "auto_init": auto_init,
    });

    match self.api.create_repo(&body) {
      Ok(repo) => RepoOpOutcome {
        success: true,
        data: Some(created_repo(&repo)),
        ..RepoOpOutcome::default()
      },
      Err(e) => failure(&e, "Failed to create repository"),
    }
  }

  pub fn exists(&self, name: &str) -> bool {
    self.api.get_repo(&self.config.username, name).is_ok()
  }

  /// Push allow-listed field changes upstream.
  pub fn update(&self, name: &str, updates: &Map<String, Value>) -> RepoOpOutcome {
    let filtered = filter_updates(updates);

    if filtered.is_empty() {
      return RepoOpOutcome::ok("No changes to sync");
    }

    let updated_fields: Vec<String> = filtered.keys().cloned().collect();

    match self
      .api
      .update_repo(&self.config.username, name, &Value::Object(filtered))
    {
      Ok(_) => RepoOpOutcome {
        updated_fields: Some(updated_fields),
        ..RepoOpOutcome::ok(format!("Repository '{}' has been updated on GitHub", name))
      },
      Err(e) => failure(&e, "Failed to update repository"),
    }
  }

  pub fn delete(&self, name: &str) -> RepoOpOutcome {
    match self.api.delete_repo(&self.config.username, name) {
      Ok(_) => RepoOpOutcome::ok(format!("Repository '{}' has been deleted from GitHub", name)),
      Err(e) => failure(&e, "Failed to delete repository"),
    }
  }

  pub fn archive(&self, name: &str) -> RepoOpOutcome {
    let body = json!({ "archived": true });

    match self.api.update_repo(&self.config.username, name, &body) {
      Ok(_) => RepoOpOutcome::ok(format!("Repository '{}' has been archived on GitHub", name)),
      Err(e) => failure(&e, "Failed to archive repository"),
    }
  }
}

fn failure(e: &UpstreamError, fallback: &str) -> RepoOpOutcome {
  let message = e.upstream_message().unwrap_or(fallback);
  RepoOpOutcome::failed(message, e.status())
}

/// Map one upstream repository object. Entries without a name are skipped.
pub fn normalize_repo(repo: &Value) -> Option<NormalizedRepo> {
  let name = repo.fetch("name").non_empty_str()?;

  Some(NormalizedRepo {
    name,
    description: repo.fetch("description").to::<String>(),
    url: repo.fetch("html_url").to_or_default::<String>(),
    stars: repo.fetch("stargazers_count").to_or_default::<u64>(),
    forks: repo.fetch("forks_count").to_or_default::<u64>(),
    language: repo.fetch("language").to::<String>(),
    topics: repo.fetch("topics").to_or_default::<BTreeSet<String>>(),
  })
}

fn normalize_commit(commit: &Value) -> Option<RecentCommit> {
  let sha = commit.fetch("sha").non_empty_str()?;

  Some(RecentCommit {
    sha,
    message: commit.fetch("commit.message").to_or_default::<String>(),
    author: commit.fetch("commit.author.name").to_or_default::<String>(),
    date: commit.fetch("commit.author.date").to_or_default::<String>(),
    url: commit.fetch("html_url").to_or_default::<String>(),
  })
}

fn created_repo(repo: &Value) -> CreatedRepo {
  CreatedRepo {
    id: repo.fetch("id").to_or_default::<u64>(),
    name: repo.fetch("name").to_or_default::<String>(),
    full_name: repo.fetch("full_name").to_or_default::<String>(),
    description: repo.fetch("description").to::<String>(),
    url: repo.fetch("html_url").to_or_default::<String>(),
    clone_url: repo.fetch("clone_url").to_or_default::<String>(),
    ssh_url: repo.fetch("ssh_url").to_or_default::<String>(),
    private: repo.fetch("private").to_or_default::<bool>(),
  }
}

/// Keep only updatable fields; normalize comma-separated topics into a list.
pub fn filter_updates(updates: &Map<String, Value>) -> Map<String, Value> {
  let mut out = Map::new();

  for field in UPDATABLE_FIELDS {
    let Some(v) = updates.get(field) else { continue };

    let v = match (field, v) {
      ("topics", Value::String(csv)) => Value::Array(split_topics(csv).into_iter().map(Value::String).collect()),
      _ => v.clone(),
    };

    out.insert(field.to_string(), v);
  }

  out
}

fn split_topics(csv: &str) -> Vec<String> {
  csv
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_string)
    .collect()
}
