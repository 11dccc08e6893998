// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve a commit range (count + messages) between two revisions of a repository
// role: github/commit-comparison
// inputs: GithubApi (compare), CacheStore, FeedConfig (comparison TTL)
// outputs: Option<CommitComparison>
// invariants: Cached per (repo, base, head); failures yield None and are never cached
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;

use crate::cache::{CacheExt, CacheStore};
use crate::config::FeedConfig;
use crate::error::UpstreamError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::model::{CommitComparison, ComparedCommit};

pub struct ComparisonResolver<'a> {
  api: &'a dyn GithubApi,
  cache: &'a dyn CacheStore,
  config: &'a FeedConfig,
}

impl<'a> ComparisonResolver<'a> {
  pub fn new(api: &'a dyn GithubApi, cache: &'a dyn CacheStore, config: &'a FeedConfig) -> Self {
    Self { api, cache, config }
  }

  /// Commits reachable from `head` but not `base`. `None` means no enrichment is available.
  pub fn compare(&self, repo: &str, base: &str, head: &str) -> Option<CommitComparison> {
    let key = format!("github_comparison_{}_{}_{}", repo, base, head);

    self
      .cache
      .get_or_compute(&key, self.config.ttl.comparison, || {
        let body = self.api.compare_commits(repo, base, head)?;
        parse_comparison(&body)
      })
      .ok()
  }
}

/// Non-object bodies (an empty 2xx reads as `Null`) are rejected and so never cached.
pub fn parse_comparison(body: &Value) -> Result<CommitComparison, UpstreamError> {
  if !body.is_object() {
    return Err(UpstreamError::MissingField("total_commits".into()));
  }

  let commits = body
    .fetch("commits")
    .to::<Vec<Value>>()
    .unwrap_or_default()
    .iter()
    .map(|c| ComparedCommit {
      sha: c.fetch("sha").to_or_default::<String>(),
      message: c.fetch("commit.message").to_or_default::<String>(),
    })
    .collect();

  Ok(CommitComparison {
    total_commits: body.fetch("total_commits").to_or_default::<u64>(),
    commits,
  })
}
