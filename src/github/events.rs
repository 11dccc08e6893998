// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch recent account events, keep the allow-listed kinds, and render one human-readable ActivityRecord per event
// role: github/event-normalizer
// inputs: GithubApi (events), CacheStore, FeedConfig (username, events TTL), ComparisonResolver for push enrichment
// outputs: Vec<ActivityRecord> in upstream order (newest first)
// invariants:
// - Only Push/Create/Issues/PullRequest events survive; others are dropped, not forwarded
// - A failed comparison degrades only its own record's text
// - Listing failures yield an empty Vec and are not cached
// - Push enrichment goes through ComparisonResolver so its cache is shared with direct callers
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheExt, CacheStore};
use crate::config::FeedConfig;
use crate::error::UpstreamError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::github::compare::ComparisonResolver;
use crate::model::{ActivityRecord, EventKind, PushSummary, RawEvent};
use crate::util::{commit_phrase, first_line, truncate_chars};

/// Upstream caps `per_page` at 100.
pub const MAX_EVENTS_PER_PAGE: u32 = 100;

const PUSH_MESSAGE_MAX: usize = 60;
const TITLE_MAX: usize = 40;

pub struct EventNormalizer<'a> {
  api: &'a dyn GithubApi,
  cache: &'a dyn CacheStore,
  config: &'a FeedConfig,
  resolver: ComparisonResolver<'a>,
}

impl<'a> EventNormalizer<'a> {
  pub fn new(api: &'a dyn GithubApi, cache: &'a dyn CacheStore, config: &'a FeedConfig) -> Self {
    Self {
      api,
      cache,
      config,
      resolver: ComparisonResolver::new(api, cache, config),
    }
  }

  /// The `limit` most recent allow-listed events, rendered. Cached as one unit per `limit`.
  pub fn recent(&self, limit: u32) -> Vec<ActivityRecord> {
    let key = format!("github_events_{}", limit);

    self
      .cache
      .get_or_compute(&key, self.config.ttl.events, || self.fetch(limit))
      .unwrap_or_default()
  }

  fn fetch(&self, limit: u32) -> Result<Vec<ActivityRecord>, UpstreamError> {
    let per_page = limit.clamp(1, MAX_EVENTS_PER_PAGE);
    let body = self.api.list_user_events(&self.config.username, per_page)?;
    let items = body
      .as_array()
      .ok_or_else(|| UpstreamError::MissingField("event list".into()))?;

    let records: Vec<ActivityRecord> = items
      .iter()
      .filter_map(RawEvent::from_json)
      .filter_map(|ev| self.normalize(&ev))
      .collect();

    debug!(fetched = items.len(), kept = records.len(), "normalized events");

    Ok(records)
  }

  /// Render one event, or `None` when its kind is not on the allow-list.
  pub fn normalize(&self, event: &RawEvent) -> Option<ActivityRecord> {
    let kind = event.allowed_kind()?;

    let (payload, push) = match kind {
      EventKind::Push => {
        let (text, summary) = self.render_push(event);
        (text, Some(summary))
      }
      EventKind::Create => (render_create(&event.payload), None),
      EventKind::Issues => (render_titled("Issue", &event.payload, "issue.title"), None),
      EventKind::PullRequest => (render_titled("Pull request", &event.payload, "pull_request.title"), None),
    };

    Some(ActivityRecord {
      id: event.id.clone(),
      kind,
      repo: event.repo_name.clone(),
      created_at: event.created_at.clone(),
      payload,
      all_messages: None,
      push,
    })
  }

  fn render_push(&self, event: &RawEvent) -> (String, PushSummary) {
    let git_ref = event.payload.fetch("ref").to_or_default::<String>();
    let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(&git_ref).to_string();
    let before = event.payload.fetch("before").non_empty_str();
    let head = event.payload.fetch("head").non_empty_str();

    let comparison = match (before, head) {
      (Some(base), Some(head)) if !event.repo_name.is_empty() => self.resolver.compare(&event.repo_name, &base, &head),
      _ => None,
    };

    if let Some(cmp) = comparison.filter(|c| c.total_commits > 0) {
      let n = cmp.total_commits;
      let message = cmp
        .commits
        .first()
        .map(|c| truncate_chars(first_line(&c.message), PUSH_MESSAGE_MAX))
        .filter(|m| !m.is_empty());

      let text = match &message {
        Some(m) => format!("Pushed {} to {}: {}", commit_phrase(n), branch, m),
        None => format!("Pushed {} to {}", commit_phrase(n), branch),
      };

      return (
        text,
        PushSummary {
          branch,
          commits: n,
          first_message: message,
        },
      );
    }

    let text = if branch.is_empty() {
      "Pushed commits".to_string()
    } else {
      format!("Pushed to {}", branch)
    };

    (
      text,
      PushSummary {
        branch,
        commits: 0,
        first_message: None,
      },
    )
  }
}

fn render_create(payload: &Value) -> String {
  let ref_type = payload.fetch("ref_type").non_empty_str().unwrap_or_else(|| "unknown".into());

  match payload.fetch("ref").non_empty_str() {
    Some(r) => format!("Created {}: {}", ref_type, r),
    None => format!("Created {}", ref_type),
  }
}

/// `"{label} {action}: {title}"` for issue-like payloads.
fn render_titled(label: &str, payload: &Value, title_path: &str) -> String {
  let action = payload.fetch("action").non_empty_str().unwrap_or_else(|| "unknown".into());

  match payload.fetch(title_path).non_empty_str() {
    Some(title) => format!("{} {}: {}", label, action, truncate_chars(&title, TITLE_MAX)),
    None => format!("{} {}", label, action),
  }
}
