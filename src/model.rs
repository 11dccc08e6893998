// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON model (events, activity records, comparisons, calendars, repositories) shared by fetchers, cache, and consumers
// role: model/types
// outputs: Serializable structs with stable field names; optional fields skipped when absent
// invariants: Every type round-trips through serde_json (the cache stores values as JSON); defaults are the safe empty values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ext::serde_json::JsonFetch;

/// The event types kept by the normalizer. Everything else upstream is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
  #[serde(rename = "PushEvent")]
  Push,
  #[serde(rename = "CreateEvent")]
  Create,
  #[serde(rename = "IssuesEvent")]
  Issues,
  #[serde(rename = "PullRequestEvent")]
  PullRequest,
}

impl EventKind {
  pub const ALLOWED: [EventKind; 4] = [EventKind::Push, EventKind::Create, EventKind::Issues, EventKind::PullRequest];

  /// Map an upstream `type` string onto the allow-list.
  pub fn from_upstream(kind: &str) -> Option<EventKind> {
    match kind {
      "PushEvent" => Some(EventKind::Push),
      "CreateEvent" => Some(EventKind::Create),
      "IssuesEvent" => Some(EventKind::Issues),
      "PullRequestEvent" => Some(EventKind::PullRequest),
      _ => None,
    }
  }

  pub fn as_upstream(&self) -> &'static str {
    match self {
      EventKind::Push => "PushEvent",
      EventKind::Create => "CreateEvent",
      EventKind::Issues => "IssuesEvent",
      EventKind::PullRequest => "PullRequestEvent",
    }
  }
}

/// An account event exactly as upstream reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
  pub id: String,
  pub kind: String,
  pub repo_name: String,
  pub created_at: String,
  pub payload: serde_json::Value,
}

impl RawEvent {
  /// Lift one element of the events listing. Requires `id` and `type`.
  pub fn from_json(v: &serde_json::Value) -> Option<RawEvent> {
    let id = v
      .fetch("id")
      .to::<String>()
      .or_else(|| v.fetch("id").to::<u64>().map(|n| n.to_string()))?;
    let kind = v.fetch("type").to::<String>()?;

    Some(RawEvent {
      id,
      kind,
      repo_name: v.fetch("repo.name").to_or_default::<String>(),
      created_at: v.fetch("created_at").to_or_default::<String>(),
      payload: v.fetch("payload").value().cloned().unwrap_or(serde_json::Value::Null),
    })
  }

  pub fn allowed_kind(&self) -> Option<EventKind> {
    EventKind::from_upstream(&self.kind)
  }
}

/// Structured push details kept next to the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSummary {
  pub branch: String,
  /// Resolved commit count; 0 when the comparison was unavailable.
  pub commits: u64,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub first_message: Option<String>,
}

/// One line of the activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: EventKind,
  pub repo: String,
  pub created_at: String,
  /// Pre-rendered, human readable summary.
  pub payload: String,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub all_messages: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub push: Option<PushSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparedCommit {
  pub sha: String,
  pub message: String,
}

/// Commit range between two revisions of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitComparison {
  pub total_commits: u64,
  pub commits: Vec<ComparedCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
  pub date: String,
  pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
  pub days: Vec<ContributionDay>,
}

/// A calendar year of contribution counts. `Default` is the safe empty calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCalendar {
  pub total_contributions: u64,
  pub weeks: Vec<Week>,
}

impl ContributionCalendar {
  /// Highest single-day count; handy for heatmap scaling.
  pub fn max_daily(&self) -> u64 {
    self
      .weeks
      .iter()
      .flat_map(|w| w.days.iter())
      .map(|d| d.count)
      .max()
      .unwrap_or(0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRepo {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub description: Option<String>,
  pub url: String,
  pub stars: u64,
  pub forks: u64,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub language: Option<String>,
  #[serde(default)]
  pub topics: BTreeSet<String>,
}

/// Account-wide totals over a repository listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
  pub total_repos: usize,
  pub total_stars: u64,
  pub total_forks: u64,
}

impl RepoStats {
  pub fn from_repos(repos: &[NormalizedRepo]) -> RepoStats {
    RepoStats {
      total_repos: repos.len(),
      total_stars: repos.iter().map(|r| r.stars).sum(),
      total_forks: repos.iter().map(|r| r.forks).sum(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentCommit {
  pub sha: String,
  pub message: String,
  pub author: String,
  pub date: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRepo {
  pub id: u64,
  pub name: String,
  pub full_name: String,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub description: Option<String>,
  pub url: String,
  pub clone_url: String,
  pub ssh_url: String,
  pub private: bool,
}

/// Uniform result of a repository lifecycle operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOpOutcome {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub status: Option<u16>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub data: Option<CreatedRepo>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub updated_fields: Option<Vec<String>>,
}

impl RepoOpOutcome {
  pub fn ok(message: impl Into<String>) -> Self {
    Self {
      success: true,
      message: Some(message.into()),
      ..Self::default()
    }
  }

  pub fn failed(error: impl Into<String>, status: Option<u16>) -> Self {
    Self {
      success: false,
      error: Some(error.into()),
      status,
      ..Self::default()
    }
  }
}
