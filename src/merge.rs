// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Collapse bursts of push records on the same repository into one summarized record (request-scoped, uncached)
// role: timeline/burst-merge
// inputs: ActivityRecords already filtered to the requested period; window in whole minutes
// outputs: ActivityRecords in original anchor order with merged push groups
// invariants:
// - Window test is inclusive, absolute, and always measured against the group's anchor (never chained)
// - Non-push and ungrouped records keep their positions and content
// - Counts come from PushSummary when present, else from the rendered text; unparseable counts add 0
// - all_messages is set only when at least two member messages were recovered
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DEFAULT_MERGE_WINDOW_MINUTES;
use crate::model::{ActivityRecord, EventKind, PushSummary};
use crate::util::{commit_phrase, parse_utc};

static RE_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Pushed (\d+) commits? to").unwrap());
static RE_MESSAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r": (.+)$").unwrap());
static RE_BRANCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"to ([^\s:]+)").unwrap());

const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstMerger {
  window_minutes: i64,
}

impl Default for BurstMerger {
  fn default() -> Self {
    Self::new(DEFAULT_MERGE_WINDOW_MINUTES)
  }
}

impl BurstMerger {
  pub fn new(window_minutes: i64) -> Self {
    Self { window_minutes }
  }

  /// O(n²) over the (small, period-filtered) input.
  pub fn merge(&self, records: &[ActivityRecord]) -> Vec<ActivityRecord> {
    let times: Vec<Option<DateTime<Utc>>> = records.iter().map(|r| parse_utc(&r.created_at)).collect();
    let mut used = vec![false; records.len()];
    let mut out = Vec::with_capacity(records.len());

    for (i, anchor) in records.iter().enumerate() {
      if used[i] {
        continue;
      }

      if anchor.kind != EventKind::Push {
        out.push(anchor.clone());
        continue;
      }

      used[i] = true;
      let mut group = vec![anchor];

      for (j, candidate) in records.iter().enumerate().skip(i + 1) {
        if used[j] || candidate.kind != EventKind::Push || candidate.repo != anchor.repo {
          continue;
        }

        if self.within(times[i], times[j]) {
          used[j] = true;
          group.push(candidate);
        }
      }

      if group.len() > 1 {
        out.push(merge_group(&group));
      } else {
        out.push(anchor.clone());
      }
    }

    out
  }

  fn within(&self, anchor: Option<DateTime<Utc>>, other: Option<DateTime<Utc>>) -> bool {
    match (anchor, other) {
      (Some(a), Some(b)) => (b - a).num_minutes().abs() <= self.window_minutes,
      _ => false,
    }
  }
}

/// Free-function form of [`BurstMerger::merge`].
pub fn merge_bursts(records: &[ActivityRecord], window_minutes: i64) -> Vec<ActivityRecord> {
  BurstMerger::new(window_minutes).merge(records)
}

/// Commit count and first message of a push record.
fn push_parts(record: &ActivityRecord) -> (Option<u64>, Option<String>) {
  if let Some(p) = &record.push {
    return (Some(p.commits), p.first_message.clone());
  }

  let count = RE_COUNT
    .captures(&record.payload)
    .and_then(|c| c.get(1))
    .and_then(|m| m.as_str().parse::<u64>().ok());
  let message = RE_MESSAGE
    .captures(&record.payload)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string());

  (count, message)
}

fn anchor_branch(anchor: &ActivityRecord) -> String {
  let structured = anchor.push.as_ref().map(|p| p.branch.clone()).filter(|b| !b.is_empty());

  structured
    .or_else(|| {
      RE_BRANCH
        .captures(&anchor.payload)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
    })
    .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
}

fn merge_group(group: &[&ActivityRecord]) -> ActivityRecord {
  let anchor = group[0];
  let mut total = 0u64;
  let mut messages: Vec<String> = Vec::new();

  for member in group {
    let (count, message) = push_parts(member);
    total += count.unwrap_or(0);

    if let Some(m) = message {
      messages.push(m);
    }
  }

  let mut merged = anchor.clone();

  if total == 0 {
    return merged;
  }

  let branch = anchor_branch(anchor);
  let mut preview = String::new();

  if let Some(first) = messages.first() {
    preview.push_str(": ");
    preview.push_str(first);
  }

  if messages.len() > 1 {
    preview.push_str(&format!(" (+ {} more)", messages.len() - 1));
  }

  merged.payload = format!("Pushed {} to {}{}", commit_phrase(total), branch, preview);
  merged.push = Some(PushSummary {
    branch,
    commits: total,
    first_message: messages.first().cloned(),
  });

  if messages.len() > 1 {
    merged.all_messages = Some(messages);
  }

  merged
}
