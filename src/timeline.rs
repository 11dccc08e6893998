// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Presentation-side scoping of the activity feed (year / current month / all) and month grouping
// role: timeline/period
// inputs: ActivityRecords from the normalizer cache; a selected year and "now"
// outputs: Period-filtered records; ordered month groups labelled like "October 2026"
// invariants: Periods are evaluated in UTC; records with unparseable timestamps fall outside every bounded period
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ActivityRecord;
use crate::util::parse_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum Period {
  All,
  Year { year: i32 },
  Month { year: i32, month: u32 },
}

impl Period {
  /// The default widget scope: the current month when looking at the current year,
  /// the whole year otherwise, everything once the user asked for more.
  pub fn for_selection(selected_year: Option<i32>, show_all: bool, now: DateTime<Utc>) -> Period {
    if show_all {
      return Period::All;
    }

    let year = selected_year.unwrap_or_else(|| now.year());

    if year == now.year() {
      Period::Month {
        year,
        month: now.month(),
      }
    } else {
      Period::Year { year }
    }
  }

  pub fn contains(&self, ts: &str) -> bool {
    match self {
      Period::All => true,
      Period::Year { year } => parse_utc(ts).map(|t| t.year() == *year).unwrap_or(false),
      Period::Month { year, month } => parse_utc(ts)
        .map(|t| t.year() == *year && t.month() == *month)
        .unwrap_or(false),
    }
  }
}

pub fn filter_for_period(records: &[ActivityRecord], period: Period) -> Vec<ActivityRecord> {
  records.iter().filter(|r| period.contains(&r.created_at)).cloned().collect()
}

/// A labelled run of records from one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGroup {
  pub label: String,
  pub records: Vec<ActivityRecord>,
}

/// Group records by "{Month} {Year}", keeping first-seen label order.
pub fn group_by_month(records: Vec<ActivityRecord>) -> Vec<MonthGroup> {
  let mut groups: Vec<MonthGroup> = Vec::new();

  for rec in records {
    let label = parse_utc(&rec.created_at)
      .map(|t| t.format("%B %Y").to_string())
      .unwrap_or_else(|| "Unknown".to_string());

    match groups.iter_mut().find(|g| g.label == label) {
      Some(g) => g.records.push(rec),
      None => groups.push(MonthGroup {
        label,
        records: vec![rec],
      }),
    }
  }

  groups
}
