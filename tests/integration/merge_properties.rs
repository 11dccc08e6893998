use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use gh_activity_feed::merge::merge_bursts;
use gh_activity_feed::model::{ActivityRecord, EventKind, PushSummary};

fn record(idx: usize, push: bool, repo: u8, minutes_ago: i64, commits: u64) -> ActivityRecord {
  let at = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap() - Duration::minutes(minutes_ago);
  let repo = format!("octo/r{}", repo);

  if push {
    let message = format!("change {}", idx);
    ActivityRecord {
      id: idx.to_string(),
      kind: EventKind::Push,
      repo,
      created_at: at.to_rfc3339(),
      payload: if commits == 1 {
        format!("Pushed 1 commit to main: {}", message)
      } else {
        format!("Pushed {} commits to main: {}", commits, message)
      },
      all_messages: None,
      push: Some(PushSummary {
        branch: "main".into(),
        commits,
        first_message: Some(message),
      }),
    }
  } else {
    ActivityRecord {
      id: idx.to_string(),
      kind: EventKind::Issues,
      repo,
      created_at: at.to_rfc3339(),
      payload: "Issue opened: Bug".into(),
      all_messages: None,
      push: None,
    }
  }
}

fn records_strategy() -> impl Strategy<Value = Vec<ActivityRecord>> {
  prop::collection::vec((any::<bool>(), 0u8..3, 0i64..20_000, 1u64..20), 0..24).prop_map(|items| {
    items
      .into_iter()
      .enumerate()
      .map(|(i, (push, repo, ago, commits))| record(i, push, repo, ago, commits))
      .collect()
  })
}

fn push_total(records: &[ActivityRecord]) -> u64 {
  records.iter().filter_map(|r| r.push.as_ref()).map(|p| p.commits).sum()
}

proptest! {
  #[test]
  fn commit_totals_are_conserved(records in records_strategy(), window in 0i64..5_000) {
    let out = merge_bursts(&records, window);
    prop_assert_eq!(push_total(&out), push_total(&records));
    prop_assert!(out.len() <= records.len());
  }

  #[test]
  fn non_push_records_survive_in_order(records in records_strategy(), window in 0i64..5_000) {
    let out = merge_bursts(&records, window);
    let before: Vec<&ActivityRecord> = records.iter().filter(|r| r.kind != EventKind::Push).collect();
    let after: Vec<&ActivityRecord> = out.iter().filter(|r| r.kind != EventKind::Push).collect();
    prop_assert_eq!(before, after);
  }

  #[test]
  fn distinct_repos_are_left_alone(pushes in prop::collection::vec((0i64..20_000, 1u64..20), 0..12)) {
    // one repository per push: nothing can group
    let records: Vec<ActivityRecord> = pushes
      .iter()
      .enumerate()
      .map(|(i, (ago, commits))| {
        let mut r = record(i, true, 0, *ago, *commits);
        r.repo = format!("octo/solo{}", i);
        r
      })
      .collect();

    prop_assert_eq!(merge_bursts(&records, 3600), records);
  }

  #[test]
  fn output_is_a_subsequence_of_anchors(records in records_strategy(), window in 0i64..5_000) {
    let out = merge_bursts(&records, window);
    let mut positions = out.iter().map(|o| records.iter().position(|r| r.id == o.id));
    let mut last = None;

    for p in positions.by_ref() {
      prop_assert!(p.is_some());
      prop_assert!(p > last);
      last = p;
    }
  }
}
