use crate::{feed_json, NOW};

fn ids(v: &serde_json::Value) -> Vec<String> {
  v.as_array()
    .unwrap()
    .iter()
    .map(|r| r["id"].as_str().unwrap().to_string())
    .collect()
}

#[test]
fn current_month_is_filtered_then_merged() {
  let v = feed_json(&["activity", "--now-override", NOW]);

  assert_eq!(ids(&v), vec!["105", "102"]);
  assert_eq!(v[0]["payload"], "Pushed 5 commits to main: Add cache layer (+ 1 more)");
  assert_eq!(v[0]["all_messages"], serde_json::json!(["Add cache layer", "Fix typo in README"]));
  assert_eq!(v[0]["push"]["commits"], 5);
  assert_eq!(v[1]["type"], "IssuesEvent");
  assert_eq!(v[1]["payload"], "Issue opened: Contribution calendar renders an empty g...");
}

#[test]
fn all_history_drops_disallowed_kinds() {
  let v = feed_json(&["activity", "--all", "--now-override", NOW]);

  assert_eq!(ids(&v), vec!["105", "102", "101", "100", "99"]);
  assert!(v.as_array().unwrap().iter().all(|r| r["type"] != "WatchEvent"));
  // no comparison fixture for this range
  assert_eq!(v[4]["payload"], "Pushed to redesign");
}

#[test]
fn raw_skips_period_and_merging() {
  let v = feed_json(&["activity", "--raw"]);

  assert_eq!(ids(&v), vec!["105", "104", "102", "101", "100", "99"]);
  assert_eq!(v[1]["payload"], "Pushed 2 commits to main: Fix typo in README");
  assert!(v[0].get("all_messages").is_none());
}

#[test]
fn past_year_without_events_is_empty() {
  let v = feed_json(&["activity", "--year", "2025", "--now-override", NOW]);
  assert_eq!(v, serde_json::json!([]));
}

#[test]
fn narrow_window_keeps_pushes_apart() {
  // the two pushes to octocat/feed are 90 minutes apart
  let v = feed_json(&["--merge-window-minutes", "60", "activity", "--now-override", NOW]);
  assert_eq!(ids(&v), vec!["105", "104", "102"]);
  assert_eq!(v[0]["payload"], "Pushed 3 commits to main: Add cache layer");
}

#[test]
fn by_month_groups_in_feed_order() {
  let v = feed_json(&["activity", "--all", "--by-month", "--now-override", NOW]);
  let groups = v.as_array().unwrap();

  assert_eq!(groups.len(), 2);
  assert_eq!(groups[0]["label"], "October 2026");
  assert_eq!(groups[0]["records"].as_array().unwrap().len(), 2);
  assert_eq!(groups[1]["label"], "September 2026");
  assert_eq!(groups[1]["records"].as_array().unwrap().len(), 3);
}

#[test]
fn limit_caps_the_upstream_page() {
  let v = feed_json(&["activity", "--raw", "--limit", "2"]);
  assert_eq!(ids(&v), vec!["105", "104"]);
}
