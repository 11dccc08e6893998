use predicates::prelude::*;

use crate::{feed_cmd, feed_json, NOW};

#[test]
fn repos_are_normalized() {
  let v = feed_json(&["repos"]);
  let repos = v.as_array().unwrap();

  assert_eq!(repos.len(), 2);
  assert_eq!(repos[0]["name"], "feed");
  assert_eq!(repos[0]["stars"], 12);
  assert_eq!(repos[0]["topics"], serde_json::json!(["cache", "github"]));
  assert!(repos[1].get("description").is_none());
  assert!(repos[1].get("language").is_none());
}

#[test]
fn stats_sum_the_listing() {
  let v = feed_json(&["stats"]);
  assert_eq!(
    v,
    serde_json::json!({ "total_repos": 2, "total_stars": 13, "total_forks": 3 })
  );

  let listing: Vec<serde_json::Value> = test_support::read_fixture_json("repos.json");
  let stars: u64 = listing.iter().filter_map(|r| r["stargazers_count"].as_u64()).sum();
  assert_eq!(v["total_repos"], listing.len());
  assert_eq!(v["total_stars"], stars);
}

#[test]
fn calendar_for_a_year() {
  let v = feed_json(&["calendar", "--year", "2026"]);

  assert_eq!(v["total_contributions"], 9);
  assert_eq!(v["weeks"].as_array().unwrap().len(), 2);
  assert_eq!(v["weeks"][1]["days"][0], serde_json::json!({ "date": "2026-10-12", "count": 5 }));
}

#[test]
fn calendar_failure_is_the_empty_calendar() {
  let out = feed_cmd()
    .env("FEED_TEST_GRAPHQL_JSON", r#"{"errors":[{"message":"Could not resolve to a User"}]}"#)
    .args(["calendar", "--year", "2026"])
    .output()
    .unwrap();

  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v, serde_json::json!({ "total_contributions": 0, "weeks": [] }));
}

#[test]
fn commits_respect_limit() {
  let v = feed_json(&["commits", "feed", "--limit", "1"]);
  let commits = v.as_array().unwrap();

  assert_eq!(commits.len(), 1);
  assert_eq!(commits[0]["sha"], "c3a");
  assert_eq!(commits[0]["author"], "Octo Cat");
}

#[test]
fn dashboard_combines_every_section() {
  let v = feed_json(&["dashboard", "--now-override", NOW]);

  assert_eq!(v["username"], "octocat");
  assert_eq!(v["year"], 2026);
  assert_eq!(v["period"], serde_json::json!({ "period": "month", "year": 2026, "month": 10 }));
  assert_eq!(v["stats"]["total_stars"], 13);
  assert_eq!(v["calendar"]["total_contributions"], 9);
  assert_eq!(v["activity"].as_array().unwrap().len(), 2);
}

#[test]
fn file_cache_is_written_to_cache_dir() {
  let dir = test_support::tempdir();
  let cache_dir = dir.path().join("cache");

  let out = feed_cmd()
    .args(["--cache-dir", cache_dir.to_str().unwrap(), "repos"])
    .output()
    .unwrap();

  assert!(out.status.success());
  let entries = std::fs::read_dir(&cache_dir).unwrap().count();
  assert_eq!(entries, 1);
}

#[test]
fn missing_username_fails_with_hint() {
  let mut cmd = test_support::cmd_bin("gh-activity-feed");
  cmd
    .env_remove("GITHUB_USERNAME")
    .envs(test_support::feed_fixture_env())
    .arg("stats")
    .assert()
    .failure()
    .stderr(predicate::str::contains("GITHUB_USERNAME"));
}

#[test]
fn unreachable_upstream_degrades_to_empty() {
  let out = feed_cmd()
    .env_remove("FEED_TEST_REPOS_JSON")
    .arg("repos")
    .output()
    .unwrap();

  assert!(out.status.success());
  assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "[]");
}
