use crate::{feed_json, NOW};

#[test]
fn cli_activity_payloads_snapshot() {
  test_support::init_insta();

  let v = feed_json(&["activity", "--all", "--now-override", NOW]);
  let payloads: Vec<&str> = v
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["payload"].as_str().unwrap())
    .collect();

  insta::assert_json_snapshot!(payloads, @r###"
  [
    "Pushed 5 commits to main: Add cache layer (+ 1 more)",
    "Issue opened: Contribution calendar renders an empty g...",
    "Created branch: redesign",
    "Pull request closed: Redesign landing page",
    "Pushed to redesign"
  ]
  "###);
}
