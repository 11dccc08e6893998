use jsonschema::validator_for;

use crate::{feed_json, NOW};

fn read_schema(name: &str) -> serde_json::Value {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  serde_json::from_slice(&data).expect("valid schema JSON")
}

fn compile_schema(name: &str) -> jsonschema::Validator {
  let schema = read_schema(name);
  validator_for(&schema).expect("compile schema")
}

#[test]
fn raw_and_merged_activity_conform_to_schema() {
  let compiled = compile_schema("activity.schema.json");

  let raw = feed_json(&["activity", "--raw"]);
  compiled.validate(&raw).expect("schema validation failed for raw activity");

  let merged = feed_json(&["activity", "--all", "--now-override", NOW]);
  compiled.validate(&merged).expect("schema validation failed for merged activity");
}

#[test]
fn dashboard_conforms_to_schema() {
  let compiled = compile_schema("dashboard.schema.json");
  let v = feed_json(&["dashboard", "--now-override", NOW]);
  compiled.validate(&v).expect("schema validation failed for dashboard");

  let activity = compile_schema("activity.schema.json");
  activity.validate(&v["activity"]).expect("schema validation failed for dashboard activity");
}

#[test]
fn schema_rejects_unknown_kinds() {
  let compiled = compile_schema("activity.schema.json");
  let bad = serde_json::json!([
    { "id": "1", "type": "WatchEvent", "repo": "o/r", "created_at": "2026-10-01T00:00:00Z", "payload": "Starred" }
  ]);
  assert!(!compiled.is_valid(&bad));
}
