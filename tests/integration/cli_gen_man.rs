#[test]
fn gen_man_outputs_troff() {
  test_support::init_tracing();
  let mut cmd = test_support::cmd_bin("gh-activity-feed");
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  // clap_mangen may open with roff preamble (`.ie`/`.el`) before the .TH title line
  assert!(text.contains(".TH"), "expected troff man header");
  assert!(text.contains("gh-activity-feed"));
}
