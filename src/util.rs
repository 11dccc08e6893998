// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Text helpers for rendered activity lines, timestamp parsing, and man page rendering
// role: utilities/helpers
// inputs: Strings from upstream payloads; RFC3339 timestamps; clap CommandFactory
// outputs: Truncated/first-line text, commit-count phrases, parsed UTC instants, man page text
// invariants:
// - truncate_chars never splits UTF-8 and counts characters, not bytes
// - commit_phrase is singular only for exactly one commit
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use clap::CommandFactory;

pub const ELLIPSIS: &str = "...";

/// Keep at most `max` characters, appending `...` when something was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
    None => text.to_string(),
  }
}

/// Text before the first line break.
pub fn first_line(text: &str) -> &str {
  text.split(['\n', '\r']).next().unwrap_or("")
}

/// "1 commit" / "N commits".
pub fn commit_phrase(n: u64) -> String {
  if n == 1 {
    "1 commit".to_string()
  } else {
    format!("{} commits", n)
  }
}

/// Parse an upstream RFC3339 timestamp into UTC.
pub fn parse_utc(ts: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(ts).ok().map(|d| d.with_timezone(&Utc))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
