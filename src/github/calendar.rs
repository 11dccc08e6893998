// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch one calendar year of contribution counts via GraphQL and normalize it into weeks/days
// role: github/contribution-calendar
// inputs: GithubApi (graphql), CacheStore, FeedConfig (username, calendar TTL)
// outputs: ContributionCalendar
// invariants:
// - Query window is [YYYY-01-01T00:00:00Z, YYYY-12-31T23:59:59Z]
// - Failure or a missing calendar yields {total_contributions: 0, weeks: []}, never cached
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::{json, Value};

use crate::cache::{CacheExt, CacheStore};
use crate::config::FeedConfig;
use crate::error::UpstreamError;
use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::model::{ContributionCalendar, ContributionDay, Week};

pub const CONTRIBUTIONS_QUERY: &str = r#"query($username: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $username) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            date
          }
        }
      }
    }
  }
}"#;

const CALENDAR_PATH: &str = "data.user.contributionsCollection.contributionCalendar";

pub struct CalendarFetcher<'a> {
  api: &'a dyn GithubApi,
  cache: &'a dyn CacheStore,
  config: &'a FeedConfig,
}

impl<'a> CalendarFetcher<'a> {
  pub fn new(api: &'a dyn GithubApi, cache: &'a dyn CacheStore, config: &'a FeedConfig) -> Self {
    Self { api, cache, config }
  }

  pub fn for_year(&self, year: i32) -> ContributionCalendar {
    let key = format!("github_contributions_{}", year);

    self
      .cache
      .get_or_compute(&key, self.config.ttl.calendar, || self.fetch(year))
      .unwrap_or_default()
  }

  fn fetch(&self, year: i32) -> Result<ContributionCalendar, UpstreamError> {
    let (from, to) = year_bounds(year);
    let variables = json!({
      "username": self.config.username,
      "from": from,
      "to": to,
    });

    let body = self.api.graphql(CONTRIBUTIONS_QUERY, &variables)?;
    parse_calendar(&body)
  }
}

/// Inclusive UTC bounds of a calendar year as GraphQL `DateTime` strings.
pub fn year_bounds(year: i32) -> (String, String) {
  (format!("{}-01-01T00:00:00Z", year), format!("{}-12-31T23:59:59Z", year))
}

/// Pull the calendar out of a GraphQL response body.
pub fn parse_calendar(body: &Value) -> Result<ContributionCalendar, UpstreamError> {
  let cal = body
    .fetch(CALENDAR_PATH)
    .value()
    .ok_or_else(|| UpstreamError::MissingField(CALENDAR_PATH.into()))?;

  let weeks = cal
    .fetch("weeks")
    .to::<Vec<Value>>()
    .unwrap_or_default()
    .iter()
    .map(|w| Week {
      days: w
        .fetch("contributionDays")
        .to::<Vec<Value>>()
        .unwrap_or_default()
        .iter()
        .map(|d| ContributionDay {
          date: d.fetch("date").to_or_default::<String>(),
          count: d.fetch("contributionCount").to_or_default::<u64>(),
        })
        .collect(),
    })
    .collect();

  Ok(ContributionCalendar {
    total_contributions: cal.fetch("totalContributions").to_or_default::<u64>(),
    weeks,
  })
}
