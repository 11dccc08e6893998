use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use gh_activity_feed::config::FeedConfig;
use gh_activity_feed::error::ConfigError;
use gh_activity_feed::github::api::{env_wants_mock, get_github_token};
use gh_activity_feed::timeline::Period;
use gh_activity_feed::util::parse_utc;

#[derive(Parser, Debug)]
#[command(
    name = "gh-activity-feed",
    version,
    about = "Cached GitHub activity feed as JSON (repositories, contribution calendar, merged timeline)",
    long_about = None
)]
pub struct Cli {
  /// GitHub account to report on
  #[arg(long, env = "GITHUB_USERNAME", global = true)]
  pub username: Option<String>,

  /// API token (default: GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
  #[arg(long, global = true)]
  pub token: Option<String>,

  /// REST base URL; GraphQL is served from `{base}/graphql`
  #[arg(long, env = "GITHUB_API_BASE", global = true)]
  pub api_base: Option<String>,

  /// Persist the cache as JSON files in this directory (default: in-memory for this run)
  #[arg(long, global = true)]
  pub cache_dir: Option<PathBuf>,

  /// Push-burst window in minutes (inclusive)
  #[arg(long, global = true, value_parser = clap::value_parser!(i64).range(0..))]
  pub merge_window_minutes: Option<i64>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Owned repositories, normalized
  Repos {
    /// Bypass the cache and go straight upstream
    #[arg(long)]
    fresh: bool,
  },

  /// Totals over the repository listing
  Stats,

  /// Contribution calendar for a year (default: current year)
  Calendar {
    #[arg(long)]
    year: Option<i32>,
  },

  /// Recent activity: current month of the selected year, push bursts merged
  Activity {
    #[arg(long, default_value_t = 100)]
    limit: u32,

    #[arg(long)]
    year: Option<i32>,

    /// Whole history instead of the default period
    #[arg(long)]
    all: bool,

    /// Normalized records as fetched: no period filter, no merging
    #[arg(long)]
    raw: bool,

    /// Group the output under "{Month} {Year}" labels
    #[arg(long)]
    by_month: bool,

    /// Override the "now" instant (hidden; tests only)
    #[arg(long = "now-override", hide = true)]
    now_override: Option<String>,
  },

  /// Latest commits on one of the account's repositories
  Commits {
    repo: String,

    #[arg(long, default_value_t = 10)]
    limit: u32,
  },

  /// Repositories, stats, calendar and timeline in one document
  Dashboard {
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, default_value_t = 100)]
    limit: u32,

    #[arg(long)]
    all: bool,

    /// Override the "now" instant (hidden; tests only)
    #[arg(long = "now-override", hide = true)]
    now_override: Option<String>,
  },
}

/// What a run will do once flags, env, and defaults are settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
  Repos { use_cache: bool },
  Stats,
  Calendar { year: i32 },
  Activity { limit: u32, scope: ActivityScope, by_month: bool },
  Commits { repo: String, limit: u32 },
  Dashboard { year: i32, limit: u32, period: Period },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityScope {
  Raw,
  Period(Period),
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  pub feed: FeedConfig,
  pub cache_dir: Option<PathBuf>,
  pub operation: Operation,
}

fn resolve_now(now_override: Option<&str>) -> Result<DateTime<Utc>> {
  match now_override {
    Some(raw) => parse_utc(raw).with_context(|| format!("--now-override is not an RFC3339 timestamp: {}", raw)),
    None => Ok(Utc::now()),
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(command) = cli.command else {
    bail!("Provide a subcommand: repos | stats | calendar | activity | commits | dashboard")
  };

  let username = cli
    .username
    .filter(|u| !u.trim().is_empty())
    .ok_or(ConfigError::MissingUsername)?;

  let mut feed = FeedConfig::new(username.trim());

  if let Some(base) = cli.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
    feed = feed.with_api_base(base);
  }

  // fixture runs never shell out to `gh`
  let token = cli.token.or_else(|| if env_wants_mock() { None } else { get_github_token() });
  feed = feed.with_token(token);

  if let Some(w) = cli.merge_window_minutes {
    feed.merge_window_minutes = w;
  }

  let operation = match command {
    Command::Repos { fresh } => Operation::Repos { use_cache: !fresh },
    Command::Stats => Operation::Stats,
    Command::Calendar { year } => Operation::Calendar {
      year: year.unwrap_or_else(|| Utc::now().year()),
    },
    Command::Activity {
      limit,
      year,
      all,
      raw,
      by_month,
      now_override,
    } => {
      let now = resolve_now(now_override.as_deref())?;
      let scope = if raw {
        ActivityScope::Raw
      } else {
        ActivityScope::Period(Period::for_selection(year, all, now))
      };

      Operation::Activity { limit, scope, by_month }
    }
    Command::Commits { repo, limit } => Operation::Commits { repo, limit },
    Command::Dashboard {
      year,
      limit,
      all,
      now_override,
    } => {
      let now = resolve_now(now_override.as_deref())?;

      Operation::Dashboard {
        year: year.unwrap_or_else(|| now.year()),
        limit,
        period: Period::for_selection(year, all, now),
      }
    }
  };

  Ok(EffectiveConfig {
    feed,
    cache_dir: cli.cache_dir,
    operation,
  })
}
