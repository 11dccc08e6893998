use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use gh_activity_feed::cache::{CacheStore, FileCache, MemoryCache};
use gh_activity_feed::feed::ActivityFeed;
use gh_activity_feed::github::api::build_api;
use gh_activity_feed::timeline::group_by_month;
use gh_activity_feed::util;

mod cli;

use crate::cli::{normalize, ActivityScope, Cli, EffectiveConfig, Operation};

fn main() -> Result<()> {
  // stdout carries the JSON document; logs go to stderr
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: wire the feed
  let feed = build_feed(&cfg)?;

  // Phase 3: run and print
  let doc = run(&feed, &cfg.operation)?;
  println!("{}", serde_json::to_string_pretty(&doc)?);

  Ok(())
}

fn build_feed(cfg: &EffectiveConfig) -> Result<ActivityFeed> {
  let cache: Arc<dyn CacheStore> = match &cfg.cache_dir {
    Some(dir) => {
      std::fs::create_dir_all(dir).with_context(|| format!("creating cache dir {}", dir.display()))?;
      Arc::new(FileCache::new(dir))
    }
    None => Arc::new(MemoryCache::new()),
  };

  Ok(ActivityFeed::new(cfg.feed.clone(), Arc::from(build_api(&cfg.feed)), cache))
}

fn run(feed: &ActivityFeed, op: &Operation) -> Result<Value> {
  let doc = match op {
    Operation::Repos { use_cache } => serde_json::to_value(feed.list_repositories(*use_cache))?,
    Operation::Stats => serde_json::to_value(feed.repository_stats())?,
    Operation::Calendar { year } => serde_json::to_value(feed.contributions_for_year(*year))?,
    Operation::Activity { limit, scope, by_month } => {
      let records = match scope {
        ActivityScope::Raw => feed.recent_activity(*limit),
        ActivityScope::Period(period) => feed.timeline(*limit, *period),
      };

      if *by_month {
        serde_json::to_value(group_by_month(records))?
      } else {
        serde_json::to_value(records)?
      }
    }
    Operation::Commits { repo, limit } => serde_json::to_value(feed.recent_commits(repo, *limit))?,
    Operation::Dashboard { year, limit, period } => serde_json::to_value(feed.dashboard(*year, *limit, *period))?,
  };

  Ok(doc)
}
