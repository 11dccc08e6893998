// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Outward contract of the activity feed: wires upstream client, cache, and config into the read and lifecycle operations
// role: feed/facade
// inputs: FeedConfig, Arc<dyn GithubApi>, Arc<dyn CacheStore>
// outputs: Normalized repositories/stats, contribution calendars, activity records, merged timelines, RepoOpOutcome
// side_effects: Upstream HTTP via GithubApi; cache writes via CacheStore
// invariants:
// - Read operations never fail; "no data" is the empty default
// - Timelines filter to the period first, then merge bursts
// - Dashboard fetches touch disjoint cache keys and may run concurrently
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::FeedConfig;
use crate::github::api::GithubApi;
use crate::github::calendar::CalendarFetcher;
use crate::github::events::EventNormalizer;
use crate::github::repos::RepositoryFetcher;
use crate::merge::BurstMerger;
use crate::model::{ActivityRecord, ContributionCalendar, NormalizedRepo, RecentCommit, RepoOpOutcome, RepoStats};
use crate::timeline::{filter_for_period, Period};

/// Everything the profile page shows, fetched in one go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
  pub username: String,
  pub year: i32,
  pub period: Period,
  pub stats: RepoStats,
  pub repos: Vec<NormalizedRepo>,
  pub calendar: ContributionCalendar,
  pub activity: Vec<ActivityRecord>,
}

pub struct ActivityFeed {
  config: FeedConfig,
  api: Arc<dyn GithubApi>,
  cache: Arc<dyn CacheStore>,
}

impl ActivityFeed {
  pub fn new(config: FeedConfig, api: Arc<dyn GithubApi>, cache: Arc<dyn CacheStore>) -> Self {
    Self { config, api, cache }
  }

  fn repos(&self) -> RepositoryFetcher<'_> {
    RepositoryFetcher::new(self.api.as_ref(), self.cache.as_ref(), &self.config)
  }

  fn events(&self) -> EventNormalizer<'_> {
    EventNormalizer::new(self.api.as_ref(), self.cache.as_ref(), &self.config)
  }

  pub fn list_repositories(&self, use_cache: bool) -> Vec<NormalizedRepo> {
    self.repos().list(use_cache)
  }

  pub fn repository_stats(&self) -> RepoStats {
    RepoStats::from_repos(&self.list_repositories(true))
  }

  pub fn contributions_for_year(&self, year: i32) -> ContributionCalendar {
    CalendarFetcher::new(self.api.as_ref(), self.cache.as_ref(), &self.config).for_year(year)
  }

  pub fn recent_activity(&self, limit: u32) -> Vec<ActivityRecord> {
    self.events().recent(limit)
  }

  /// Burst-merge with the configured window. Not cached.
  pub fn merge_bursts(&self, records: &[ActivityRecord]) -> Vec<ActivityRecord> {
    BurstMerger::new(self.config.merge_window_minutes).merge(records)
  }

  /// Recent activity scoped to `period`, with push bursts collapsed.
  pub fn timeline(&self, limit: u32, period: Period) -> Vec<ActivityRecord> {
    let records = self.recent_activity(limit);
    let scoped = filter_for_period(&records, period);

    debug!(fetched = records.len(), in_period = scoped.len(), ?period, "timeline");

    self.merge_bursts(&scoped)
  }

  pub fn recent_commits(&self, repo: &str, limit: u32) -> Vec<RecentCommit> {
    self.repos().recent_commits(repo, limit)
  }

  pub fn create_repository(&self, name: &str, description: Option<&str>, private: bool, auto_init: bool) -> RepoOpOutcome {
    self.repos().create(name, description, private, auto_init)
  }

  pub fn repository_exists(&self, name: &str) -> bool {
    self.repos().exists(name)
  }

  pub fn update_repository(&self, name: &str, updates: &Map<String, Value>) -> RepoOpOutcome {
    self.repos().update(name, updates)
  }

  pub fn delete_repository(&self, name: &str) -> RepoOpOutcome {
    self.repos().delete(name)
  }

  pub fn archive_repository(&self, name: &str) -> RepoOpOutcome {
    self.repos().archive(name)
  }

  /// Repositories, the year's calendar and the period timeline, fetched concurrently.
  pub fn dashboard(&self, year: i32, limit: u32, period: Period) -> Dashboard {
    let (repos, (calendar, activity)) = rayon::join(
      || self.list_repositories(true),
      || rayon::join(|| self.contributions_for_year(year), || self.timeline(limit, period)),
    );

    Dashboard {
      username: self.config.username.clone(),
      year,
      period,
      stats: RepoStats::from_repos(&repos),
      repos,
      calendar,
      activity,
    }
  }
}
