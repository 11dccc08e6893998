//! gh-activity-feed: a cached view over a GitHub account's public activity.
//!
//! The [`feed::ActivityFeed`] facade wires an upstream client, a TTL cache and a
//! [`config::FeedConfig`] together; everything else is reachable from there.

pub mod cache;
pub mod config;
pub mod error;
pub mod ext;
pub mod feed;
pub mod github;
pub mod merge;
pub mod model;
pub mod timeline;
pub mod util;

pub use cache::{CacheStore, FileCache, MemoryCache};
pub use config::FeedConfig;
pub use error::{ConfigError, UpstreamError};
pub use feed::{ActivityFeed, Dashboard};
pub use github::api::{build_api, GithubApi};
pub use model::{ActivityRecord, ContributionCalendar, EventKind, NormalizedRepo, RepoOpOutcome};
pub use timeline::Period;
