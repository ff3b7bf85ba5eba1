#![deny(clippy::all)]

mod aggregator;
pub mod cache;
pub mod config;
mod error;
pub mod github;
mod insights;
mod source;
pub mod state;

pub use aggregator::*;
pub use cache::StatsCache;
pub use config::ClientConfig;
pub use error::StatsError;
pub use github::GitHubClient;
pub use insights::{Insights, LanguageShare};
pub use source::StatsSource;
pub use state::FetchState;

use chrono::NaiveDate;
use serde::Serialize;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Contributions recorded on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
}

impl ActivityDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

/// One column of the contribution calendar, oldest day first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityWeek {
    pub days: Vec<ActivityDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCalendar {
    pub total_contributions: u64,
    pub weeks: Vec<ActivityWeek>,
}

impl ActivityCalendar {
    /// All days of the calendar in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &ActivityDay> + '_ {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }

    pub fn day_count(&self) -> usize {
        self.weeks.iter().map(|week| week.days.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSize {
    pub name: String,
    pub size: u64,
}

impl LanguageSize {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    pub star_count: u64,
    pub fork_count: u64,
    pub is_private: bool,
    pub languages: Vec<LanguageSize>,
    pub topics: Vec<String>,
    pub disk_usage_kb: u64,
}

/// Contribution total for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub count: u64,
}

/// Everything the unscoped profile query returns, decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: String,
    pub total_commits: u64,
    pub total_repository_contributions: u64,
    pub total_pull_request_contributions: u64,
    pub total_issue_contributions: u64,
    pub calendar: ActivityCalendar,
    /// Owned non-fork repositories, which may exceed `repositories.len()`.
    pub total_repo_count: u64,
    pub repositories: Vec<RepositorySummary>,
    pub total_pull_requests: u64,
    pub total_issues: u64,
}

/// The aggregated statistics handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub display_name: String,
    pub total_commits: u64,
    pub total_repository_contributions: u64,
    /// Pull requests opened over the last year of the profile calendar.
    pub total_pull_request_contributions: u64,
    pub total_issue_contributions: u64,
    pub total_repo_count: u64,
    pub total_stars: u64,
    pub total_pull_requests: u64,
    pub total_issues: u64,
    pub public_repo_count: u64,
    pub private_repo_count: u64,
    pub total_repo_size_kb: u64,
    pub languages: Vec<LanguageSize>,
    pub topics: Vec<String>,
    pub longest_zero_activity_streak: u32,
    pub activity_calendar: ActivityCalendar,
    pub monthly_contributions: Vec<MonthlyBucket>,
}
