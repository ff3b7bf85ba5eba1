//! Aggregation of GitHub activity into a [`StatsRecord`]
//!
//! The year-scoped calendar queries run concurrently with the profile query;
//! everything after the fetch is pure and works on owned data.

use crate::source::StatsSource;
use crate::{
    ActivityCalendar, ActivityDay, LanguageSize, MonthlyBucket, RepositorySummary, StatsError,
    StatsRecord, UserProfile,
};
use chrono::{Datelike, Local, NaiveDate};
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Number of calendar years fetched for the monthly rollup, current year included.
pub const YEARS_OF_HISTORY: i32 = 5;

/// Number of trailing months in the rollup, current month included.
pub const MONTHS_OF_HISTORY: i32 = 60;

/// Aggregate statistics for `username` relative to today's local date.
pub async fn aggregate<S: StatsSource>(
    source: &S,
    username: &str,
) -> Result<StatsRecord, StatsError> {
    aggregate_at(source, username, Local::now().date_naive()).await
}

/// Aggregate statistics for `username`, with `today` anchoring the year and
/// month windows.
pub async fn aggregate_at<S: StatsSource>(
    source: &S,
    username: &str,
    today: NaiveDate,
) -> Result<StatsRecord, StatsError> {
    let username = validate_username(username)?;
    let current_year = today.year();

    debug!(username, current_year, "aggregating GitHub statistics");

    let yearly = try_join_all(
        (0..YEARS_OF_HISTORY).map(|offset| source.year_calendar(username, current_year - offset)),
    );
    let (calendars, profile) = tokio::try_join!(yearly, source.profile(username))?;

    let days = flatten_days(&calendars);
    debug!(username, days = days.len(), "merged yearly calendars");

    let monthly_contributions = monthly_rollup(&days, today);
    Ok(build_record(profile, monthly_contributions))
}

/// Trim the login and reject it when nothing is left.
pub fn validate_username(username: &str) -> Result<&str, StatsError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(StatsError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Flatten several calendars into one list of days.
pub fn flatten_days(calendars: &[ActivityCalendar]) -> Vec<ActivityDay> {
    calendars
        .iter()
        .flat_map(|calendar| calendar.days().copied())
        .collect()
}

/// `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Keys of the trailing [`MONTHS_OF_HISTORY`] months ending at `today`'s month,
/// oldest first.
pub fn month_window(today: NaiveDate) -> Vec<String> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..MONTHS_OF_HISTORY)
        .rev()
        .map(|offset| {
            let index = current - offset;
            format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
        })
        .collect()
}

/// Sum day counts into the monthly window; days outside it are dropped.
pub fn monthly_rollup<'a, I>(days: I, today: NaiveDate) -> Vec<MonthlyBucket>
where
    I: IntoIterator<Item = &'a ActivityDay>,
{
    let mut buckets: Vec<MonthlyBucket> = month_window(today)
        .into_iter()
        .map(|month| MonthlyBucket { month, count: 0 })
        .collect();

    let index: HashMap<String, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| (bucket.month.clone(), i))
        .collect();

    for day in days {
        if let Some(&i) = index.get(&month_key(day.date)) {
            buckets[i].count += u64::from(day.count);
        }
    }

    buckets
}

/// Longest run of consecutive zero-count days, a trailing run included.
pub fn longest_zero_streak<'a, I>(days: I) -> u32
where
    I: IntoIterator<Item = &'a ActivityDay>,
{
    let mut longest = 0;
    let mut current = 0;

    for day in days {
        if day.count == 0 {
            current += 1;
        } else {
            longest = longest.max(current);
            current = 0;
        }
    }

    longest.max(current)
}

/// Bytes per language summed across repositories, largest first.
///
/// The sort is stable, so equal sizes keep first-encounter order.
pub fn rank_languages(repositories: &[RepositorySummary]) -> Vec<LanguageSize> {
    let mut ranked: Vec<LanguageSize> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for repo in repositories {
        for language in &repo.languages {
            match index.get(language.name.as_str()) {
                Some(&i) => ranked[i].size += language.size,
                None => {
                    index.insert(language.name.as_str(), ranked.len());
                    ranked.push(language.clone());
                }
            }
        }
    }

    ranked.sort_by(|a, b| b.size.cmp(&a.size));
    ranked
}

/// Every topic used by any repository, once, in first-seen order.
pub fn collect_topics(repositories: &[RepositorySummary]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut topics = Vec::new();

    for topic in repositories.iter().flat_map(|repo| repo.topics.iter()) {
        if seen.insert(topic.as_str()) {
            topics.push(topic.clone());
        }
    }

    topics
}

/// Totals over the fetched page of repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryTotals {
    pub stars: u64,
    pub public: u64,
    pub private: u64,
    pub disk_usage_kb: u64,
}

pub fn summarize_repositories(repositories: &[RepositorySummary]) -> RepositoryTotals {
    repositories
        .iter()
        .fold(RepositoryTotals::default(), |mut totals, repo| {
            totals.stars += repo.star_count;
            totals.disk_usage_kb += repo.disk_usage_kb;
            if repo.is_private {
                totals.private += 1;
            } else {
                totals.public += 1;
            }
            totals
        })
}

/// Assemble the final record from the profile and a precomputed rollup.
pub fn build_record(profile: UserProfile, monthly_contributions: Vec<MonthlyBucket>) -> StatsRecord {
    let totals = summarize_repositories(&profile.repositories);
    let languages = rank_languages(&profile.repositories);
    let topics = collect_topics(&profile.repositories);
    let longest_zero_activity_streak = longest_zero_streak(profile.calendar.days());

    StatsRecord {
        display_name: profile.display_name,
        total_commits: profile.total_commits,
        total_repository_contributions: profile.total_repository_contributions,
        total_pull_request_contributions: profile.total_pull_request_contributions,
        total_issue_contributions: profile.total_issue_contributions,
        total_repo_count: profile.total_repo_count,
        total_stars: totals.stars,
        total_pull_requests: profile.total_pull_requests,
        total_issues: profile.total_issues,
        public_repo_count: totals.public,
        private_repo_count: totals.private,
        total_repo_size_kb: totals.disk_usage_kb,
        languages,
        topics,
        longest_zero_activity_streak,
        activity_calendar: profile.calendar,
        monthly_contributions,
    }
}
