use std::future::Future;

use crate::{ActivityCalendar, StatsError, UserProfile};

/// Where the aggregator gets its raw data from.
///
/// [`crate::GitHubClient`] talks to the GraphQL API; tests plug in
/// in-memory sources.
pub trait StatsSource {
    /// Contribution calendar covering the whole calendar `year`.
    fn year_calendar(
        &self,
        username: &str,
        year: i32,
    ) -> impl Future<Output = Result<ActivityCalendar, StatsError>> + Send;

    /// Profile, contribution totals, default-range calendar and repositories.
    fn profile(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<UserProfile, StatsError>> + Send;
}
