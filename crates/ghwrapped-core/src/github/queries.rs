//! GraphQL documents and the response shapes they decode into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    ActivityCalendar, ActivityDay, ActivityWeek, LanguageSize, RepositorySummary, UserProfile,
};

pub const YEAR_CALENDAR_QUERY: &str = r#"
query YearCalendar($username: String!, $from: DateTime!, $to: DateTime!) {
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
}
"#;

pub const PROFILE_QUERY: &str = r#"
query UserProfile($username: String!) {
  user(login: $username) {
    name
    contributionsCollection {
      totalCommitContributions
      totalRepositoryContributions
      totalPullRequestContributions
      totalIssueContributions
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
    repositories(first: 100, isFork: false, ownerAffiliations: OWNER) {
      totalCount
      nodes {
        name
        stargazerCount
        forkCount
        isPrivate
        languages(first: 10) {
          edges {
            size
            node {
              name
            }
          }
        }
        repositoryTopics(first: 10) {
          nodes {
            topic {
              name
            }
          }
        }
        diskUsage
      }
    }
    pullRequests(first: 100) {
      totalCount
    }
    issues(first: 100) {
      totalCount
    }
  }
}
"#;

#[derive(Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Serialize)]
pub struct UserVariables<'a> {
    pub username: &'a str,
}

#[derive(Serialize)]
pub struct YearVariables<'a> {
    pub username: &'a str,
    pub from: String,
    pub to: String,
}

impl<'a> YearVariables<'a> {
    /// Whole calendar year in ISO-8601 UTC.
    pub fn for_year(username: &'a str, year: i32) -> Self {
        Self {
            username,
            from: format!("{:04}-01-01T00:00:00Z", year),
            to: format!("{:04}-12-31T23:59:59Z", year),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: Option<T>,
}

// Year calendar query

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearUser {
    pub contributions_collection: YearCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCollection {
    pub contribution_calendar: CalendarNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarNode {
    pub total_contributions: u64,
    pub weeks: Vec<WeekNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekNode {
    pub contribution_days: Vec<DayNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayNode {
    pub contribution_count: u32,
    pub date: NaiveDate,
}

impl From<CalendarNode> for ActivityCalendar {
    fn from(node: CalendarNode) -> Self {
        Self {
            total_contributions: node.total_contributions,
            weeks: node
                .weeks
                .into_iter()
                .map(|week| ActivityWeek {
                    days: week
                        .contribution_days
                        .into_iter()
                        .map(|day| ActivityDay::new(day.date, day.contribution_count))
                        .collect(),
                })
                .collect(),
        }
    }
}

// Profile query

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub name: Option<String>,
    pub contributions_collection: ProfileCollection,
    pub repositories: RepositoryConnection,
    pub pull_requests: CountNode,
    pub issues: CountNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCollection {
    pub total_commit_contributions: u64,
    pub total_repository_contributions: u64,
    pub total_pull_request_contributions: u64,
    pub total_issue_contributions: u64,
    pub contribution_calendar: CalendarNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConnection {
    pub total_count: u64,
    #[serde(default)]
    pub nodes: Vec<Option<RepositoryNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub is_private: bool,
    pub languages: Option<LanguageConnection>,
    pub repository_topics: TopicConnection,
    pub disk_usage: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageConnection {
    #[serde(default)]
    pub edges: Vec<Option<LanguageEdge>>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageEdge {
    pub size: u64,
    pub node: NameNode,
}

#[derive(Debug, Deserialize)]
pub struct TopicConnection {
    #[serde(default)]
    pub nodes: Vec<Option<TopicNode>>,
}

#[derive(Debug, Deserialize)]
pub struct TopicNode {
    pub topic: NameNode,
}

#[derive(Debug, Deserialize)]
pub struct NameNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountNode {
    pub total_count: u64,
}

impl From<RepositoryNode> for RepositorySummary {
    fn from(node: RepositoryNode) -> Self {
        Self {
            name: node.name,
            star_count: node.stargazer_count,
            fork_count: node.fork_count,
            is_private: node.is_private,
            languages: node
                .languages
                .map(|conn| {
                    conn.edges
                        .into_iter()
                        .flatten()
                        .map(|edge| LanguageSize::new(edge.node.name, edge.size))
                        .collect()
                })
                .unwrap_or_default(),
            topics: node
                .repository_topics
                .nodes
                .into_iter()
                .flatten()
                .map(|node| node.topic.name)
                .collect(),
            disk_usage_kb: node.disk_usage.unwrap_or(0),
        }
    }
}

impl ProfileUser {
    /// `login` stands in for the display name when the profile has none.
    pub fn into_profile(self, login: &str) -> UserProfile {
        let collection = self.contributions_collection;
        UserProfile {
            display_name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| login.to_string()),
            total_commits: collection.total_commit_contributions,
            total_repository_contributions: collection.total_repository_contributions,
            total_pull_request_contributions: collection.total_pull_request_contributions,
            total_issue_contributions: collection.total_issue_contributions,
            calendar: collection.contribution_calendar.into(),
            total_repo_count: self.repositories.total_count,
            repositories: self
                .repositories
                .nodes
                .into_iter()
                .flatten()
                .map(RepositorySummary::from)
                .collect(),
            total_pull_requests: self.pull_requests.total_count,
            total_issues: self.issues.total_count,
        }
    }
}
