//! GitHub GraphQL client.

pub mod queries;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::source::StatsSource;
use crate::{ActivityCalendar, StatsError, UserProfile};
use queries::{
    GraphQlRequest, GraphQlResponse, ProfileUser, UserEnvelope, UserVariables, YearUser,
    YearVariables, PROFILE_QUERY, YEAR_CALENDAR_QUERY,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("ghwrapped/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GitHubClient {
    pub fn new(config: &ClientConfig) -> Result<Self, StatsError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                StatsError::Config("token contains characters not allowed in a header".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StatsError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn execute<V, T>(
        &self,
        operation: &str,
        username: &str,
        query: &str,
        variables: V,
    ) -> Result<T, StatsError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(operation, username, endpoint = %self.endpoint, "sending GraphQL query");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| remote_error(operation, format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let _ = response.bytes().await;
            return Err(remote_error(operation, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| remote_error(operation, format!("failed to read response: {}", e)))?;

        decode_user(&body, username).map_err(|message| remote_error(operation, message))
    }
}

impl StatsSource for GitHubClient {
    async fn year_calendar(
        &self,
        username: &str,
        year: i32,
    ) -> Result<ActivityCalendar, StatsError> {
        let user: YearUser = self
            .execute(
                "year_calendar",
                username,
                YEAR_CALENDAR_QUERY,
                YearVariables::for_year(username, year),
            )
            .await?;
        Ok(user.contributions_collection.contribution_calendar.into())
    }

    async fn profile(&self, username: &str) -> Result<UserProfile, StatsError> {
        let user: ProfileUser = self
            .execute("profile", username, PROFILE_QUERY, UserVariables { username })
            .await?;
        Ok(user.into_profile(username))
    }
}

fn remote_error(operation: &str, message: String) -> StatsError {
    warn!(operation, "GitHub query failed: {}", message);
    StatsError::RemoteQuery(message)
}

/// Decode a GraphQL response body down to its `data.user` object.
pub fn decode_user<T: DeserializeOwned>(body: &str, username: &str) -> Result<T, String> {
    let response: GraphQlResponse<UserEnvelope<T>> =
        serde_json::from_str(body).map_err(|e| format!("malformed response: {}", e))?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect();
        return Err(messages.join("; "));
    }

    response
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| format!("user '{}' not found", username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate_at;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const YEAR_BODY: &str = r#"{
        "data": {
            "user": {
                "contributionsCollection": {
                    "contributionCalendar": {
                        "totalContributions": 5,
                        "weeks": [
                            { "contributionDays": [
                                { "contributionCount": 0, "date": "2024-01-06" }
                            ] },
                            { "contributionDays": [
                                { "contributionCount": 2, "date": "2024-01-07" },
                                { "contributionCount": 3, "date": "2024-01-08" }
                            ] }
                        ]
                    }
                }
            }
        }
    }"#;

    const PROFILE_BODY: &str = r#"{
        "data": {
            "user": {
                "name": null,
                "contributionsCollection": {
                    "totalCommitContributions": 120,
                    "totalRepositoryContributions": 4,
                    "totalPullRequestContributions": 8,
                    "totalIssueContributions": 2,
                    "contributionCalendar": { "totalContributions": 0, "weeks": [] }
                },
                "repositories": {
                    "totalCount": 2,
                    "nodes": [
                        {
                            "name": "dotfiles",
                            "stargazerCount": 3,
                            "forkCount": 1,
                            "isPrivate": false,
                            "languages": { "edges": [
                                { "size": 1200, "node": { "name": "Shell" } },
                                { "size": 300, "node": { "name": "Lua" } }
                            ] },
                            "repositoryTopics": { "nodes": [
                                { "topic": { "name": "dotfiles" } }
                            ] },
                            "diskUsage": 88
                        },
                        {
                            "name": "secret",
                            "stargazerCount": 0,
                            "forkCount": 0,
                            "isPrivate": true,
                            "languages": null,
                            "repositoryTopics": { "nodes": [] },
                            "diskUsage": null
                        }
                    ]
                },
                "pullRequests": { "totalCount": 31 },
                "issues": { "totalCount": 7 }
            }
        }
    }"#;

    #[test]
    fn test_decode_year_calendar() {
        let user: YearUser = decode_user(YEAR_BODY, "alice").unwrap();
        let calendar: ActivityCalendar = user.contributions_collection.contribution_calendar.into();
        assert_eq!(calendar.total_contributions, 5);
        assert_eq!(calendar.weeks.len(), 2);
        assert_eq!(calendar.day_count(), 3);
        let last = calendar.days().last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(last.count, 3);
    }

    #[test]
    fn test_decode_profile_handles_nullable_fields() {
        let user: ProfileUser = decode_user(PROFILE_BODY, "octo").unwrap();
        let profile = user.into_profile("octo");

        assert_eq!(profile.display_name, "octo");
        assert_eq!(profile.total_commits, 120);
        assert_eq!(profile.total_repo_count, 2);
        assert_eq!(profile.total_pull_requests, 31);
        assert_eq!(profile.total_issues, 7);
        assert_eq!(profile.repositories.len(), 2);

        let dotfiles = &profile.repositories[0];
        assert_eq!(dotfiles.languages.len(), 2);
        assert_eq!(dotfiles.topics, vec!["dotfiles"]);
        assert_eq!(dotfiles.disk_usage_kb, 88);

        let secret = &profile.repositories[1];
        assert!(secret.is_private);
        assert!(secret.languages.is_empty());
        assert_eq!(secret.disk_usage_kb, 0);
    }

    #[test]
    fn test_decode_reports_graphql_errors() {
        let body = r#"{
            "data": { "user": null },
            "errors": [
                { "type": "NOT_FOUND", "message": "Could not resolve to a User with the login of 'ghost'." },
                { "message": "second" }
            ]
        }"#;
        let err = decode_user::<YearUser>(body, "ghost").unwrap_err();
        assert_eq!(
            err,
            "Could not resolve to a User with the login of 'ghost'.; second"
        );
    }

    #[test]
    fn test_decode_null_user_is_not_found() {
        let err = decode_user::<YearUser>(r#"{ "data": { "user": null } }"#, "ghost").unwrap_err();
        assert_eq!(err, "user 'ghost' not found");

        let err = decode_user::<YearUser>(r#"{ "data": null }"#, "ghost").unwrap_err();
        assert_eq!(err, "user 'ghost' not found");
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_user::<YearUser>("<html>rate limited</html>", "alice").unwrap_err();
        assert!(err.starts_with("malformed response"));
    }

    #[test]
    fn test_year_variables_cover_whole_year() {
        let vars = YearVariables::for_year("alice", 2023);
        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["from"], "2023-01-01T00:00:00Z");
        assert_eq!(json["to"], "2023-12-31T23:59:59Z");
    }

    #[test]
    fn test_client_rejects_token_with_newline() {
        let config = ClientConfig {
            token: Some("abc\ndef".to_string()),
            ..ClientConfig::default()
        };
        let err = GitHubClient::new(&config).err().unwrap();
        assert!(matches!(err, StatsError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        let config = ClientConfig {
            endpoint: "http://127.0.0.1:9/graphql".to_string(),
            ..ClientConfig::default()
        };
        let client = GitHubClient::new(&config).unwrap();
        let err = client.profile("alice").await.unwrap_err();
        assert!(err.is_remote(), "{:?}", err);
    }

    // ── Canned GraphQL server ──────────────────────────────────────────────

    type Responder = fn(&str) -> (&'static str, String);

    struct CannedServer {
        endpoint: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    /// Answer every connection with `respond(raw_request)` and record the request.
    async fn serve(respond: Responder) -> CannedServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    let request = read_request(&mut stream).await;
                    let (status, body) = respond(&request);
                    captured.lock().unwrap().push(request);

                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        CannedServer { endpoint, requests }
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn requested_year(request: &str) -> Option<i32> {
        let start = request.find("\"from\":\"")? + "\"from\":\"".len();
        request.get(start..start + 4)?.parse().ok()
    }

    /// One day on June 1st whose count is the year's offset from 2019.
    fn year_body(year: i32) -> String {
        let count = year - 2019;
        serde_json::json!({
            "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                "totalContributions": count,
                "weeks": [{ "contributionDays": [
                    { "contributionCount": count, "date": format!("{}-06-01", year) }
                ] }]
            } } } }
        })
        .to_string()
    }

    fn github_like(request: &str) -> (&'static str, String) {
        match requested_year(request) {
            Some(year) => ("200 OK", year_body(year)),
            None => ("200 OK", PROFILE_BODY.to_string()),
        }
    }

    fn bad_gateway(_request: &str) -> (&'static str, String) {
        ("502 Bad Gateway", "{}".to_string())
    }

    fn client_for(server: &CannedServer, token: Option<&str>) -> GitHubClient {
        let config = ClientConfig {
            endpoint: server.endpoint.clone(),
            token: token.map(str::to_string),
            ..ClientConfig::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_http_error_status_is_remote_error() {
        let server = serve(bad_gateway).await;
        let client = client_for(&server, None);

        let err = client.profile("alice").await.unwrap_err();
        assert!(err.is_remote(), "{:?}", err);
        assert!(err.to_string().contains("HTTP 502"), "{}", err);

        let err = aggregate_at(&client, "alice", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_remote(), "{:?}", err);
    }

    #[tokio::test]
    async fn test_requests_carry_auth_and_user_agent() {
        let server = serve(github_like).await;
        let client = client_for(&server, Some("test-token"));

        let calendar = client.year_calendar("alice", 2022).await.unwrap();
        assert_eq!(calendar.total_contributions, 3);
        let day = calendar.days().next().unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2022, 6, 1).unwrap());

        let requests = server.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let raw = &requests[0];
        let lower = raw.to_ascii_lowercase();
        assert!(lower.starts_with("post /graphql http/1.1"), "{}", raw);
        assert!(lower.contains("authorization: bearer test-token"), "{}", raw);
        assert!(lower.contains("user-agent: ghwrapped/"), "{}", raw);
        assert!(lower.contains("content-type: application/json"), "{}", raw);
        assert!(raw.contains("\"username\":\"alice\""), "{}", raw);
        assert!(raw.contains("2022-01-01T00:00:00Z"), "{}", raw);
    }

    #[tokio::test]
    async fn test_anonymous_client_sends_no_authorization() {
        let server = serve(github_like).await;
        let client = client_for(&server, None);

        client.profile("alice").await.unwrap();

        let requests = server.requests.lock().unwrap();
        assert!(!requests[0].to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_aggregate_over_http_builds_record() {
        let server = serve(github_like).await;
        let client = client_for(&server, Some("test-token"));

        let record = aggregate_at(&client, "alice", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
            .await
            .unwrap();

        assert_eq!(server.requests.lock().unwrap().len(), 6);

        assert_eq!(record.display_name, "alice");
        assert_eq!(record.total_commits, 120);
        assert_eq!(record.total_repository_contributions, 4);
        assert_eq!(record.total_pull_request_contributions, 8);
        assert_eq!(record.total_issue_contributions, 2);
        assert_eq!(record.total_repo_count, 2);
        assert_eq!(record.total_stars, 3);
        assert_eq!(record.public_repo_count, 1);
        assert_eq!(record.private_repo_count, 1);
        assert_eq!(record.total_repo_size_kb, 88);
        assert_eq!(record.total_pull_requests, 31);
        assert_eq!(record.total_issues, 7);
        assert_eq!(record.languages[0], crate::LanguageSize::new("Shell", 1200));
        assert_eq!(record.topics, vec!["dotfiles"]);

        let monthly = &record.monthly_contributions;
        assert_eq!(monthly.len(), 60);
        assert_eq!(monthly[0].month, "2020-01");
        for year in 2020..=2024 {
            let june = monthly
                .iter()
                .find(|bucket| bucket.month == format!("{}-06", year))
                .unwrap();
            assert_eq!(june.count, (year - 2019) as u64);
        }
        assert_eq!(monthly.iter().map(|b| b.count).sum::<u64>(), 15);
    }
}
