//! Blocking GitHub REST client for issue creation.
//!
//! One endpoint: `POST /repos/{owner}/{repo}/issues`. Requests are paced by
//! sleeping after each successful creation to stay under the secondary rate
//! limiter; a 403 that carries `Retry-After` sleeps for the advertised
//! interval and retries the same issue. Any other non-201 response is an
//! error that aborts the migration.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{MigrateError, Result};
use crate::record::IssueRequest;

/// Media type pinning the issues endpoint to API v3.
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// A created issue as reported by the API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

/// Client for the destination repository's issues endpoint.
#[derive(Debug)]
pub struct GithubClient {
    client: Client,
    url: String,
    token: String,
    pace: Duration,
}

impl GithubClient {
    /// Build a client for `owner/repo` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(owner: &str, repo: &str, token: &str, pace: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mantis2github/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: format!("https://api.github.com/repos/{owner}/{repo}/issues"),
            token: token.to_string(),
            pace,
        })
    }

    /// Create one issue, retrying through rate-limit responses.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or on any response other than
    /// 201 Created and retryable 403s.
    pub fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue> {
        loop {
            let response = self
                .client
                .post(&self.url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .header(ACCEPT, ACCEPT_V3)
                .json(request)
                .send()?;

            let status = response.status();
            if status == StatusCode::CREATED {
                let created: CreatedIssue = response.json()?;
                debug!(number = created.number, "issue created");
                thread::sleep(self.pace);
                return Ok(created);
            }

            if status == StatusCode::FORBIDDEN {
                if let Some(wait) = retry_after(response.headers()) {
                    warn!(
                        seconds = wait.as_secs(),
                        "hit the rate limiter, retrying after the advertised delay"
                    );
                    thread::sleep(wait);
                    continue;
                }
            }

            let message = response.text().unwrap_or_default();
            return Err(MigrateError::Github {
                status: status.as_u16(),
                message,
            });
        }
    }
}

/// Parse a `Retry-After` header into a sleep interval.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
