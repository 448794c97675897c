//! Jira REST client used by the QA reports.
//!
//! Authenticates with basic auth (account email + API token) and talks to
//! the v3 REST API:
//! - `GET /rest/api/3/search/jql` for JQL searches, following `nextPageToken`
//!   until `max_results` issues are collected or the page is marked `isLast`
//! - `GET /rest/api/3/project` for the project list

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::contract::{IssueTracker, QaError};

/// Issues requested per search page.
const SEARCH_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraCredentials {
    pub server: String,
    pub email: String,
    pub token: String,
}

impl JiraCredentials {
    /// Builds credentials when all three parts are present and non-blank.
    pub fn from_parts(
        server: Option<String>,
        email: Option<String>,
        token: Option<String>,
    ) -> Result<Self, QaError> {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (non_blank(server), non_blank(email), non_blank(token)) {
            (Some(server), Some(email), Some(token)) => Ok(Self {
                server: server.trim().trim_end_matches('/').to_owned(),
                email,
                token,
            }),
            _ => Err(QaError::MissingCredentials),
        }
    }

    /// Browser link to an issue.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.server)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraProject {
    pub id: String,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    issues: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    is_last: bool,
}

pub struct JiraClient {
    client: Client,
    credentials: JiraCredentials,
}

impl JiraClient {
    pub fn new(credentials: JiraCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, QaError> {
        debug!(url = %url, "Calling Jira API");
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = %status, url = %url, "Jira API returned error");
            return Err(QaError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn search_issues(
        &self,
        jql: &str,
        fields: &[String],
        max_results: usize,
    ) -> Result<Vec<Value>, QaError> {
        let url = format!("{}/rest/api/3/search/jql", self.credentials.server);
        info!(jql = %jql, max_results, "Searching Jira issues");

        let mut issues: Vec<Value> = Vec::new();
        let mut next_page_token: Option<String> = None;
        'pages: loop {
            let remaining = max_results.saturating_sub(issues.len());
            if remaining == 0 {
                break 'pages;
            }
            let page_size = remaining.min(SEARCH_PAGE_SIZE);
            let mut query = vec![
                ("jql", jql.to_owned()),
                ("fields", fields.join(",")),
                ("maxResults", page_size.to_string()),
            ];
            if let Some(token) = next_page_token.take() {
                query.push(("nextPageToken", token));
            }
            let json = self.get_json(&url, &query).await?;
            let page: SearchPage =
                serde_json::from_value(json).map_err(|e| QaError::Parse(e.to_string()))?;
            let fetched = page.issues.len();
            issues.extend(page.issues);
            debug!(
                fetched,
                collected = issues.len(),
                is_last = page.is_last,
                "Fetched search page"
            );

            match page.next_page_token {
                Some(token) if !page.is_last && fetched > 0 => next_page_token = Some(token),
                _ => break 'pages,
            }
        }
        issues.truncate(max_results);
        info!(count = issues.len(), "Fetched Jira issues");
        Ok(issues)
    }

    async fn projects(&self) -> Result<Vec<JiraProject>, QaError> {
        let url = format!("{}/rest/api/3/project", self.credentials.server);
        let json = self.get_json(&url, &[]).await?;
        let projects: Vec<JiraProject> =
            serde_json::from_value(json).map_err(|e| QaError::Parse(e.to_string()))?;
        info!(count = projects.len(), "Fetched Jira projects");
        Ok(projects)
    }
}
