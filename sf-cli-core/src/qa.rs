//! QA reports over Jira: project keys, project issues and sprint issues.
//!
//! Each report returns plain [`Table`]s; rendering is left to the caller.

use serde_json::Value;
use tracing::{debug, info};

use crate::contract::{IssueTracker, QaError};
use crate::jira::JiraCredentials;
use crate::table::{Row, Table};

/// Upper bound on issues fetched per report.
pub const MAX_ISSUES: usize = 1000;

pub const DEFAULT_ISSUE_FIELDS: &str = "key,summary,status,assignee";

const MISSING: &str = "-";

#[derive(Debug, Clone, Default)]
pub struct ProjectIssuesQuery {
    pub project_key: String,
    pub fields: String,
    pub status: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SprintIssuesQuery {
    pub project_key: String,
    pub sprint_name: String,
    pub status: Option<String>,
}

impl Default for SprintIssuesQuery {
    fn default() -> Self {
        Self {
            project_key: "CXP".to_owned(),
            sprint_name: "Sprint 1".to_owned(),
            status: None,
        }
    }
}

/// Issues table plus, when filtering by assignee, a per-status count.
#[derive(Debug, Clone)]
pub struct IssueReport {
    pub issues: Table,
    pub status_summary: Option<Table>,
}

/// Builds a JQL query from a project key and optional filters.
pub fn build_jql(
    project_key: &str,
    sprint_name: Option<&str>,
    status: Option<&str>,
    assignee: Option<&str>,
) -> String {
    let mut parts = vec![format!("project = {}", jql_string(project_key))];
    if let Some(sprint) = sprint_name.filter(|s| !s.is_empty()) {
        parts.push(format!("sprint = {}", jql_string(sprint)));
    }
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        parts.push(format!("status = {}", jql_string(status)));
    }
    if let Some(assignee) = assignee.filter(|s| !s.is_empty()) {
        parts.push(format!("assignee = {}", jql_string(assignee)));
    }
    parts.join(" AND ")
}

fn jql_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Splits a comma separated field list, trimming and dropping blanks.
pub fn parse_field_list(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Extracts the requested fields of a raw Jira issue into a row.
///
/// The row always carries `key`. Unknown fields fall back to
/// `customfield_<name>` (lower-cased, spaces as underscores), then to `-`.
pub fn extract_issue_fields(issue: &Value, fields: &[String]) -> Row {
    let mut row = Row::new();
    let key = issue.get("key").and_then(Value::as_str).unwrap_or(MISSING);
    row.insert("key".to_owned(), key.to_owned());

    let data = issue.get("fields").unwrap_or(&Value::Null);
    for field in fields {
        let value = match field.as_str() {
            "key" => continue,
            "summary" => data.get("summary").map(render_value),
            "status" => data
                .get("status")
                .and_then(|s| s.get("name"))
                .map(render_value),
            "assignee" => data
                .get("assignee")
                .and_then(|a| a.get("displayName"))
                .map(render_value),
            other => data
                .get(other)
                .or_else(|| data.get(custom_field_name(other)))
                .map(render_value),
        };
        row.insert(field.clone(), value.unwrap_or_else(|| MISSING.to_owned()));
    }
    row
}

fn custom_field_name(field: &str) -> String {
    format!("customfield_{}", field.to_lowercase().replace(' ', "_"))
}

/// Renders a Jira field value as display text.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_owned(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => ["displayName", "name", "value", "key"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| value.to_string()),
    }
}

/// Counts rows per `status`, keeping first-seen order.
pub fn status_counts(rows: &[Row]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for row in rows {
        let status = row.get("status").map(String::as_str).unwrap_or(MISSING);
        match counts.iter_mut().find(|(s, _)| s == status) {
            Some((_, n)) => *n += 1,
            None => counts.push((status.to_owned(), 1)),
        }
    }
    counts
}

/// The id, key and name of every visible project.
pub async fn project_keys<T: IssueTracker + ?Sized>(tracker: &T) -> Result<Table, QaError> {
    let projects = tracker.projects().await?;
    let rows = projects
        .into_iter()
        .map(|p| {
            Row::from([
                ("id".to_owned(), p.id),
                ("key".to_owned(), p.key),
                ("name".to_owned(), p.name),
            ])
        })
        .collect();
    Ok(Table::new("Jira Projects", ["id", "key", "name"]).with_rows(rows))
}

/// Issues of a project, optionally filtered by status and assignee.
pub async fn project_issues<T: IssueTracker + ?Sized>(
    tracker: &T,
    query: &ProjectIssuesQuery,
) -> Result<IssueReport, QaError> {
    let mut columns = parse_field_list(&query.fields);
    if query.assignee.is_some() && !columns.iter().any(|c| c == "status") {
        columns.push("status".to_owned());
    }

    let jql = build_jql(
        &query.project_key,
        None,
        query.status.as_deref(),
        query.assignee.as_deref(),
    );
    debug!(jql = %jql, ?columns, "Built project issues query");

    let issues = tracker.search_issues(&jql, &columns, MAX_ISSUES).await?;
    let rows: Vec<Row> = issues
        .iter()
        .map(|issue| extract_issue_fields(issue, &columns))
        .collect();
    info!(project = %query.project_key, count = rows.len(), "Collected project issues");

    let status_summary = match &query.assignee {
        Some(assignee) if !rows.is_empty() => {
            let summary_rows = status_counts(&rows)
                .into_iter()
                .map(|(status, count)| {
                    Row::from([
                        ("Status".to_owned(), status),
                        ("Count".to_owned(), count.to_string()),
                    ])
                })
                .collect();
            Some(
                Table::new(format!("Summary for '{assignee}'"), ["Status", "Count"])
                    .with_rows(summary_rows),
            )
        }
        _ => None,
    };

    Ok(IssueReport {
        issues: Table::new(format!("Issues for '{}'", query.project_key), columns)
            .with_rows(rows),
        status_summary,
    })
}

/// Issues of a sprint, with a browser link per issue.
pub async fn sprint_issues<T: IssueTracker + ?Sized>(
    tracker: &T,
    credentials: &JiraCredentials,
    query: &SprintIssuesQuery,
) -> Result<Table, QaError> {
    let fields = parse_field_list(DEFAULT_ISSUE_FIELDS);
    let jql = build_jql(
        &query.project_key,
        Some(&query.sprint_name),
        query.status.as_deref(),
        None,
    );
    let issues = tracker.search_issues(&jql, &fields, MAX_ISSUES).await?;
    let rows: Vec<Row> = issues
        .iter()
        .map(|issue| {
            let mut row = extract_issue_fields(issue, &fields);
            let link = row.get("key").map(|key| credentials.browse_url(key));
            if let Some(link) = link {
                row.insert("link".to_owned(), link);
            }
            row
        })
        .collect();
    info!(
        project = %query.project_key,
        sprint = %query.sprint_name,
        count = rows.len(),
        "Collected sprint issues"
    );

    let mut columns = fields;
    columns.push("link".to_owned());
    Ok(Table::new(
        format!(
            "Issues for Project '{}' in Sprint '{}'",
            query.project_key, query.sprint_name
        ),
        columns,
    )
    .with_rows(rows))
}
