//! `qa` commands: Jira project and issue reports.
//!
//! Missing Jira credentials are reported on stdout and the command exits
//! successfully, so scripted runs without Jira access do not fail.

use crate::cli::QaCommand;
use crate::load_config::CliConfig;
use anyhow::Result;
use colored::Colorize;
use sf_cli_core::contract::{IssueTracker, QaError};
use sf_cli_core::jira::{JiraClient, JiraCredentials};
use sf_cli_core::qa::{self as reports, ProjectIssuesQuery, SprintIssuesQuery};
use std::io::Write;
use tracing::warn;

pub async fn run<W: Write>(command: QaCommand, config: &CliConfig, out: &mut W) -> Result<()> {
    let credentials = match config.jira_credentials() {
        Ok(credentials) => credentials,
        Err(QaError::MissingCredentials) => {
            warn!("Jira credentials are not configured");
            writeln!(out, "{}", QaError::MissingCredentials.to_string().red())?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let client = JiraClient::new(credentials.clone());
    run_with(command, &client, &credentials, out).await
}

pub async fn run_with<T: IssueTracker + ?Sized, W: Write>(
    command: QaCommand,
    tracker: &T,
    credentials: &JiraCredentials,
    out: &mut W,
) -> Result<()> {
    match command {
        QaCommand::GetProjectKeys => {
            let table = reports::project_keys(tracker).await?;
            if table.is_empty() {
                writeln!(out, "No projects found in Jira.")?;
            } else {
                write!(out, "{}", table.render())?;
            }
        }
        QaCommand::GetProjectIssues {
            project_key,
            fields,
            status,
            assignee,
        } => {
            let query = ProjectIssuesQuery {
                project_key,
                fields,
                status,
                assignee,
            };
            let report = reports::project_issues(tracker, &query).await?;
            if report.issues.is_empty() {
                writeln!(
                    out,
                    "{}",
                    format!("No issues found for project '{}'.", query.project_key).red()
                )?;
                return Ok(());
            }
            write!(out, "{}", report.issues.render())?;
            if let Some(summary) = &report.status_summary {
                writeln!(out)?;
                write!(out, "{}", summary.render())?;
            }
        }
        QaCommand::GetSprintIssues {
            project_key,
            sprint_name,
            status,
        } => {
            let query = SprintIssuesQuery {
                project_key,
                sprint_name,
                status,
            };
            let table = reports::sprint_issues(tracker, credentials, &query).await?;
            if table.is_empty() {
                writeln!(
                    out,
                    "{}",
                    format!(
                        "No issues found for project '{}', sprint '{}'.",
                        query.project_key, query.sprint_name
                    )
                    .red()
                )?;
            } else {
                write!(out, "{}", table.render())?;
            }
        }
    }
    Ok(())
}
