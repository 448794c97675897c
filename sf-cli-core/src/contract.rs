#![allow(unused)]

//! # contract: seams between the command layer and external systems
//!
//! Two traits isolate everything that leaves the process:
//! - [`CommandRunner`] runs a Salesforce CLI command and yields its JSON output.
//! - [`IssueTracker`] queries Jira for projects and issues.
//!
//! Managers and QA reports are generic over these traits, so the real
//! implementations ([`crate::executor::SfExecutor`], [`crate::jira::JiraClient`])
//! can be swapped for `mockall` mocks in tests.
//!
//! The error enums shared by the managers live here as well.

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde_json::Value;
use thiserror::Error;

use crate::executor::{ExecutorError, SfCommand};
use crate::jira::JiraProject;
use crate::models::UserRole;

/// Errors raised by the Salesforce managers (users, accounts, orgs).
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error("Profile not found for role: {}", .0.profile_name())]
    ProfileNotFound(UserRole),
    #[error("Invalid environment '{env}'. Choose from: {}", .known.join(", "))]
    UnknownEnvironment { env: String, known: Vec<String> },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while building Jira QA reports.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("JIRA_SERVER, JIRA_EMAIL, and JIRA_TOKEN environment variables must be set.")]
    MissingCredentials,
    #[error("Jira request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Jira returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Failed to parse Jira response: {0}")]
    Parse(String),
}

/// Runs one Salesforce CLI command and returns its parsed `--json` output.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: SfCommand) -> Result<Value, ExecutorError>;
}

/// Read access to a Jira instance.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Run a JQL search and return the raw issue objects (`key`, `fields`, ...),
    /// fetching at most `max_results` issues.
    async fn search_issues(
        &self,
        jql: &str,
        fields: &[String],
        max_results: usize,
    ) -> Result<Vec<Value>, QaError>;

    /// List every project visible to the authenticated user.
    async fn projects(&self) -> Result<Vec<JiraProject>, QaError>;
}
