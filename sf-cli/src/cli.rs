//! # sf-cli command line interface
//!
//! Argument parsing and subcommand routing for the `sf-cli` binary. All
//! Salesforce and Jira logic lives in [`sf_cli_core`]; this module only wires
//! parsed arguments, the loaded config and the real `sf`/Jira clients together.
//!
//! For programmatic and integration use, call [`run`] with a constructed [`Cli`].

use crate::commands::{accounts, qa, salesforce, users};
use crate::load_config::resolve_config;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sf_cli_core::executor::SfExecutor;
use std::io::Write;
use std::path::PathBuf;

/// CLI tool for managing Salesforce entities.
#[derive(Debug, Parser)]
#[clap(
    name = "sf-cli",
    version,
    about = "Manage Salesforce users, accounts and orgs, and report Jira issues for QA"
)]
pub struct Cli {
    /// Salesforce org alias (defaults to the config's default_org, then sf's default org)
    #[clap(long, global = true)]
    pub org: Option<String>,

    /// Show execution details
    #[clap(long, global = true)]
    pub verbose: bool,

    /// Path to an optional YAML config file
    #[clap(long, global = true, env = "SF_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage Salesforce users
    Users {
        #[clap(subcommand)]
        command: UsersCommand,
    },
    /// Manage Salesforce accounts
    Accounts {
        #[clap(subcommand)]
        command: AccountsCommand,
    },
    /// Manage Salesforce org logins
    Salesforce {
        #[clap(subcommand)]
        command: SalesforceCommand,
    },
    /// Jira reports for QA
    Qa {
        #[clap(subcommand)]
        command: QaCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RoleArg {
    #[default]
    Standard,
    Admin,
    #[value(aliases = ["read_only", "readonly"])]
    ReadOnly,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Create a new user
    Create {
        /// User's email
        #[clap(long)]
        email: String,
        /// User's first name
        #[clap(long)]
        first_name: Option<String>,
        /// User's last name
        #[clap(long)]
        last_name: String,
        /// User's role
        #[clap(long, value_enum, default_value_t = RoleArg::Standard)]
        role: RoleArg,
        /// Username (default: email)
        #[clap(long)]
        username: Option<String>,
        /// User's phone number
        #[clap(long)]
        phone: Option<String>,
        /// User's job title
        #[clap(long)]
        title: Option<String>,
        /// User's department
        #[clap(long)]
        department: Option<String>,
        /// User's company name
        #[clap(long)]
        company: Option<String>,
    },
    /// List all users
    ListUsers {
        /// Show only active users
        #[clap(long)]
        active_only: bool,
        #[clap(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// Create a new account
    Create {
        /// Account name
        #[clap(long)]
        name: String,
        #[clap(long)]
        industry: Option<String>,
        #[clap(long)]
        phone: Option<String>,
    },
    /// List all accounts
    ListAccounts {
        /// Maximum number of accounts to list
        #[clap(long, default_value_t = sf_cli_core::account_manager::DEFAULT_LIST_LIMIT)]
        limit: u32,
        #[clap(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
pub enum SalesforceCommand {
    /// Login to a known Salesforce environment (opens a browser)
    Login {
        /// Environment to login to (dev, qa, poc, or one from the config file)
        #[clap(long)]
        env: String,
    },
    /// List authenticated Salesforce orgs
    Org {
        #[clap(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Logout from a Salesforce org using its alias
    Logout {
        /// Alias of the Salesforce org to logout from
        #[clap(long)]
        alias: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum QaCommand {
    /// Display the key, name, and ID of all Jira projects
    GetProjectKeys,
    /// Show issues for a project, optionally filtered by status and assignee
    GetProjectIssues {
        /// Select Jira project key
        #[clap(long)]
        project_key: String,
        /// Comma-separated list of issue fields to display
        #[clap(long, default_value = sf_cli_core::qa::DEFAULT_ISSUE_FIELDS)]
        fields: String,
        /// Filter issues by status (e.g., 'To Do', 'In Progress')
        #[clap(long)]
        status: Option<String>,
        /// Filter by assignee (username or display name)
        #[clap(long)]
        assignee: Option<String>,
    },
    /// Retrieve issues from a sprint with optional filters
    GetSprintIssues {
        /// The Jira project key
        #[clap(long, default_value = "CXP")]
        project_key: String,
        /// The name of the sprint
        #[clap(long, default_value = "Sprint 1")]
        sprint_name: String,
        /// Filter issues by status
        #[clap(long)]
        status: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = resolve_config(cli.config.as_deref())?;
    let org = config.org_or_default(cli.org.as_deref());
    let executor = SfExecutor::new(config.sf_binary());
    tracing::debug!(org = %org, sf_binary = %executor.program().display(), "Resolved settings");

    let mut out = std::io::stdout();

    let result = match cli.command {
        Commands::Users { command } => {
            users::run(command, executor, &org, cli.verbose, &mut out).await
        }
        Commands::Accounts { command } => accounts::run(command, executor, &org, &mut out).await,
        Commands::Salesforce { command } => {
            salesforce::run(command, executor, config.environments(), &mut out).await
        }
        Commands::Qa { command } => qa::run(command, &config, &mut out).await,
    };
    out.flush()?;

    match &result {
        Ok(()) => tracing::info!("Command completed"),
        Err(e) => tracing::error!(error = %e, "Command failed"),
    }
    result
}
