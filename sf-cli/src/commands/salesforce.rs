use crate::cli::{OutputFormat, SalesforceCommand};
use crate::commands::write_json;
use anyhow::Result;
use colored::Colorize;
use sf_cli_core::contract::CommandRunner;
use sf_cli_core::models::OrgSummary;
use sf_cli_core::org::{Environments, OrgManager};
use sf_cli_core::table::{Row, Table};
use std::io::Write;

pub async fn run<R: CommandRunner, W: Write>(
    command: SalesforceCommand,
    runner: R,
    environments: Environments,
    out: &mut W,
) -> Result<()> {
    let manager = OrgManager::new(runner, environments);
    match command {
        SalesforceCommand::Login { env } => {
            // Validate before announcing the attempt.
            let (alias, _) = manager.environments().resolve(&env)?;
            writeln!(
                out,
                "{}",
                format!("Attempting login to {}...", alias.blue().bold()).yellow()
            )?;
            let outcome = manager.login(&env).await?;
            writeln!(
                out,
                "{}",
                format!("Successfully initiated login for '{}'.", outcome.alias)
                    .green()
                    .bold()
            )?;
            writeln!(
                out,
                "{}",
                "A browser window should open for authentication.".italic()
            )?;
            if let Some(username) = &outcome.username {
                writeln!(out, "Authenticated as {username}")?;
            }
        }
        SalesforceCommand::Logout { alias } => {
            writeln!(
                out,
                "{}",
                format!("Attempting to logout from {}...", alias.blue().bold()).yellow()
            )?;
            manager.logout(&alias).await?;
            writeln!(
                out,
                "{}",
                format!("Successfully logged out from '{alias}'.")
                    .green()
                    .bold()
            )?;
        }
        SalesforceCommand::Org { format } => {
            let orgs = manager.list_orgs().await?;
            match format {
                OutputFormat::Json => write_json(out, &orgs)?,
                OutputFormat::Table => write!(
                    out,
                    "{}",
                    orgs_table(&orgs).render_or("No organization details found.")
                )?,
            }
        }
    }
    Ok(())
}

fn orgs_table(orgs: &[OrgSummary]) -> Table {
    let rows = orgs
        .iter()
        .map(|org| {
            [
                ("alias", &org.alias),
                ("username", &org.username),
                ("instanceUrl", &org.instance_url),
            ]
            .into_iter()
            .filter_map(|(column, value)| value.clone().map(|v| (column.to_owned(), v)))
            .collect::<Row>()
        })
        .collect();
    Table::new("Salesforce Organizations", ["alias", "username", "instanceUrl"]).with_rows(rows)
}
