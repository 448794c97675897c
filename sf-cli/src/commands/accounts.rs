use crate::cli::{AccountsCommand, OutputFormat};
use crate::commands::write_json;
use anyhow::Result;
use colored::Colorize;
use sf_cli_core::account_manager::AccountManager;
use sf_cli_core::contract::CommandRunner;
use sf_cli_core::models::{Account, CreateAccountParams};
use sf_cli_core::table::{Row, Table};
use std::io::Write;

pub async fn run<R: CommandRunner, W: Write>(
    command: AccountsCommand,
    runner: R,
    org: &str,
    out: &mut W,
) -> Result<()> {
    let manager = AccountManager::new(runner, org);
    match command {
        AccountsCommand::Create {
            name,
            industry,
            phone,
        } => {
            writeln!(out, "Creating account: {name}")?;
            let account = manager
                .create_account(CreateAccountParams {
                    name,
                    industry,
                    phone,
                })
                .await?;
            writeln!(
                out,
                "{}",
                format!(
                    "Account created successfully with ID: {}",
                    account.id.as_deref().unwrap_or_default()
                )
                .green()
                .bold()
            )?;
        }
        AccountsCommand::ListAccounts { limit, format } => {
            let accounts = manager.list_accounts(limit).await?;
            match format {
                OutputFormat::Json => write_json(out, &accounts)?,
                OutputFormat::Table => write!(
                    out,
                    "{}",
                    accounts_table(&accounts).render_or("No accounts found.")
                )?,
            }
        }
    }
    Ok(())
}

fn accounts_table(accounts: &[Account]) -> Table {
    let rows = accounts
        .iter()
        .map(|a| {
            let mut row = Row::new();
            row.insert("ID".to_owned(), a.id.clone().unwrap_or_default());
            row.insert("Name".to_owned(), a.name.clone());
            if let Some(industry) = &a.industry {
                row.insert("Industry".to_owned(), industry.clone());
            }
            if let Some(phone) = &a.phone {
                row.insert("Phone".to_owned(), phone.clone());
            }
            row
        })
        .collect();
    Table::new("Salesforce Accounts", ["ID", "Name", "Industry", "Phone"]).with_rows(rows)
}
