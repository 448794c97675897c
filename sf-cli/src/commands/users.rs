use crate::cli::{OutputFormat, RoleArg, UsersCommand};
use crate::commands::write_json;
use anyhow::Result;
use colored::Colorize;
use sf_cli_core::contract::CommandRunner;
use sf_cli_core::models::{CreateUserParams, User, UserRole};
use sf_cli_core::table::{Row, Table};
use sf_cli_core::user_manager::UserManager;
use std::io::Write;
use tracing::info;

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Standard => UserRole::Standard,
            RoleArg::Admin => UserRole::Admin,
            RoleArg::ReadOnly => UserRole::ReadOnly,
        }
    }
}

pub async fn run<R: CommandRunner, W: Write>(
    command: UsersCommand,
    runner: R,
    org: &str,
    verbose: bool,
    out: &mut W,
) -> Result<()> {
    let manager = UserManager::new(runner, org);
    match command {
        UsersCommand::Create {
            email,
            first_name,
            last_name,
            role,
            username,
            phone,
            title,
            department,
            company,
        } => {
            let params = CreateUserParams {
                email,
                last_name,
                first_name,
                phone,
                title,
                department,
                company,
                role: role.into(),
                username,
            };
            create(&manager, params, verbose, out).await
        }
        UsersCommand::ListUsers {
            active_only,
            format,
        } => list(&manager, active_only, format, out).await,
    }
}

async fn create<R: CommandRunner, W: Write>(
    manager: &UserManager<R>,
    params: CreateUserParams,
    verbose: bool,
    out: &mut W,
) -> Result<()> {
    params.validate()?;
    let user = params.into_user();

    if verbose {
        writeln!(out, "{}", "Creating user:".yellow().bold())?;
        write_json(out, &user)?;
    }

    let created = manager.create_user(user).await?;
    let id = created.id.as_deref().unwrap_or_default();
    info!(id = %id, org = %manager.target_org(), "User created successfully");
    writeln!(
        out,
        "{}",
        format!("User created successfully with ID: {id}").green().bold()
    )?;
    Ok(())
}

async fn list<R: CommandRunner, W: Write>(
    manager: &UserManager<R>,
    active_only: bool,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let users = manager.list_users(active_only).await?;
    match format {
        OutputFormat::Json => write_json(out, &users)?,
        OutputFormat::Table => {
            write!(out, "{}", users_table(&users).render_or("No users found."))?;
        }
    }
    Ok(())
}

pub fn users_table(users: &[User]) -> Table {
    let rows = users
        .iter()
        .map(|user| {
            Row::from([
                ("ID".to_owned(), user.id.clone().unwrap_or_default()),
                ("Username".to_owned(), user.username.clone().unwrap_or_default()),
                ("Email".to_owned(), user.email.clone().unwrap_or_default()),
                ("Name".to_owned(), user.display_name()),
                ("Role".to_owned(), user.role.profile_name().to_owned()),
                (
                    "Active".to_owned(),
                    if user.is_active { "Yes" } else { "No" }.to_owned(),
                ),
            ])
        })
        .collect();
    Table::new(
        "Salesforce Users",
        ["ID", "Username", "Email", "Name", "Role", "Active"],
    )
    .with_rows(rows)
}
