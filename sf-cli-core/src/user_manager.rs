//! Business logic for managing Salesforce users through the `sf` CLI.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::contract::{CommandRunner, ManagerError};
use crate::executor::{query_records, result_of, ExecutorError, SfCommand, DEFAULT_ORG_ALIAS};
use crate::models::{User, UserRole};
use crate::record::{soql_literal, RecordValues};

const ALIAS_LEN: usize = 5;

pub struct UserManager<R> {
    runner: R,
    target_org: String,
}

impl<R: CommandRunner> UserManager<R> {
    pub fn new(runner: R, target_org: impl Into<String>) -> Self {
        Self {
            runner,
            target_org: target_org.into(),
        }
    }

    /// Manager bound to whatever org `sf` considers the default.
    pub fn for_default_org(runner: R) -> Self {
        Self::new(runner, DEFAULT_ORG_ALIAS)
    }

    pub fn target_org(&self) -> &str {
        &self.target_org
    }

    /// Creates the user in Salesforce and returns it with its new `id` set.
    pub async fn create_user(&self, mut user: User) -> Result<User, ManagerError> {
        let email = user
            .email
            .clone()
            .ok_or_else(|| ManagerError::InvalidInput("email is required".to_owned()))?;
        let last_name = user
            .last_name
            .clone()
            .ok_or_else(|| ManagerError::InvalidInput("last name is required".to_owned()))?;
        let username = user.username.clone().unwrap_or_else(|| email.clone());

        let profile_id = self.profile_id(user.role).await?;
        let values = user_record_values(&user, &username, &email, &last_name, &profile_id);

        info!(
            org = %self.target_org,
            username = %username,
            role = ?user.role,
            "Creating Salesforce user"
        );
        let command = SfCommand::new("data create record")
            .args(["--sobject", "User", "--values"])
            .arg(values.render()?)
            .target_org(&self.target_org);
        let response = self.runner.run(command).await?;

        let id = result_of(&response)?
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                error!(?response, "Create record response carried no id");
                ExecutorError::UnexpectedResponse("missing 'result.id' field".to_owned())
            })?;
        info!(id = %id, "User created successfully");

        user.id = Some(id.to_owned());
        user.username = Some(username);
        Ok(user)
    }

    /// Lists users ordered by last name, optionally only the active ones.
    pub async fn list_users(&self, active_only: bool) -> Result<Vec<User>, ManagerError> {
        let query = list_users_query(active_only);
        debug!(org = %self.target_org, query = %query, "Querying Salesforce users");
        let command = SfCommand::new("data query")
            .arg("--query")
            .arg(query)
            .target_org(&self.target_org);
        let response = self.runner.run(command).await?;
        let users: Vec<User> = query_records(&response).iter().map(User::from_record).collect();
        info!(count = users.len(), active_only, "Fetched Salesforce users");
        Ok(users)
    }

    /// Resolves the Salesforce profile id backing `role`.
    pub async fn profile_id(&self, role: UserRole) -> Result<String, ManagerError> {
        let query = format!(
            "SELECT Id FROM Profile WHERE Name = {}",
            soql_literal(role.profile_name())
        );
        let command = SfCommand::new("data query")
            .arg("--query")
            .arg(query)
            .target_org(&self.target_org);
        let response = self.runner.run(command).await?;
        query_records(&response)
            .first()
            .and_then(|r| r.get("Id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                error!(role = ?role, "No Salesforce profile found for role");
                ManagerError::ProfileNotFound(role)
            })
    }
}

pub fn list_users_query(active_only: bool) -> String {
    let where_clause = if active_only {
        " WHERE IsActive = true"
    } else {
        ""
    };
    format!(
        "SELECT Id, Username, Email, FirstName, LastName, Profile.Name, IsActive, CreatedDate \
         FROM User{where_clause} ORDER BY LastName"
    )
}

fn user_record_values(
    user: &User,
    username: &str,
    email: &str,
    last_name: &str,
    profile_id: &str,
) -> RecordValues {
    let alias: String = username.chars().take(ALIAS_LEN).collect();
    RecordValues::new()
        .set("Username", username)
        .set("Email", email)
        .set_opt("FirstName", user.first_name.as_deref())
        .set("LastName", last_name)
        .set_opt("Alias", Some(alias.as_str()))
        .set("ProfileId", profile_id)
        .set("TimeZoneSidKey", "America/New_York")
        .set("LocaleSidKey", "en_US")
        .set("EmailEncodingKey", "UTF-8")
        .set("LanguageLocaleKey", "en_US")
        .set_opt("Phone", user.phone.as_deref())
        .set_opt("Title", user.title.as_deref())
        .set_opt("Department", user.department.as_deref())
        .set_opt("CompanyName", user.company.as_deref())
}
