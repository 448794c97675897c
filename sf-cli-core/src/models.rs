//! Data models for Salesforce users, accounts and orgs.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::ManagerError;

/// User roles, each mapping to a Salesforce profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Standard,
    Admin,
    ReadOnly,
}

impl UserRole {
    /// Name of the Salesforce profile backing this role.
    pub fn profile_name(&self) -> &'static str {
        match self {
            UserRole::Standard => "Standard User",
            UserRole::Admin => "System Administrator",
            UserRole::ReadOnly => "Read Only",
        }
    }

    /// Maps a Salesforce profile name back onto a role; unknown profiles are `Standard`.
    pub fn from_profile_name(profile_name: Option<&str>) -> Self {
        match profile_name {
            Some(name) if name.contains("Administrator") => UserRole::Admin,
            Some(name) if name.contains("Read Only") => UserRole::ReadOnly,
            _ => UserRole::Standard,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile_name())
    }
}

impl FromStr for UserRole {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(UserRole::Standard),
            "admin" => Ok(UserRole::Admin),
            "read_only" | "readonly" | "read-only" => Ok(UserRole::ReadOnly),
            other => Err(ManagerError::InvalidInput(format!(
                "unknown role '{other}' (expected standard, admin or read-only)"
            ))),
        }
    }
}

/// A Salesforce user as created or listed by this tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl User {
    /// First and last name joined by a space, trimmed.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_owned()
    }

    /// Builds a user from a `SELECT ... FROM User` record.
    pub fn from_record(record: &Value) -> Self {
        let profile_name = record
            .get("Profile")
            .and_then(|p| p.get("Name"))
            .and_then(Value::as_str);
        User {
            id: string_field(record, "Id"),
            username: string_field(record, "Username"),
            email: string_field(record, "Email"),
            first_name: string_field(record, "FirstName"),
            last_name: string_field(record, "LastName"),
            role: UserRole::from_profile_name(profile_name),
            is_active: record
                .get("IsActive")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_date: string_field(record, "CreatedDate"),
            ..User::default()
        }
    }
}

/// Parameters accepted by `users create`.
#[derive(Debug, Clone, Default)]
pub struct CreateUserParams {
    pub email: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub company: Option<String>,
    pub role: UserRole,
    pub username: Option<String>,
}

impl CreateUserParams {
    pub fn validate(&self) -> Result<(), ManagerError> {
        let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .map_err(|e| ManagerError::InvalidInput(e.to_string()))?;
        if !email_re.is_match(self.email.trim()) {
            return Err(ManagerError::InvalidInput(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        if self.last_name.trim().is_empty() {
            return Err(ManagerError::InvalidInput(
                "last name must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Converts the parameters into a new, active user. The username defaults to the email.
    pub fn into_user(self) -> User {
        let username = self.username.unwrap_or_else(|| self.email.clone());
        User {
            id: None,
            username: Some(username),
            email: Some(self.email),
            first_name: self.first_name,
            last_name: Some(self.last_name),
            role: self.role,
            is_active: true,
            created_date: None,
            phone: self.phone,
            title: self.title,
            department: self.department,
            company: self.company,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Account {
    pub id: Option<String>,
    pub name: String,
    pub industry: Option<String>,
    pub phone: Option<String>,
}

impl Account {
    pub fn from_record(record: &Value) -> Self {
        Account {
            id: string_field(record, "Id"),
            name: string_field(record, "Name").unwrap_or_default(),
            industry: string_field(record, "Industry"),
            phone: string_field(record, "Phone"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateAccountParams {
    pub name: String,
    pub industry: Option<String>,
    pub phone: Option<String>,
}

/// One authenticated org, as reported by `sf org list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSummary {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub connected_status: Option<String>,
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_owned)
}
