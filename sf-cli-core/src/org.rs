//! Salesforce org login, logout and listing.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::contract::{CommandRunner, ManagerError};
use crate::executor::{result_of, SfCommand};
use crate::models::OrgSummary;

/// Groups of `sf org list --json` that are merged into one listing, in order.
const ORG_LIST_GROUPS: [&str; 3] = ["other", "nonScratchOrgs", "scratchOrgs"];

/// Known login environments: alias -> instance URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environments {
    urls: BTreeMap<String, String>,
}

impl Default for Environments {
    fn default() -> Self {
        let urls = [
            ("dev", "https://sanctuary--commondev.sandbox.my.salesforce.com/"),
            ("qa", "https://sanctuary--qa.sandbox.my.salesforce.com/"),
            ("poc", "https://sanctuary--poc.sandbox.lightning.force.com/"),
        ]
        .into_iter()
        .map(|(alias, url)| (alias.to_owned(), url.to_owned()))
        .collect();
        Self { urls }
    }
}

impl Environments {
    /// Adds or replaces environments; aliases are stored lower-case.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (alias, url) in entries {
            self.urls.insert(alias.to_lowercase(), url);
        }
    }

    pub fn aliases(&self) -> Vec<String> {
        self.urls.keys().cloned().collect()
    }

    /// Case-insensitive lookup, returning the normalised alias and its URL.
    pub fn resolve(&self, env: &str) -> Result<(String, &str), ManagerError> {
        let alias = env.trim().to_lowercase();
        match self.urls.get(&alias) {
            Some(url) => Ok((alias, url.as_str())),
            None => Err(ManagerError::UnknownEnvironment {
                env: env.to_owned(),
                known: self.aliases(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub alias: String,
    pub instance_url: String,
    pub username: Option<String>,
    pub org_id: Option<String>,
}

pub struct OrgManager<R> {
    runner: R,
    environments: Environments,
}

impl<R: CommandRunner> OrgManager<R> {
    pub fn new(runner: R, environments: Environments) -> Self {
        Self {
            runner,
            environments,
        }
    }

    pub fn environments(&self) -> &Environments {
        &self.environments
    }

    /// Starts a web login for `env`; `sf` opens a browser for authentication.
    pub async fn login(&self, env: &str) -> Result<LoginOutcome, ManagerError> {
        let (alias, url) = self.environments.resolve(env)?;
        info!(alias = %alias, instance_url = %url, "Attempting web login");
        let command = SfCommand::new("org login web")
            .arg("--alias")
            .arg(alias.as_str())
            .arg("--instance-url")
            .arg(url);
        let response = self.runner.run(command).await?;
        let result = result_of(&response)?;
        Ok(LoginOutcome {
            instance_url: url.to_owned(),
            username: result
                .get("username")
                .and_then(Value::as_str)
                .map(str::to_owned),
            org_id: result.get("orgId").and_then(Value::as_str).map(str::to_owned),
            alias,
        })
    }

    pub async fn logout(&self, alias: &str) -> Result<(), ManagerError> {
        info!(alias = %alias, "Logging out of Salesforce org");
        let command = SfCommand::new("org logout")
            .arg("--target-org")
            .arg(alias)
            .arg("--no-prompt");
        self.runner.run(command).await?;
        Ok(())
    }

    pub async fn list_orgs(&self) -> Result<Vec<OrgSummary>, ManagerError> {
        let response = self.runner.run(SfCommand::new("org list")).await?;
        let orgs = merge_org_groups(result_of(&response)?);
        info!(count = orgs.len(), "Fetched authenticated orgs");
        Ok(orgs)
    }
}

/// Concatenates the org groups of an `org list` result, dropping repeated usernames.
pub fn merge_org_groups(result: &Value) -> Vec<OrgSummary> {
    let mut seen = HashSet::new();
    let mut orgs = Vec::new();
    for group in ORG_LIST_GROUPS {
        let Some(entries) = result.get(group).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let org: OrgSummary = match serde_json::from_value(entry.clone()) {
                Ok(org) => org,
                Err(e) => {
                    warn!(error = %e, group, "Skipping unparseable org entry");
                    continue;
                }
            };
            if let Some(username) = &org.username {
                if !seen.insert(username.clone()) {
                    continue;
                }
            }
            orgs.push(org);
        }
    }
    orgs
}
