//! Business logic for managing Salesforce accounts through the `sf` CLI.

use serde_json::Value;
use tracing::{debug, info};

use crate::contract::{CommandRunner, ManagerError};
use crate::executor::{query_records, result_of, ExecutorError, SfCommand};
use crate::models::{Account, CreateAccountParams};
use crate::record::RecordValues;

pub const DEFAULT_LIST_LIMIT: u32 = 50;

pub struct AccountManager<R> {
    runner: R,
    target_org: String,
}

impl<R: CommandRunner> AccountManager<R> {
    pub fn new(runner: R, target_org: impl Into<String>) -> Self {
        Self {
            runner,
            target_org: target_org.into(),
        }
    }

    pub async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<Account, ManagerError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(ManagerError::InvalidInput(
                "account name must not be empty".to_owned(),
            ));
        }
        let values = RecordValues::new()
            .set("Name", name)
            .set_opt("Industry", params.industry.as_deref())
            .set_opt("Phone", params.phone.as_deref());

        info!(org = %self.target_org, name = %name, "Creating Salesforce account");
        let command = SfCommand::new("data create record")
            .args(["--sobject", "Account", "--values"])
            .arg(values.render()?)
            .target_org(&self.target_org);
        let response = self.runner.run(command).await?;
        let id = result_of(&response)?
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ExecutorError::UnexpectedResponse("missing 'result.id' field".to_owned())
            })?;

        Ok(Account {
            id: Some(id.to_owned()),
            name: name.to_owned(),
            industry: params.industry,
            phone: params.phone,
        })
    }

    pub async fn list_accounts(&self, limit: u32) -> Result<Vec<Account>, ManagerError> {
        let query =
            format!("SELECT Id, Name, Industry, Phone FROM Account ORDER BY Name LIMIT {limit}");
        debug!(org = %self.target_org, query = %query, "Querying Salesforce accounts");
        let command = SfCommand::new("data query")
            .arg("--query")
            .arg(query)
            .target_org(&self.target_org);
        let response = self.runner.run(command).await?;
        let accounts: Vec<Account> = query_records(&response)
            .iter()
            .map(Account::from_record)
            .collect();
        info!(count = accounts.len(), "Fetched Salesforce accounts");
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockCommandRunner;
    use serde_json::json;

    #[tokio::test]
    async fn create_account_sends_quoted_name() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| {
                let args = cmd.as_args();
                args.contains(&"Account".to_owned())
                    && args.contains(&"Name='Acme Corp' Industry=Retail".to_owned())
            })
            .times(1)
            .returning(|_| Ok(json!({"status": 0, "result": {"id": "001ACME"}})));

        let manager = AccountManager::new(runner, "default");
        let account = manager
            .create_account(CreateAccountParams {
                name: "Acme Corp".into(),
                industry: Some("Retail".into()),
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(account.id.as_deref(), Some("001ACME"));
        assert_eq!(account.name, "Acme Corp");
    }

    #[tokio::test]
    async fn blank_account_name_is_rejected_without_calling_sf() {
        let runner = MockCommandRunner::new();
        let manager = AccountManager::new(runner, "default");
        let err = manager
            .create_account(CreateAccountParams {
                name: "   ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_accounts_applies_limit() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.to_string().contains("ORDER BY Name LIMIT 10"))
            .returning(|_| {
                Ok(json!({"result": {"records": [
                    {"Id": "001A", "Name": "Acme", "Industry": "Retail", "Phone": null}
                ]}}))
            });
        let manager = AccountManager::new(runner, "default");
        let accounts = manager.list_accounts(10).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].industry.as_deref(), Some("Retail"));
        assert_eq!(accounts[0].phone, None);
    }
}
