//! `load_config` module: loads the optional YAML config file and merges it with
//! environment variables into the settings used by every command.
//!
//! The YAML file never carries secrets. Jira email and token are read from the
//! environment only (a `.env` file is loaded at startup); `JIRA_SERVER` and
//! `SF_CLI_BINARY` override their config-file counterparts.
//!
//! Accepted shape:
//!
//! ```yaml
//! default_org: my-sandbox
//! sf_binary: /usr/local/bin/sf
//! environments:
//!   uat: https://example--uat.sandbox.my.salesforce.com/
//! jira:
//!   server: https://example.atlassian.net
//! ```

use anyhow::Result;
use serde::Deserialize;
use sf_cli_core::contract::QaError;
use sf_cli_core::executor::{DEFAULT_ORG_ALIAS, DEFAULT_PROGRAM};
use sf_cli_core::jira::JiraCredentials;
use sf_cli_core::org::Environments;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub default_org: Option<String>,
    #[serde(default)]
    pub sf_binary: Option<PathBuf>,
    #[serde(default)]
    pub environments: BTreeMap<String, String>,
    #[serde(default)]
    pub jira: JiraSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct JiraSection {
    #[serde(default)]
    pub server: Option<String>,
}

impl CliConfig {
    /// The org alias to use when `--org` is not given.
    pub fn org_or_default(&self, org: Option<&str>) -> String {
        org.map(str::to_owned)
            .or_else(|| self.default_org.clone())
            .unwrap_or_else(|| DEFAULT_ORG_ALIAS.to_owned())
    }

    /// `SF_CLI_BINARY`, then `sf_binary`, then `sf` from the PATH.
    pub fn sf_binary(&self) -> PathBuf {
        std::env::var_os("SF_CLI_BINARY")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.sf_binary.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }

    /// Built-in login environments with the configured ones merged on top.
    pub fn environments(&self) -> Environments {
        let mut environments = Environments::default();
        environments.extend(self.environments.clone());
        environments
    }

    pub fn jira_credentials(&self) -> Result<JiraCredentials, QaError> {
        let server = std::env::var("JIRA_SERVER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.jira.server.clone());
        JiraCredentials::from_parts(
            server,
            std::env::var("JIRA_EMAIL").ok(),
            std::env::var("JIRA_TOKEN").ok(),
        )
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid, empty config.
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };
    debug!(?config, "Config loaded (full debug)");
    Ok(config)
}

/// Loads `path` when given, otherwise returns the default config.
pub fn resolve_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CliConfig::default()),
    }
}
