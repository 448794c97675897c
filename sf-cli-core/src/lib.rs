#![doc = "sf-cli-core: core logic library for sf-cli."]

//! This crate holds the data models and business logic behind the `sf-cli`
//! binary: running the Salesforce `sf` CLI, managing users, accounts and
//! org logins, and building Jira QA reports.
//!
//! # Usage
//! Depend on this crate from the CLI and from integration tests. External
//! systems are reached only through the traits in [`contract`], which have
//! `mockall` mocks under the `test-export-mocks` feature.

pub mod account_manager;
pub mod contract;
pub mod executor;
pub mod jira;
pub mod models;
pub mod org;
pub mod qa;
pub mod record;
pub mod table;
pub mod user_manager;
