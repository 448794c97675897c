//! Subcommand implementations, one module per command group.
//!
//! Each `run` is generic over the core traits so it can be driven by the
//! real `sf`/Jira clients or by mocks, and writes user-facing output to the
//! given writer.

pub mod accounts;
pub mod qa;
pub mod salesforce;
pub mod users;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
