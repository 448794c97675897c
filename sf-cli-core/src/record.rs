//! Helpers for the `--values` argument of `sf data create record` and for SOQL literals.
//!
//! `sf` splits `--values` on whitespace outside quotes and strips the outer
//! quote pair of each value. It has no escape character, so a value can only
//! be wrapped in a quote character it does not itself contain.

use crate::contract::ManagerError;

/// Ordered `Field=value` pairs for `sf data create record --values`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordValues {
    pairs: Vec<(String, String)>,
}

impl RecordValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<String>) -> Self {
        self.pairs.push((field.to_owned(), value.into()));
        self
    }

    /// Adds the pair only when a non-empty value is present.
    pub fn set_opt(self, field: &str, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => self.set(field, v),
            _ => self,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(f, _)| f.as_str())
    }

    /// Renders the space separated list understood by `sf`, quoting values
    /// that are empty or contain whitespace or quotes.
    pub fn render(&self) -> Result<String, ManagerError> {
        let rendered = self
            .pairs
            .iter()
            .map(|(field, value)| Ok(format!("{field}={}", quote_value(field, value)?)))
            .collect::<Result<Vec<_>, ManagerError>>()?;
        Ok(rendered.join(" "))
    }
}

fn quote_value(field: &str, value: &str) -> Result<String, ManagerError> {
    let has_single = value.contains('\'');
    let has_double = value.contains('"');
    let needs_quotes =
        value.is_empty() || has_single || has_double || value.contains(char::is_whitespace);
    match (needs_quotes, has_single, has_double) {
        (false, _, _) => Ok(value.to_owned()),
        (true, false, _) => Ok(format!("'{value}'")),
        (true, true, false) => Ok(format!("\"{value}\"")),
        (true, true, true) => Err(ManagerError::InvalidInput(format!(
            "{field} cannot contain both single and double quotes"
        ))),
    }
}

/// Quotes a string as a SOQL literal.
pub fn soql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
