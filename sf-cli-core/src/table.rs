//! Borderless terminal tables with coloured headers.

use std::collections::BTreeMap;

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

/// One table row: column name -> cell text.
pub type Row = BTreeMap<String, String>;

/// Header colours, cycled left to right.
const HEADER_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

const MISSING_CELL: &str = "N/A";
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone)]
pub struct Table {
    title: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(title: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or(MISSING_CELL)
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|column| {
                self.rows
                    .iter()
                    .map(|row| Self::cell(row, column).width())
                    .chain(std::iter::once(column.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders the title, the header and one line per row.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = format!("{}\n", self.title.bold());

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (column, width))| {
                pad(column, *width)
                    .color(HEADER_COLORS[i % HEADER_COLORS.len()])
                    .bold()
                    .to_string()
            })
            .collect();
        out.push_str(header.join(COLUMN_GAP).trim_end());
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(column, width)| pad(Self::cell(row, column), *width))
                .collect();
            out.push_str(cells.join(COLUMN_GAP).trim_end());
            out.push('\n');
        }
        out
    }

    /// Renders the table, or `empty_message` when there are no rows.
    pub fn render_or(&self, empty_message: &str) -> String {
        if self.is_empty() {
            format!("{empty_message}\n")
        } else {
            self.render()
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn aligns_columns_and_fills_missing_cells() {
        colored::control::set_override(false);
        let table = Table::new("Salesforce Organizations", ["alias", "username"]).with_rows(vec![
            row(&[("alias", "dev"), ("username", "me@dev.example.com")]),
            row(&[("username", "other@example.com")]),
        ]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Salesforce Organizations");
        assert_eq!(lines[1], "alias  username");
        assert_eq!(lines[2], "dev    me@dev.example.com");
        assert_eq!(lines[3], "N/A    other@example.com");
    }

    #[test]
    fn wide_characters_use_display_width() {
        colored::control::set_override(false);
        let table = Table::new("t", ["name", "x"]).with_rows(vec![
            row(&[("name", "日本"), ("x", "1")]),
            row(&[("name", "abcde"), ("x", "2")]),
        ]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "日本   1");
        assert_eq!(lines[3], "abcde  2");
    }

    #[test]
    fn empty_table_renders_message() {
        let table = Table::new("Issues", ["key"]);
        assert_eq!(table.render_or("No issues to display."), "No issues to display.\n");
    }
}
