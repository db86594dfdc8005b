//! Rendering of pipeline results and blog listings.
//!
//! Text output draws rows as an aligned table whose columns follow the first
//! row's key order. JSON and YAML serialize the full response object.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::{
    db::{PostWithAuthor, RowSet, User},
    pipeline::QueryResponse
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Greeting payload for structured output
#[derive(Debug, Serialize)]
pub struct GreetingResult<'a> {
    pub success: bool,
    pub message: &'a str
}

fn heading(text: &str, opts: &OutputOptions) -> String {
    if opts.colored {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value).unwrap_or_default()),
        OutputFormat::Text => None
    }
}

/// Format a pipeline response
pub fn format_query_response(response: &QueryResponse, opts: &OutputOptions) -> String {
    if let Some(structured) = serialize(response, opts.format) {
        return structured;
    }
    let mut output = String::new();
    if let Some(query) = &response.query {
        output.push_str(&heading("=== Generated SQL ===", opts));
        output.push('\n');
        output.push_str(query);
        output.push_str("\n\n");
    }
    if let Some(failure) = &response.error {
        let label = if opts.colored {
            "Error:".red().bold().to_string()
        } else {
            String::from("Error:")
        };
        output.push_str(&format!("{} {}\n", label, failure.message));
        if !failure.tips.is_empty() {
            output.push_str("\nTips:\n");
            for tip in &failure.tips {
                output.push_str(&format!("  - {}\n", tip));
            }
        }
        return output;
    }
    if let Some(rows) = &response.results {
        output.push_str(&heading("=== Query Results ===", opts));
        output.push('\n');
        output.push_str(&format_rows(rows));
    }
    output
}

/// Column names of a row set: the first row's keys, in order
pub fn columns(rows: &RowSet) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Render one cell: scalars as text, `null` as `NULL`, nested values as JSON
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("NULL"),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => serde_json::to_string(nested).unwrap_or_default()
    }
}

/// Render rows as an aligned text table
pub fn format_rows(rows: &RowSet) -> String {
    if rows.is_empty() {
        return String::from("No results found\n");
    }
    let headers = columns(rows);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|col| row.get(*col).map(format_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_line(&mut table, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut table, rule.iter().map(String::as_str), &widths);
    for line in &cells {
        push_line(&mut table, line.iter().map(String::as_str), &widths);
    }
    let noun = if rows.len() == 1 { "row" } else { "rows" };
    table.push_str(&format!("({} {})\n", rows.len(), noun));
    table
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Format the post listing
pub fn format_posts(posts: &[PostWithAuthor], opts: &OutputOptions) -> String {
    if let Some(structured) = serialize(posts, opts.format) {
        return structured;
    }
    if posts.is_empty() {
        return String::from("No posts yet\n");
    }
    let mut output = String::new();
    for entry in posts {
        output.push_str(&heading(&entry.post.title, opts));
        output.push('\n');
        let author = entry
            .author
            .name
            .as_deref()
            .unwrap_or(&entry.author.email);
        output.push_str(&format!(
            "  by {} on {} (id {})\n",
            author, entry.post.created_at, entry.post.id
        ));
        if let Some(content) = entry.post.content.as_deref().filter(|c| !c.is_empty()) {
            output.push_str(&format!("  {}\n", content));
        }
        output.push('\n');
    }
    output
}

/// Format the user listing
pub fn format_users(users: &[User], opts: &OutputOptions) -> String {
    if let Some(structured) = serialize(users, opts.format) {
        return structured;
    }
    if users.is_empty() {
        return String::from("No users yet\n");
    }
    let mut output = String::new();
    for user in users {
        let name = user.name.as_deref().unwrap_or("-");
        output.push_str(&format!("{}  {}  {}\n", user.id, user.email, name));
    }
    output
}

/// Format the AI greeting
pub fn format_greeting(result: &GreetingResult<'_>, opts: &OutputOptions) -> String {
    if let Some(structured) = serialize(result, opts.format) {
        return structured;
    }
    format!("{}\n{}\n", heading("=== AI Greeting ===", opts), result.message)
}

/// Format the result of a write command.
///
/// Structured formats serialize `record`; text output prints `message`.
pub fn format_confirmation<T: Serialize + ?Sized>(
    record: &T,
    message: &str,
    opts: &OutputOptions
) -> String {
    if let Some(structured) = serialize(record, opts.format) {
        return structured;
    }
    format!("{}\n", message)
}
