//! Output formatting helpers for human-readable and JSON output.

use feedvault::{feed::PersistOutcome, vault::LoginEntry};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Calculate column widths (max of header and all row values)
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    println!("{}", format_row(headers.iter().copied(), &widths));
    for row in rows {
        println!("{}", format_row(row.iter().map(String::as_str), &widths));
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    line.join("  ").trim_end().to_string()
}

/// JSON form of a login. The password is only included when asked for.
pub fn login_json(id: &str, entry: &LoginEntry, with_password: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": id,
        "name": entry.name,
        "username": entry.username,
    });
    if with_password {
        value["password"] = serde_json::Value::from(entry.password.as_str());
    }
    value
}

/// One-line description of what happened on the feed.
pub fn describe_persist(persisted: &feedvault::Result<PersistOutcome>) -> String {
    match persisted {
        Ok(PersistOutcome::Posted { epoch }) => format!("saved to feed ({epoch})"),
        Ok(PersistOutcome::Coalesced) => "queued behind an in-flight save".to_string(),
        Err(e) => format!("saved locally only: {e}"),
    }
}
