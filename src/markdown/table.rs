//! Pipe table rows and separator lines.

use super::types::TableAlign;

/// Split a table row into trimmed cells.
///
/// One optional leading and trailing `|` is stripped first. There are no
/// escape sequences; every `|` is a cell boundary.
pub fn split_row(line: &str) -> Vec<String> {
    let mut row = line.trim();
    row = row.strip_prefix('|').unwrap_or(row);
    row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Parse a separator row such as `|---|:--:|--:|`.
///
/// Every cell may only contain `-`, `:` and spaces and must contain at least
/// one `-`. Returns one alignment per column.
pub fn parse_separator(line: &str) -> Option<Vec<TableAlign>> {
    if !line.contains('|') {
        return None;
    }

    split_row(line)
        .iter()
        .map(|cell| {
            let valid = cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':' | ' '));
            valid.then(|| {
                match (cell.starts_with(':'), cell.ends_with(':')) {
                    (true, true) => TableAlign::Center,
                    (false, true) => TableAlign::Right,
                    _ => TableAlign::Left,
                }
            })
        })
        .collect()
}

/// Whether a line could be the header row of a table
pub fn is_header_candidate(line: &str) -> bool {
    if !line.contains('|') {
        return false;
    }
    let trimmed = line.trim_start();
    trimmed.starts_with('|') || trimmed.starts_with(|c: char| c.is_alphanumeric())
}

/// Pad with empty cells or truncate so the row has `columns` cells
pub fn fit_row(mut cells: Vec<String>, columns: usize) -> Vec<String> {
    cells.resize(columns, String::new());
    cells
}
