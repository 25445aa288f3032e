//! Table detection over layout-preserved page text.
//!
//! A table is a run of at least three consecutive lines that split into the
//! same number (two or more) of cells. Cells are separated by `|`, tabs, or
//! runs of two or more spaces. Runs whose cells read like sentences are
//! prose laid out in columns, not tables, and are dropped.

use std::sync::OnceLock;

use regex::Regex;

/// Minimum consecutive rows for a run of lines to count as a table.
pub const MIN_TABLE_ROWS: usize = 3;

/// Runs averaging more words per cell than this are prose.
const MAX_MEAN_WORDS_PER_CELL: f64 = 4.0;

/// A detected table: rows of cell values, first row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn column_gap() -> &'static Regex {
    static GAP: OnceLock<Regex> = OnceLock::new();
    GAP.get_or_init(|| Regex::new(r"\t+|\s{2,}").expect("valid column gap regex"))
}

/// Split one line into cells. Returns fewer than two cells for prose.
pub fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.contains('|') {
        let inner = trimmed.trim_start_matches('|').trim_end_matches('|');
        return inner.split('|').map(|c| c.trim().to_string()).collect();
    }

    column_gap()
        .split(trimmed)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Ruled separator lines such as `|----|----|` or `+----+----+`.
fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed
            .chars()
            .all(|ch| matches!(ch, '-' | ':' | '+' | '|' | '=' | ' '))
}

/// A cell that ends a sentence: a letter followed by `.`, `!`, or `?`.
fn ends_sentence(cell: &str) -> bool {
    let mut chars = cell.chars().rev();
    matches!(chars.next(), Some('.' | '!' | '?'))
        && chars.next().is_some_and(char::is_alphabetic)
}

/// Whether a run of aligned lines reads like text set in columns.
fn looks_like_prose(rows: &[Vec<String>]) -> bool {
    let cells: Vec<&String> = rows.iter().flatten().filter(|c| !c.is_empty()).collect();
    if cells.is_empty() {
        return false;
    }
    let words: usize = cells.iter().map(|c| c.split_whitespace().count()).sum();
    let mean_words = words as f64 / cells.len() as f64;
    let sentences = cells.iter().filter(|c| ends_sentence(c)).count();
    mean_words > MAX_MEAN_WORDS_PER_CELL || sentences * 2 > cells.len()
}

/// Find all tables in a page of layout text.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    let mut flush = |run: &mut Vec<Vec<String>>| {
        if run.len() >= MIN_TABLE_ROWS && !looks_like_prose(run) {
            tables.push(Table {
                rows: std::mem::take(run),
            });
        } else {
            run.clear();
        }
    };

    for line in text.lines() {
        if is_rule(line) {
            continue;
        }
        let cells = split_cells(line);
        if cells.len() < 2 {
            flush(&mut run);
            continue;
        }
        if run.first().is_some_and(|first| first.len() != cells.len()) {
            flush(&mut run);
        }
        run.push(cells);
    }
    flush(&mut run);

    tables
}

/// Whether a page of layout text contains at least one table.
pub fn has_table(text: &str) -> bool {
    !detect_tables(text).is_empty()
}
