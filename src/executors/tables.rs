//! Tables executor: scan every page's layout text and write what it finds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{ExecutionContext, ExecutorError};
use crate::tables::{detect_tables, Table};

/// Subdirectory of the output directory that receives table files.
pub const TABLES_DIR: &str = "tables";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Json,
}

impl TableFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum TablesOutcome {
    Found {
        tables_found: usize,
        files_created: Vec<PathBuf>,
        directory: PathBuf,
        format: TableFormat,
    },
    /// No tables anywhere in the document. Still a success.
    None { message: String },
}

/// A detected table with its position in the document.
#[derive(Debug, Clone)]
pub struct LocatedTable {
    /// 1-based page number.
    pub page: usize,
    /// 1-based index within the page.
    pub table: usize,
    pub data: Table,
}

/// Quote one CSV field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a table as CSV with CRLF row endings.
pub fn to_csv(table: &Table) -> String {
    let mut out = String::new();
    for row in &table.rows {
        let line: Vec<String> = row.iter().map(|cell| csv_field(cell)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

/// JSON keys for each column, in column order.
///
/// Blank or missing headers become `Col_<index>`; a repeated name gets a
/// `_<index>` suffix so no column overwrites another.
pub fn record_keys(table: &Table) -> Vec<String> {
    let header = table.header();
    let mut keys: Vec<String> = Vec::with_capacity(table.columns());
    for index in 0..table.columns() {
        let mut key = match header.get(index) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Col_{}", index),
        };
        if keys.contains(&key) {
            key = format!("{}_{}", key, index);
        }
        keys.push(key);
    }
    keys
}

/// Data rows keyed by [`record_keys`], keys in column order.
pub fn to_records(table: &Table) -> Vec<Map<String, Value>> {
    let keys = record_keys(table);
    table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            keys.iter()
                .zip(row)
                .map(|(key, cell)| (key.clone(), Value::String(cell.clone())))
                .collect()
        })
        .collect()
}

pub fn csv_file_name(stem: &str, page: usize, table: usize) -> String {
    format!("{}_page{}_table{}.csv", stem, page, table)
}

pub fn json_file_name(stem: &str) -> String {
    format!("{}_tables.json", stem)
}

fn scan(ctx: &ExecutionContext<'_>) -> Result<Vec<LocatedTable>, ExecutorError> {
    let mut found = Vec::new();
    for index in 0..ctx.source.page_count() {
        let text = ctx.source.layout_text(index)?;
        let tables = detect_tables(&text);
        if !tables.is_empty() {
            tracing::info!("page {}: {} table(s)", index + 1, tables.len());
        }
        found.extend(
            tables
                .into_iter()
                .enumerate()
                .map(|(position, data)| LocatedTable {
                    page: index + 1,
                    table: position + 1,
                    data,
                }),
        );
    }
    Ok(found)
}

pub(super) fn run(
    ctx: &ExecutionContext<'_>,
    format: TableFormat,
) -> Result<TablesOutcome, ExecutorError> {
    let found = scan(ctx)?;
    if found.is_empty() {
        return Ok(TablesOutcome::None {
            message: "No tables found in document".to_string(),
        });
    }

    let directory = ctx.output_path(TABLES_DIR);
    std::fs::create_dir_all(&directory)?;
    let stem = ctx.stem();

    let files_created = match format {
        TableFormat::Csv => {
            let mut files = Vec::with_capacity(found.len());
            for located in &found {
                let file = directory.join(csv_file_name(&stem, located.page, located.table));
                std::fs::write(&file, to_csv(&located.data))?;
                files.push(file);
            }
            files
        }
        TableFormat::Json => {
            let entries: Vec<Value> = found
                .iter()
                .map(|located| {
                    json!({
                        "page": located.page,
                        "table": located.table,
                        "rows": to_records(&located.data),
                    })
                })
                .collect();
            let file = directory.join(json_file_name(&stem));
            std::fs::write(&file, serde_json::to_string_pretty(&entries)?)?;
            vec![file]
        }
    };

    Ok(TablesOutcome::Found {
        tables_found: found.len(),
        files_created,
        directory,
        format,
    })
}
