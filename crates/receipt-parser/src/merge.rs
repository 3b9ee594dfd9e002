//! Combines every per-document table into one, tagging rows with their source.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::error::MergeError;
use crate::outputs::OutputDirectory;
use crate::sanitize;
use crate::table::{Cell, Table, TableCodec};

/// Column appended to the combined table naming each row's origin.
pub const SOURCE_COLUMN: &str = "Source";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Merged table file names, in merge order.
    pub sources: Vec<String>,
}

pub struct MergeEngine {
    outputs: OutputDirectory,
    codec: Arc<dyn TableCodec>,
}

impl MergeEngine {
    pub fn new(outputs: OutputDirectory, codec: Arc<dyn TableCodec>) -> Self {
        Self { outputs, codec }
    }

    /// Regenerates the combined table from the current output tables.
    pub fn merge(&self) -> Result<MergeSummary, MergeError> {
        let tables = self.outputs.list_tables()?;
        if tables.is_empty() {
            return Err(MergeError::NoOutputsAvailable);
        }

        let mut sources = Vec::with_capacity(tables.len());
        let mut loaded = Vec::with_capacity(tables.len());
        for path in &tables {
            let table = self.codec.read_table(path)?;
            sources.push(sanitize::redact_path(path));
            loaded.push(table);
        }

        let combined = combine(&loaded, &sources);
        let path = self.outputs.combined_path();
        self.codec.write_table(&combined, &path)?;

        info!(
            "Merged {} rows from {} tables into {}",
            combined.len(),
            sources.len(),
            sanitize::redact_path(&path)
        );

        Ok(MergeSummary {
            path,
            rows: combined.len(),
            sources,
        })
    }
}

/// Concatenates `tables` row-wise.
///
/// Columns are the union of all input columns in first-seen order, then
/// `Source`. Cells a table has no column for stay empty.
pub fn combine(tables: &[Table], sources: &[String]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for table in tables {
        for column in &table.columns {
            if column != SOURCE_COLUMN && !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut combined = Table::new(columns.iter().cloned().chain([SOURCE_COLUMN.to_string()]));

    for (table, source) in tables.iter().zip(sources) {
        let mapping: Vec<Option<usize>> = columns
            .iter()
            .map(|c| table.column_index(c))
            .collect();

        for row in &table.rows {
            let mut cells: Vec<Cell> = mapping
                .iter()
                .map(|index| {
                    index
                        .and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or(Cell::Empty)
                })
                .collect();
            cells.push(Cell::text(source.as_str()));
            combined.push_row(cells);
        }
    }

    combined
}
