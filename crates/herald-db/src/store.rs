use anyhow::Result;
use thiserror::Error;

use crate::models::{Row, Table, data_index};

/// Errors a store raises for bad coordinates or shapes, as opposed to I/O
/// failures. Callers can downcast to tell a stale index from a broken store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("row {row} is outside {table} ({rows} data rows)")]
    RowOutOfRange { table: Table, row: usize, rows: usize },

    #[error("columns {first}..{last} are outside {table} ({width} columns)")]
    ColumnOutOfRange {
        table: Table,
        first: usize,
        last: usize,
        width: usize,
    },

    #[error("{got} values do not fit {table} ({width} columns)")]
    TooManyValues { table: Table, got: usize, width: usize },
}

/// The tabular backend both tables live in.
///
/// Row and column numbers are 1-based and count the header row, so the first
/// data row is row 2 (see [`crate::models::row_number`]).
pub trait TableStore: Send + Sync {
    /// All data rows in table order.
    fn read_all(&self, table: Table) -> Result<Vec<Row>>;

    /// Appends after the last row. Short input is padded with empty cells.
    fn append_row(&self, table: Table, values: &[String]) -> Result<()>;

    fn update_cell(&self, table: Table, row: usize, column: usize, value: &str) -> Result<()>;

    /// Writes `values` into consecutive cells of one row, starting at
    /// `first_column`, as a single write.
    fn update_range(&self, table: Table, row: usize, first_column: usize, values: &[String]) -> Result<()>;

    /// Removes a row; later rows move up by one.
    fn delete_row(&self, table: Table, row: usize) -> Result<()>;
}

/// Maps a row number onto a data index, checking it against `rows`.
pub(crate) fn check_row(table: Table, row: usize, rows: usize) -> Result<usize, StoreError> {
    match data_index(row) {
        Some(idx) if idx < rows => Ok(idx),
        _ => Err(StoreError::RowOutOfRange { table, row, rows }),
    }
}

/// Checks that `count` cells starting at `first_column` fit the table and
/// returns the 0-based offset of the first one.
pub(crate) fn check_span(table: Table, first_column: usize, count: usize) -> Result<usize, StoreError> {
    let width = table.width();
    let last = first_column + count.saturating_sub(1);
    if first_column == 0 || last > width {
        return Err(StoreError::ColumnOutOfRange {
            table,
            first: first_column,
            last,
            width,
        });
    }
    Ok(first_column - 1)
}

pub(crate) fn check_width(table: Table, values: &[String]) -> Result<Vec<String>, StoreError> {
    if values.len() > table.width() {
        return Err(StoreError::TooManyValues {
            table,
            got: values.len(),
            width: table.width(),
        });
    }
    Ok(Row::new(table, values.to_vec()).values)
}
