use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Result, anyhow};

use crate::models::{Row, Table};
use crate::store::{self, TableStore};

/// Process-local store. Nothing survives a restart; used by tests and for
/// throwaway runs.
#[derive(Default)]
pub struct MemoryTables {
    tables: RwLock<HashMap<Table, Vec<Vec<String>>>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<F, T>(&self, table: Table, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Vec<String>>) -> Result<T>,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Table lock poisoned: {}", e))?;
        f(tables.entry(table).or_default())
    }
}

impl TableStore for MemoryTables {
    fn read_all(&self, table: Table) -> Result<Vec<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Table lock poisoned: {}", e))?;
        Ok(tables
            .get(&table)
            .map(|rows| rows.iter().map(|r| Row::new(table, r.clone())).collect())
            .unwrap_or_default())
    }

    fn append_row(&self, table: Table, values: &[String]) -> Result<()> {
        let cells = store::check_width(table, values)?;
        self.write(table, |rows| {
            rows.push(cells);
            Ok(())
        })
    }

    fn update_cell(&self, table: Table, row: usize, column: usize, value: &str) -> Result<()> {
        self.update_range(table, row, column, &[value.to_string()])
    }

    fn update_range(&self, table: Table, row: usize, first_column: usize, values: &[String]) -> Result<()> {
        let offset = store::check_span(table, first_column, values.len())?;
        self.write(table, |rows| {
            let idx = store::check_row(table, row, rows.len())?;
            rows[idx][offset..offset + values.len()].clone_from_slice(values);
            Ok(())
        })
    }

    fn delete_row(&self, table: Table, row: usize) -> Result<()> {
        self.write(table, |rows| {
            let idx = store::check_row(table, row, rows.len())?;
            rows.remove(idx);
            Ok(())
        })
    }
}
