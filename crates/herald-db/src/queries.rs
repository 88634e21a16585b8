use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::Database;
use crate::models::{Row, Table};
use crate::store::{self, TableStore};

impl TableStore for Database {
    fn read_all(&self, table: Table) -> Result<Vec<Row>> {
        self.with_conn(|conn| query_rows(conn, table))
    }

    fn append_row(&self, table: Table, values: &[String]) -> Result<()> {
        let cells = serde_json::to_string(&store::check_width(table, values)?)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sheet_rows (sheet, cells) VALUES (?1, ?2)",
                (table.name(), &cells),
            )?;
            Ok(())
        })
    }

    fn update_cell(&self, table: Table, row: usize, column: usize, value: &str) -> Result<()> {
        self.update_range(table, row, column, &[value.to_string()])
    }

    fn update_range(&self, table: Table, row: usize, first_column: usize, values: &[String]) -> Result<()> {
        let offset = store::check_span(table, first_column, values.len())?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let (seq, mut cells) = locate_row(&tx, table, row)?;
            cells[offset..offset + values.len()].clone_from_slice(values);
            tx.execute(
                "UPDATE sheet_rows SET cells = ?1, updated_at = datetime('now') WHERE seq = ?2",
                rusqlite::params![serde_json::to_string(&cells)?, seq],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    fn delete_row(&self, table: Table, row: usize) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let (seq, _) = locate_row(&tx, table, row)?;
            tx.execute("DELETE FROM sheet_rows WHERE seq = ?1", [seq])?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn query_rows(conn: &Connection, table: Table) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare("SELECT cells FROM sheet_rows WHERE sheet = ?1 ORDER BY seq")?;

    let raw = stmt
        .query_map([table.name()], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.iter()
        .map(|cells| Ok(Row::new(table, decode_cells(table, cells)?)))
        .collect()
}

fn count_rows(conn: &Connection, table: Table) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sheet_rows WHERE sheet = ?1",
        [table.name()],
        |r| r.get(0),
    )?;
    Ok(count as usize)
}

/// Finds the storage key and padded cells behind a 1-based row number.
fn locate_row(conn: &Connection, table: Table, row: usize) -> Result<(i64, Vec<String>)> {
    let idx = store::check_row(table, row, count_rows(conn, table)?)?;

    let (seq, cells): (i64, String) = conn.query_row(
        "SELECT seq, cells FROM sheet_rows WHERE sheet = ?1 ORDER BY seq LIMIT 1 OFFSET ?2",
        rusqlite::params![table.name(), idx as i64],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;

    Ok((seq, Row::new(table, decode_cells(table, &cells)?).values))
}

fn decode_cells(table: Table, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("corrupt row in {table}: {raw}"))
}
