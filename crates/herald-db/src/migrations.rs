use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Both tables share one physical table keyed by sheet name. `seq` gives the
/// row order; `cells` is a JSON array of strings in column order.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (sheet rows)");
        conn.execute_batch(
            "
            CREATE TABLE sheet_rows (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                sheet       TEXT NOT NULL,
                cells       TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_sheet_rows_sheet
                ON sheet_rows(sheet, seq);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
