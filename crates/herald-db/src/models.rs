//! Table and row types shared by every store.
//! Rows are flat lists of strings in the table's fixed column order.

/// Header occupies row 1; data index `i` lives at row `i + FIRST_DATA_ROW`.
pub const FIRST_DATA_ROW: usize = 2;

pub const SCHEDULE_COLUMNS: [&str; 4] = ["Datetime", "Message", "TargetID", "Status"];
pub const RECIPIENT_COLUMNS: [&str; 3] = ["TargetID", "Type", "Name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Schedule,
    Recipients,
}

impl Table {
    /// Key the table is stored under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Recipients => "recipients",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Schedule => &SCHEDULE_COLUMNS,
            Self::Recipients => &RECIPIENT_COLUMNS,
        }
    }

    pub fn width(&self) -> usize {
        self.columns().len()
    }

    /// 1-based column number of `name`.
    pub fn column_number(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == name).map(|i| i + 1)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Row number in the backing table for in-memory list position `index`.
pub fn row_number(index: usize) -> usize {
    index + FIRST_DATA_ROW
}

/// Inverse of [`row_number`]; `None` for the header row and below.
pub fn data_index(row_number: usize) -> Option<usize> {
    row_number.checked_sub(FIRST_DATA_ROW)
}

/// One data row, always exactly as wide as its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub table: Table,
    pub values: Vec<String>,
}

impl Row {
    /// Pads short input with empty cells; extra cells are dropped.
    pub fn new(table: Table, mut values: Vec<String>) -> Self {
        values.resize(table.width(), String::new());
        Self { table, values }
    }

    /// Cell by column name; unknown columns read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.table
            .column_number(column)
            .and_then(|n| self.values.get(n - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

}
