use tracing::{info, warn};

use herald_db::{Row, Table, TableStore, row_number};
use herald_types::models::{Recipient, RecipientType};

use crate::error::{ApiError, ApiResult};
use crate::rules::{self, RecipientIndex};

/// The recipient table. Rows are addressed by list position.
pub struct Directory<'a> {
    store: &'a dyn TableStore,
}

impl<'a> Directory<'a> {
    pub fn new(store: &'a dyn TableStore) -> Self {
        Self { store }
    }

    /// All recipients in table order. Empty is a normal state.
    pub fn list(&self) -> ApiResult<Vec<Recipient>> {
        Ok(self
            .store
            .read_all(Table::Recipients)?
            .iter()
            .map(recipient_from_row)
            .collect())
    }

    pub fn index(&self) -> ApiResult<RecipientIndex> {
        Ok(RecipientIndex::new(&self.list()?))
    }

    pub fn create(&self, kind: RecipientType, name: &str, id: &str) -> ApiResult<Recipient> {
        rules::require_recipient_fields(kind, name, id)?;

        let recipient = Recipient {
            id: id.to_string(),
            kind,
            name: name.to_string(),
        };
        self.store.append_row(Table::Recipients, &recipient_to_row(&recipient))?;

        info!("Recipient added: {}", recipient.label());
        Ok(recipient)
    }

    /// Overwrites all three fields. Unlike `create`, no field checks apply.
    pub fn update(&self, index: usize, kind: RecipientType, name: &str, id: &str) -> ApiResult<Recipient> {
        self.check_index(index)?;

        let recipient = Recipient {
            id: id.to_string(),
            kind,
            name: name.to_string(),
        };
        self.store.update_range(
            Table::Recipients,
            row_number(index),
            1,
            &recipient_to_row(&recipient),
        )?;

        info!("Recipient {} updated: {}", index, recipient.label());
        Ok(recipient)
    }

    /// Removes the row; later indices shift down. Schedule rows that still
    /// reference the id are left alone and their count is returned.
    pub fn delete(&self, index: usize) -> ApiResult<usize> {
        let recipients = self.list()?;
        let removed = recipients.get(index).ok_or(ApiError::NotFound {
            index,
            len: recipients.len(),
        })?;

        self.store.delete_row(Table::Recipients, row_number(index))?;

        let dangling = self
            .store
            .read_all(Table::Schedule)?
            .iter()
            .filter(|row| row.get("TargetID") == removed.id)
            .count();

        info!("Recipient {} deleted: {}", index, removed.label());
        if dangling > 0 {
            warn!(
                "{} scheduled message(s) still reference deleted recipient {}",
                dangling, removed.id
            );
        }
        Ok(dangling)
    }

    fn check_index(&self, index: usize) -> ApiResult<()> {
        let len = self.store.read_all(Table::Recipients)?.len();
        if index >= len {
            return Err(ApiError::NotFound { index, len });
        }
        Ok(())
    }
}

fn recipient_from_row(row: &Row) -> Recipient {
    let raw_type = row.get("Type");
    let kind = raw_type.parse().unwrap_or_else(|_| {
        warn!("Unknown recipient type {:?} for {}, treating as Group", raw_type, row.get("TargetID"));
        RecipientType::Group
    });
    Recipient {
        id: row.get("TargetID").to_string(),
        kind,
        name: row.get("Name").to_string(),
    }
}

fn recipient_to_row(r: &Recipient) -> Vec<String> {
    vec![r.id.clone(), r.kind.to_string(), r.name.clone()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_db::MemoryTables;

    fn seeded() -> MemoryTables {
        let store = MemoryTables::new();
        let dir = Directory::new(&store);
        dir.create(RecipientType::Person, "Alice", "U1").unwrap();
        dir.create(RecipientType::Group, "", "C1").unwrap();
        store
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let store = MemoryTables::new();
        assert!(Directory::new(&store).list().unwrap().is_empty());
    }

    #[test]
    fn create_appends_in_order() {
        let store = seeded();
        let list = Directory::new(&store).list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].label(), "Alice | U1");
        assert_eq!(list[1].kind, RecipientType::Group);
        assert_eq!(list[1].name, "");
    }

    #[test]
    fn create_without_id_fails_and_writes_nothing() {
        let store = MemoryTables::new();
        let dir = Directory::new(&store);
        for kind in [RecipientType::Person, RecipientType::Group] {
            assert!(matches!(dir.create(kind, "Alice", ""), Err(ApiError::Validation(_))));
        }
        assert!(matches!(
            dir.create(RecipientType::Person, "", "U1"),
            Err(ApiError::Validation(_))
        ));
        assert!(dir.list().unwrap().is_empty());
    }

    #[test]
    fn update_overwrites_without_checks() {
        let store = seeded();
        let dir = Directory::new(&store);
        dir.update(0, RecipientType::Person, "", "U1").unwrap();
        assert_eq!(dir.list().unwrap()[0].name, "");
    }

    #[test]
    fn update_and_delete_past_end_are_not_found() {
        let store = seeded();
        let dir = Directory::new(&store);
        assert!(matches!(
            dir.update(2, RecipientType::Person, "Zed", "U9"),
            Err(ApiError::NotFound { index: 2, len: 2 })
        ));
        assert!(matches!(dir.delete(5), Err(ApiError::NotFound { index: 5, len: 2 })));
        assert_eq!(dir.list().unwrap().len(), 2);
    }

    #[test]
    fn delete_reports_dangling_schedule_rows() {
        let store = seeded();
        for target in ["U1", "C1", "U1"] {
            store
                .append_row(
                    Table::Schedule,
                    &["2024-01-01 09:00".into(), "hi".into(), target.into(), "Pending".into()],
                )
                .unwrap();
        }

        let dir = Directory::new(&store);
        assert_eq!(dir.delete(0).unwrap(), 2);
        let list = dir.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "C1");
        assert_eq!(store.read_all(Table::Schedule).unwrap().len(), 3);
    }

    #[test]
    fn unknown_stored_type_reads_as_group() {
        let store = MemoryTables::new();
        store
            .append_row(Table::Recipients, &["C7".into(), "Room".into(), "Lobby".into()])
            .unwrap();
        let list = Directory::new(&store).list().unwrap();
        assert_eq!(list[0].kind, RecipientType::Group);
    }
}
