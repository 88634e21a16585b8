use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::info;

use herald_db::{Row, Table, TableStore, row_number};
use herald_types::api::MessageDraft;
use herald_types::models::{MessageStatus, ScheduledMessage};

use crate::directory::Directory;
use crate::error::{ApiError, ApiResult};
use crate::rules;

/// The schedule table. Every row written here starts out `Pending`; the
/// dispatcher that sends messages is not part of this crate.
pub struct Schedule<'a> {
    store: &'a dyn TableStore,
    tz: Tz,
}

impl<'a> Schedule<'a> {
    pub fn new(store: &'a dyn TableStore, tz: Tz) -> Self {
        Self { store, tz }
    }

    pub fn list(&self) -> ApiResult<Vec<ScheduledMessage>> {
        Ok(self
            .store
            .read_all(Table::Schedule)?
            .iter()
            .map(message_from_row)
            .collect())
    }

    /// Appends a `Pending` row. `recipient` is a label or bare id and must
    /// name someone in the directory right now.
    pub fn create(
        &self,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
        recipient: &str,
    ) -> ApiResult<ScheduledMessage> {
        rules::require_message_text(text)?;

        let index = Directory::new(self.store).index()?;
        let recipient = index.resolve(recipient)?;
        let send_at = rules::localize(date, time, self.tz)?;

        let message = ScheduledMessage {
            send_at: rules::format_send_at(&send_at),
            text: text.to_string(),
            recipient_id: recipient.id.clone(),
            status: MessageStatus::Pending,
        };
        self.store.append_row(Table::Schedule, &message_to_row(&message))?;

        info!("Message scheduled for {} to {}", message.send_at, message.recipient_id);
        Ok(message)
    }

    /// Rewrites time, text and recipient in one write; status is kept.
    /// With no `recipient` the stored id stays, even if it has since left
    /// the directory.
    pub fn update(
        &self,
        index: usize,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
        recipient: Option<&str>,
    ) -> ApiResult<ScheduledMessage> {
        let messages = self.list()?;
        let current = messages.get(index).ok_or(ApiError::NotFound {
            index,
            len: messages.len(),
        })?;

        let recipient_id = match recipient {
            Some(selection) => Directory::new(self.store).index()?.resolve(selection)?.id.clone(),
            None => current.recipient_id.clone(),
        };
        let send_at = rules::localize(date, time, self.tz)?;

        let message = ScheduledMessage {
            send_at: rules::format_send_at(&send_at),
            text: text.to_string(),
            recipient_id,
            status: current.status.clone(),
        };
        self.store.update_range(
            Table::Schedule,
            row_number(index),
            1,
            &[
                message.send_at.clone(),
                message.text.clone(),
                message.recipient_id.clone(),
            ],
        )?;

        info!("Message {} updated: {}", index, message.summary());
        Ok(message)
    }

    pub fn delete(&self, index: usize) -> ApiResult<()> {
        let len = self.store.read_all(Table::Schedule)?.len();
        if index >= len {
            return Err(ApiError::NotFound { index, len });
        }
        self.store.delete_row(Table::Schedule, row_number(index))?;

        info!("Message {} deleted", index);
        Ok(())
    }

    /// Defaults for a blank "new message" form.
    pub fn draft(&self, now: DateTime<Utc>) -> ApiResult<MessageDraft> {
        let at = rules::next_minute(now, self.tz);
        let index = Directory::new(self.store).index()?;
        Ok(MessageDraft {
            text: String::new(),
            date: at.date(),
            time: at.time(),
            recipient: index.first().map(|r| r.label()),
        })
    }
}

fn message_from_row(row: &Row) -> ScheduledMessage {
    ScheduledMessage {
        send_at: row.get("Datetime").to_string(),
        text: row.get("Message").to_string(),
        recipient_id: row.get("TargetID").to_string(),
        status: MessageStatus::from(row.get("Status").to_string()),
    }
}

fn message_to_row(m: &ScheduledMessage) -> Vec<String> {
    vec![
        m.send_at.clone(),
        m.text.clone(),
        m.recipient_id.clone(),
        m.status.to_string(),
    ]
}
