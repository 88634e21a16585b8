use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{MessageStatus, RecipientType};

// -- Recipients --

/// Body for both creating and overwriting a recipient row.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipientRequest {
    #[serde(rename = "type")]
    pub kind: RecipientType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct RecipientResponse {
    pub index: usize,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecipientType,
    pub name: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteRecipientResponse {
    /// Schedule rows still pointing at the removed id.
    pub dangling_references: usize,
}

// -- Scheduled messages --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub text: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// A recipient label (`"Name | id"`) or a bare id.
    #[serde(default)]
    pub recipient: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub text: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Omit to keep the stored recipient.
    pub recipient: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub index: usize,
    pub send_at: String,
    /// `send_at` resolved in the configured zone; `None` if the stored value
    /// could not be read.
    pub scheduled_for: Option<DateTime<FixedOffset>>,
    pub text: String,
    pub recipient_id: String,
    pub status: MessageStatus,
    pub summary: String,
}

/// Form values for the "new message" form. Returned as defaults and echoed
/// back after a successful create so the caller can keep the form filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub text: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub recipient: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageResponse {
    pub message: MessageResponse,
    pub draft: MessageDraft,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
