use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separates a recipient's name from its id in a display label.
pub const LABEL_SEPARATOR: char = '|';

/// Characters of message text shown in a schedule summary line.
pub const SUMMARY_CHARS: usize = 30;

// -- Recipients --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientType {
    Person,
    Group,
}

impl RecipientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Group => "Group",
        }
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown recipient type: {0:?}")]
pub struct UnknownRecipientType(pub String);

impl FromStr for RecipientType {
    type Err = UnknownRecipientType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Person" => Ok(Self::Person),
            "Group" => Ok(Self::Group),
            other => Err(UnknownRecipientType(other.to_string())),
        }
    }
}

/// A messaging-platform target: one person or a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Platform id, `U...` for users and `C...` for groups. Not enforced.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecipientType,
    /// May be empty for groups.
    pub name: String,
}

impl Recipient {
    /// `"{name} | {id}"`, the form shown when picking a recipient.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.name, LABEL_SEPARATOR, self.id)
    }
}

/// Pulls the id back out of a label: the trimmed text after the last separator.
/// A string with no separator is taken to be a bare id.
pub fn extract_id(label: &str) -> &str {
    label
        .rsplit(LABEL_SEPARATOR)
        .next()
        .unwrap_or(label)
        .trim()
}

// -- Scheduled messages --

/// Row status. Only `Pending` is written here; the dispatcher owns every
/// other transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageStatus {
    Pending,
    Sent,
    Other(String),
}

impl MessageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Sent => "Sent",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MessageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => Self::Pending,
            "Sent" => Self::Sent,
            _ => Self::Other(s),
        }
    }
}

impl From<MessageStatus> for String {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to send `text` to `recipient_id` at `send_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    /// Stored form, `"YYYY-MM-DD HH:MM"` wall-clock time in the configured zone.
    pub send_at: String,
    pub text: String,
    pub recipient_id: String,
    pub status: MessageStatus,
}

impl ScheduledMessage {
    /// One-line caption: `"{send_at} | {first 30 chars}..."`.
    pub fn summary(&self) -> String {
        let head: String = self.text.chars().take(SUMMARY_CHARS).collect();
        format!("{} {} {}...", self.send_at, LABEL_SEPARATOR, head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Recipient {
        Recipient {
            id: "U1".into(),
            kind: RecipientType::Person,
            name: "Alice".into(),
        }
    }

    #[test]
    fn label_round_trips_to_id() {
        let r = alice();
        assert_eq!(r.label(), "Alice | U1");
        assert_eq!(extract_id(&r.label()), "U1");
    }

    #[test]
    fn unnamed_group_label_still_yields_id() {
        let r = Recipient {
            id: "C42".into(),
            kind: RecipientType::Group,
            name: String::new(),
        };
        assert_eq!(r.label(), " | C42");
        assert_eq!(extract_id(&r.label()), "C42");
    }

    #[test]
    fn separator_in_name_uses_last_segment() {
        let r = Recipient {
            id: "U7".into(),
            kind: RecipientType::Person,
            name: "Ops | Night shift".into(),
        };
        assert_eq!(extract_id(&r.label()), "U7");
    }

    #[test]
    fn bare_id_is_its_own_label() {
        assert_eq!(extract_id("  U99 "), "U99");
    }

    #[test]
    fn recipient_type_parses_exact_names() {
        assert_eq!("Person".parse::<RecipientType>().unwrap(), RecipientType::Person);
        assert_eq!("Group".parse::<RecipientType>().unwrap(), RecipientType::Group);
        assert!("group".parse::<RecipientType>().is_err());
    }

    #[test]
    fn status_keeps_unknown_values() {
        assert_eq!(MessageStatus::from("Pending".to_string()), MessageStatus::Pending);
        assert_eq!(MessageStatus::from("Sent".to_string()), MessageStatus::Sent);
        let failed = MessageStatus::from("Failed".to_string());
        assert_eq!(failed.as_str(), "Failed");
        assert_eq!(String::from(failed), "Failed");
    }

    #[test]
    fn summary_truncates_to_thirty_chars() {
        let msg = ScheduledMessage {
            send_at: "2024-01-01 09:00".into(),
            text: "สวัสดีครับ ".repeat(10),
            recipient_id: "U1".into(),
            status: MessageStatus::Pending,
        };
        let summary = msg.summary();
        assert!(summary.starts_with("2024-01-01 09:00 | "));
        assert!(summary.ends_with("..."));
        let head = summary
            .trim_start_matches("2024-01-01 09:00 | ")
            .trim_end_matches("...");
        assert_eq!(head.chars().count(), SUMMARY_CHARS);
    }

    #[test]
    fn recipient_serializes_type_field() {
        let json = serde_json::to_value(alice()).unwrap();
        assert_eq!(json["type"], "Person");
        assert_eq!(json["id"], "U1");
    }
}
