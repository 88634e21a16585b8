//! Validation and formatting shared by the directory and the schedule.
//!
//! Timestamp policy: every stored `Datetime` is a zone-naive wall-clock time
//! in the one configured zone. Zone-aware strings are still read (converted
//! into that zone); naive strings are never treated as UTC.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use herald_types::models::{Recipient, RecipientType, extract_id};

use crate::error::{ApiError, ApiResult};

pub const MAX_MESSAGE_CHARS: usize = 500;

/// Canonical stored form.
pub const STORED_FORMAT: &str = "%Y-%m-%d %H:%M";

const NAIVE_FORMATS: [&str; 4] = [
    STORED_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const AWARE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"];

// -- Required fields --

/// A recipient needs an id, and a name unless it is a group.
pub fn require_recipient_fields(kind: RecipientType, name: &str, id: &str) -> ApiResult<()> {
    if id.is_empty() {
        return Err(ApiError::validation("Recipient id is required"));
    }
    if name.is_empty() && kind != RecipientType::Group {
        return Err(ApiError::validation("Name is required for a person"));
    }
    Ok(())
}

pub fn require_message_text(text: &str) -> ApiResult<()> {
    if text.is_empty() {
        return Err(ApiError::validation("Message text is required"));
    }
    let chars = text.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ApiError::Validation(format!(
            "Message is {chars} characters, the limit is {MAX_MESSAGE_CHARS}"
        )));
    }
    Ok(())
}

// -- Timestamps --

fn minute_of(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Combines a form date and time into a minute-precision instant in `tz`.
/// Ambiguous local times take the earlier instant; skipped ones are rejected.
pub fn localize(date: NaiveDate, time: NaiveTime, tz: Tz) -> ApiResult<DateTime<Tz>> {
    let naive = date.and_time(minute_of(time));
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ApiError::Validation(format!("{} does not exist in {}", naive.format(STORED_FORMAT), tz))
    })
}

pub fn format_send_at(at: &DateTime<Tz>) -> String {
    at.format(STORED_FORMAT).to_string()
}

/// Reads a stored `Datetime`, naive or zone-aware. Seconds are dropped.
pub fn parse_send_at(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();

    let aware = DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        AWARE_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    });
    if let Some(aware) = aware {
        let local = aware.with_timezone(&tz).naive_local();
        return localize(local.date(), local.time(), tz).ok();
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
    localize(naive.date(), naive.time(), tz).ok()
}

/// Default send time for a new message: the next whole minute in `tz`.
pub fn next_minute(now: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let local = (now + Duration::minutes(1)).with_timezone(&tz).naive_local();
    local.date().and_time(minute_of(local.time()))
}

// -- Recipient resolution --

/// Directory snapshot keyed by id. Selections are looked up here rather than
/// trusted as parsed.
pub struct RecipientIndex {
    by_id: HashMap<String, Recipient>,
    /// Trimmed label to id.
    by_label: HashMap<String, String>,
    first: Option<Recipient>,
}

impl RecipientIndex {
    pub fn new(recipients: &[Recipient]) -> Self {
        let mut by_id = HashMap::with_capacity(recipients.len());
        let mut by_label = HashMap::with_capacity(recipients.len());
        for r in recipients {
            // First row wins for duplicates, same as a top-down scan.
            by_id.entry(r.id.clone()).or_insert_with(|| r.clone());
            by_label
                .entry(r.label().trim().to_string())
                .or_insert_with(|| r.id.clone());
        }
        Self {
            by_id,
            by_label,
            first: recipients.first().cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Recipient> {
        self.by_id.get(id)
    }

    pub fn first(&self) -> Option<&Recipient> {
        self.first.as_ref()
    }

    /// Resolves a label (`"Name | id"`) or bare id to a known recipient.
    ///
    /// Exact id, then exact label, then the text after the last separator,
    /// so ids and names containing `|` still resolve.
    pub fn resolve(&self, selection: &str) -> ApiResult<&Recipient> {
        if self.is_empty() {
            return Err(ApiError::validation(
                "No recipients found. Please add a recipient first.",
            ));
        }
        let selection = selection.trim();
        if let Some(r) = self.get(selection) {
            return Ok(r);
        }
        if let Some(r) = self.by_label.get(selection).and_then(|id| self.get(id)) {
            return Ok(r);
        }
        let id = extract_id(selection);
        if id.is_empty() {
            return Err(ApiError::validation("Recipient is required"));
        }
        self.get(id)
            .ok_or_else(|| ApiError::Validation(format!("Unknown recipient: {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BKK: Tz = chrono_tz::Asia::Bangkok;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn person(id: &str, name: &str) -> Recipient {
        Recipient {
            id: id.into(),
            kind: RecipientType::Person,
            name: name.into(),
        }
    }

    #[test]
    fn empty_id_always_fails() {
        for kind in [RecipientType::Person, RecipientType::Group] {
            for name in ["", "Alice"] {
                assert!(matches!(
                    require_recipient_fields(kind, name, ""),
                    Err(ApiError::Validation(_))
                ));
            }
        }
    }

    #[test]
    fn only_groups_may_be_unnamed() {
        assert!(require_recipient_fields(RecipientType::Group, "", "C1").is_ok());
        assert!(require_recipient_fields(RecipientType::Person, "", "U1").is_err());
        assert!(require_recipient_fields(RecipientType::Person, "Alice", "U1").is_ok());
    }

    #[test]
    fn message_text_bounds() {
        assert!(require_message_text("").is_err());
        assert!(require_message_text(" ").is_ok());
        assert!(require_message_text(&"ก".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(require_message_text(&"a".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }

    #[test]
    fn localize_drops_seconds() {
        let at = localize(date(2024, 1, 1), time(9, 0, 59), BKK).unwrap();
        assert_eq!(format_send_at(&at), "2024-01-01 09:00");
        assert_eq!(at.to_rfc3339(), "2024-01-01T09:00:00+07:00");
    }

    #[test]
    fn skipped_local_time_is_rejected() {
        let ny: Tz = chrono_tz::America::New_York;
        assert!(matches!(
            localize(date(2024, 3, 10), time(2, 30, 0), ny),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn naive_strings_are_local_time() {
        let at = parse_send_at("2024-01-01 09:00", BKK).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-01-01T09:00:00+07:00");

        let at = parse_send_at("2024-01-01 09:00:45", BKK).unwrap();
        assert_eq!(format_send_at(&at), "2024-01-01 09:00");

        let at = parse_send_at("2024-01-01T09:05", BKK).unwrap();
        assert_eq!(format_send_at(&at), "2024-01-01 09:05");
    }

    #[test]
    fn aware_strings_convert_into_zone() {
        let at = parse_send_at("2024-01-01T02:00:00Z", BKK).unwrap();
        assert_eq!(format_send_at(&at), "2024-01-01 09:00");

        let at = parse_send_at("2024-01-01 09:00:00+07:00", BKK).unwrap();
        assert_eq!(format_send_at(&at), "2024-01-01 09:00");
    }

    #[test]
    fn garbage_is_not_a_time() {
        assert!(parse_send_at("tomorrow-ish", BKK).is_none());
        assert!(parse_send_at("", BKK).is_none());
    }

    #[test]
    fn next_minute_rounds_down_after_adding_one() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 59, 30).unwrap();
        let at = next_minute(now, BKK);
        assert_eq!(at.format(STORED_FORMAT).to_string(), "2024-01-01 09:00");
    }

    #[test]
    fn resolve_by_label_or_id() {
        let index = RecipientIndex::new(&[person("U1", "Alice"), person("U2", "Bob")]);
        assert_eq!(index.resolve("Alice | U1").unwrap().id, "U1");
        assert_eq!(index.resolve("U2").unwrap().name, "Bob");
        assert_eq!(index.first().unwrap().id, "U1");
    }

    #[test]
    fn resolve_rejects_unknown_and_empty() {
        let index = RecipientIndex::new(&[person("U1", "Alice")]);
        assert!(matches!(index.resolve("Eve | U404"), Err(ApiError::Validation(_))));
        assert!(matches!(index.resolve("Alice | "), Err(ApiError::Validation(_))));

        let empty = RecipientIndex::new(&[]);
        assert!(empty.is_empty());
        assert!(matches!(empty.resolve("Alice | U1"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn ids_containing_separator_resolve() {
        let ops = Recipient {
            id: "C|1".into(),
            kind: RecipientType::Group,
            name: "Ops".into(),
        };
        let index = RecipientIndex::new(&[person("U1", "Alice"), ops.clone()]);
        assert_eq!(index.resolve(&ops.label()).unwrap().id, "C|1");
        assert_eq!(index.resolve("C|1").unwrap().id, "C|1");
        assert_eq!(index.resolve(" C|1 ").unwrap().id, "C|1");
        assert!(matches!(index.resolve("Ops | C|2"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn unnamed_group_label_resolves() {
        let group = Recipient {
            id: "C42".into(),
            kind: RecipientType::Group,
            name: String::new(),
        };
        let index = RecipientIndex::new(&[group.clone()]);
        assert_eq!(index.resolve(&group.label()).unwrap().id, "C42");
    }

    #[test]
    fn ambiguous_local_time_takes_earlier_instant() {
        let ny: Tz = chrono_tz::America::New_York;
        let at = localize(date(2024, 11, 3), time(1, 30, 0), ny).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-11-03T01:30:00-04:00");
    }

    #[test]
    fn duplicate_ids_resolve_to_first_row() {
        let index = RecipientIndex::new(&[person("U1", "Alice"), person("U1", "Alias")]);
        assert_eq!(index.resolve("U1").unwrap().name, "Alice");
    }
}
