//! Credential records stored inside the vault payload.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp format used in the vault payload (minute precision, local time)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A stored credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Unique within a vault, never reused after deletion
    pub id: u64,
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "minute_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "minute_timestamp")]
    pub updated_at: NaiveDateTime,
}

impl VaultRecord {
    pub fn new(id: u64, service: &str, username: &str, password: &str, notes: &str) -> Self {
        let now = now_to_minute();
        Self {
            id,
            service: service.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            notes: notes.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field changes for [`crate::VaultSession::update`]; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notes: Option<String>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.notes.is_none()
    }

    /// Apply the changes and refresh `updated_at`; `created_at` is untouched
    pub fn apply(self, record: &mut VaultRecord) {
        if let Some(service) = self.service {
            record.service = service;
        }
        if let Some(username) = self.username {
            record.username = username;
        }
        if let Some(password) = self.password {
            record.password = password;
        }
        if let Some(notes) = self.notes {
            record.notes = notes;
        }
        record.updated_at = now_to_minute();
    }
}

/// Current local time truncated to the minute
pub(crate) fn now_to_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

mod minute_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
