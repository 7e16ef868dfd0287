//! Message row type for database queries.

use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::Row;
use tracing::trace;

use crate::transport::traits::RawMessage;

/// Raw row data from the messages table, before parsing into transport types.
///
/// Other writers share the table, so column values are read loosely: a
/// payload stored as TEXT is taken as its bytes, and anything that is not a
/// byte string leaves `payload` empty.
#[derive(Debug)]
pub struct MessageRow {
    pub seq: u64,
    pub payload: Option<Vec<u8>>,
    pub timestamp: Option<String>,
}

impl MessageRow {
    /// Read `seq, payload, timestamp` from a result row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let seq: i64 = row.get(0)?;
        let payload = match row.get_ref(1)? {
            ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Some(bytes.to_vec()),
            _ => None,
        };
        let timestamp = match row.get_ref(2)? {
            ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
            _ => None,
        };
        Ok(Self {
            seq: seq.max(0) as u64,
            payload,
            timestamp,
        })
    }

    /// Convert to a transport message, or `None` when the row has no payload.
    ///
    /// A timestamp that is not RFC 3339 is dropped rather than failing the row.
    pub fn into_message(self) -> Option<RawMessage> {
        let Some(payload) = self.payload else {
            trace!(seq = self.seq, "skipping row without byte payload");
            return None;
        };
        let timestamp = self.timestamp.as_deref().and_then(|value| {
            match DateTime::parse_from_rfc3339(value) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(err) => {
                    trace!(seq = self.seq, error = %err, "ignoring unparseable timestamp");
                    None
                }
            }
        });

        Some(RawMessage {
            payload,
            timestamp,
            sequence: Some(self.seq),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = MessageRow {
            seq: 4,
            payload: Some(b"x".to_vec()),
            timestamp: Some("2026-01-02T03:04:05Z".to_string()),
        };
        let message = row.into_message().unwrap();
        assert_eq!(message.sequence, Some(4));
        assert_eq!(message.payload, b"x");
        assert!(message.timestamp.is_some());
    }

    #[test]
    fn test_bad_timestamp_becomes_none() {
        let row = MessageRow {
            seq: 1,
            payload: Some(b"x".to_vec()),
            timestamp: Some("yesterday".to_string()),
        };
        let message = row.into_message().unwrap();
        assert!(message.timestamp.is_none());
        assert_eq!(message.sequence, Some(1));
    }

    #[test]
    fn test_missing_payload_skipped() {
        let row = MessageRow {
            seq: 2,
            payload: None,
            timestamp: None,
        };
        assert!(row.into_message().is_none());
    }
}
