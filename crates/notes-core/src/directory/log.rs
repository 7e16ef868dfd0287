//! Merged message log.
//!
//! Holds every note received from backfill and the live feed, in arrival
//! order. Each payload is parsed once on arrival; foreign payloads only move
//! the sequence watermark and never take a slot. A second message carrying an
//! already-present note id is dropped, so the first one in scan order always
//! wins.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::codec::{parse_from_transport, Note};
use crate::transport::RawMessage;

struct LoggedNote {
    message: RawMessage,
    note: Note,
}

/// Append-only (modulo eviction) sequence of parsed notes.
pub(crate) struct MessageLog {
    entries: VecDeque<LoggedNote>,
    note_ids: HashSet<String>,
    capacity: Option<usize>,
    max_sequence: Option<u64>,
}

impl MessageLog {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            note_ids: HashSet::new(),
            capacity,
            max_sequence: None,
        }
    }

    /// Append a message. Returns `false` when it is not a note or duplicates
    /// a known note id.
    pub(crate) fn append(&mut self, message: RawMessage) -> bool {
        if let Some(seq) = message.sequence {
            self.max_sequence = Some(self.max_sequence.map_or(seq, |max| max.max(seq)));
        }

        let note = match parse_from_transport(&message.payload) {
            Ok(note) => note,
            Err(err) => {
                trace!(error = %err, "skipping foreign payload");
                return false;
            }
        };

        if !self.note_ids.insert(note.id.clone()) {
            trace!(note_id = %note.id, "duplicate delivery dropped");
            return false;
        }

        self.entries.push_back(LoggedNote { message, note });
        self.evict();
        true
    }

    fn evict(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            if let Some(evicted) = self.entries.pop_front() {
                self.note_ids.remove(&evicted.note.id);
            }
        }
    }

    /// First note with `id` in scan order.
    pub(crate) fn find(&self, id: &str) -> Option<Note> {
        self.entries
            .iter()
            .map(|entry| &entry.note)
            .find(|note| note.id == id)
            .cloned()
    }

    /// Parseable notes in scan order with their transport timestamps.
    pub(crate) fn notes(&self) -> impl Iterator<Item = (&Note, &RawMessage)> {
        self.entries
            .iter()
            .map(|entry| (&entry.note, &entry.message))
    }

    /// Highest transport sequence seen, including evicted messages.
    pub(crate) fn max_sequence(&self) -> Option<u64> {
        self.max_sequence
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::serialize_for_transport;

    fn note_message(id: &str, content: &str) -> RawMessage {
        let note = Note {
            id: id.to_string(),
            content: content.to_string(),
            encryption_params: None,
        };
        RawMessage::new(serialize_for_transport(&note).unwrap())
    }

    #[test]
    fn test_find_first_match() {
        let mut log = MessageLog::new(None);
        log.append(note_message("a", "first"));
        log.append(note_message("b", "other"));
        assert_eq!(log.find("a").unwrap().content, "first");
        assert_eq!(log.find("b").unwrap().content, "other");
        assert!(log.find("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_dropped_first_wins() {
        let mut log = MessageLog::new(None);
        assert!(log.append(note_message("a", "first")));
        assert!(!log.append(note_message("a", "second")));
        assert_eq!(log.len(), 1);
        assert_eq!(log.find("a").unwrap().content, "first");
    }

    #[test]
    fn test_foreign_payloads_take_no_slot() {
        let mut log = MessageLog::new(None);
        assert!(!log.append(RawMessage::new(b"garbage".to_vec()).with_sequence(1)));
        assert!(log.append(note_message("a", "note").with_sequence(2)));
        assert!(!log.append(RawMessage::new(b"garbage".to_vec()).with_sequence(7)));
        assert_eq!(log.len(), 1);
        assert_eq!(log.notes().count(), 1);
        assert_eq!(log.max_sequence(), Some(7));
    }

    #[test]
    fn test_foreign_flood_does_not_evict_notes() {
        let mut log = MessageLog::new(Some(3));
        log.append(note_message("a", "kept"));
        for seq in 0..10 {
            log.append(RawMessage::new(b"{\"other\":true}".to_vec()).with_sequence(seq));
        }
        assert_eq!(log.len(), 1);
        assert_eq!(log.find("a").unwrap().content, "kept");
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut log = MessageLog::new(Some(2));
        log.append(note_message("a", "1"));
        log.append(note_message("b", "2"));
        log.append(note_message("c", "3"));
        assert_eq!(log.len(), 2);
        assert!(log.find("a").is_none());
        assert!(log.find("c").is_some());

        // An evicted id may be accepted again.
        assert!(log.append(note_message("a", "again")));
    }

    #[test]
    fn test_max_sequence_tracks_highest() {
        let mut log = MessageLog::new(Some(1));
        assert_eq!(log.max_sequence(), None);
        log.append(note_message("a", "1").with_sequence(5));
        log.append(note_message("b", "2").with_sequence(3));
        assert_eq!(log.max_sequence(), Some(5));
    }
}
