use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entry, EventId, LedgerEvent, Seq};

/// An append-only, time-ordered sequence of events.
///
/// The ledger is owned by a single aggregate and mutated only through
/// [`Ledger::append`]. Appending assigns a timestamp no earlier than the
/// previous entry's timestamp, so iteration order, sequence order, and
/// timestamp order always agree. The ledger performs no deduplication;
/// idempotence is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger<E> {
    entries: Vec<Entry<E>>,
}

impl<E> Default for Ledger<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: LedgerEvent> Ledger<E> {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, returning the recorded entry.
    ///
    /// The entry's timestamp is the current time, clamped so it never
    /// precedes the previous entry's timestamp.
    pub fn append(&mut self, event: E) -> &Entry<E> {
        self.append_at(event, Utc::now())
    }

    /// Appends an event with an explicit wall-clock reading.
    ///
    /// The recorded timestamp is `max(now, previous.recorded_at)`.
    pub fn append_at(&mut self, event: E, now: DateTime<Utc>) -> &Entry<E> {
        let recorded_at = match self.entries.last() {
            Some(last) => now.max(last.recorded_at),
            None => now,
        };
        let seq = self
            .entries
            .last()
            .map(|last| last.seq.next())
            .unwrap_or_else(Seq::first);

        self.entries.push(Entry {
            id: EventId::new(),
            seq,
            recorded_at,
            event,
        });
        self.entries.last().expect("entry was just pushed")
    }

    /// Returns the entries in append order.
    pub fn entries(&self) -> &[Entry<E>] {
        &self.entries
    }

    /// Iterates over the entries in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<E>> {
        self.entries.iter()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent entry, if any.
    pub fn last(&self) -> Option<&Entry<E>> {
        self.entries.last()
    }

    /// Counts the entries of a given kind.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.entries.iter().filter(|e| e.event.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum TestEvent {
        Opened,
        Noted { text: String },
    }

    impl LedgerEvent for TestEvent {
        fn kind(&self) -> &str {
            match self {
                TestEvent::Opened => "OPENED",
                TestEvent::Noted { .. } => "NOTED",
            }
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn append_assigns_increasing_seq() {
        let mut ledger = Ledger::new();
        ledger.append(TestEvent::Opened);
        ledger.append(TestEvent::Noted {
            text: "first".to_string(),
        });

        let seqs: Vec<_> = ledger.iter().map(|e| e.seq.as_u64()).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn timestamps_never_move_backwards() {
        let mut ledger = Ledger::new();
        ledger.append_at(TestEvent::Opened, at(100));
        // Wall clock went backwards between appends.
        ledger.append_at(
            TestEvent::Noted {
                text: "x".to_string(),
            },
            at(50),
        );

        let entries = ledger.entries();
        assert_eq!(entries[0].recorded_at, at(100));
        assert_eq!(entries[1].recorded_at, at(100));
        assert!(entries[0].seq < entries[1].seq);
    }

    #[test]
    fn equal_timestamps_are_ordered_by_seq() {
        let mut ledger = Ledger::new();
        for _ in 0..5 {
            ledger.append_at(TestEvent::Opened, at(42));
        }

        let mut previous = None;
        for entry in ledger.iter() {
            assert_eq!(entry.recorded_at, at(42));
            if let Some(prev) = previous {
                assert!(entry.seq > prev);
            }
            previous = Some(entry.seq);
        }
    }

    #[test]
    fn no_deduplication_on_identical_events() {
        let mut ledger = Ledger::new();
        ledger.append(TestEvent::Opened);
        ledger.append(TestEvent::Opened);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.count_kind("OPENED"), 2);
    }

    #[test]
    fn serialization_roundtrip_preserves_order() {
        let mut ledger = Ledger::new();
        ledger.append_at(TestEvent::Opened, at(1));
        ledger.append_at(
            TestEvent::Noted {
                text: "note".to_string(),
            },
            at(2),
        );

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: Ledger<TestEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn empty_ledger() {
        let ledger: Ledger<TestEvent> = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(ledger.last().is_none());
    }
}
