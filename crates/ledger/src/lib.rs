//! Append-only event ledger.
//!
//! A [`Ledger`] is a time-ordered sequence of [`Entry`] values owned by a
//! single aggregate. Appending is the only mutation: entries are never
//! updated or removed, timestamps never move backwards, and ties between
//! equal timestamps are ordered by the insertion sequence number.

mod entry;
mod ledger;

pub use entry::{Entry, EventId, Seq};
pub use ledger::Ledger;

/// Trait for events recorded on a ledger.
///
/// Events represent facts that have happened and are immutable once
/// appended. The kind token is a stable string used for serialization and
/// display; it must not change once events of that kind exist.
pub trait LedgerEvent: Clone + Send + Sync {
    /// Returns the stable kind token of this event.
    fn kind(&self) -> &str;
}
