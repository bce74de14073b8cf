//! Sequencing for selection changes.
//!
//! A caller that fetches snapshots asynchronously can see responses arrive
//! out of order. Each selection change takes a ticket; a result is only
//! accepted while its ticket is the newest one issued.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::models::EventId;

/// Handle for one requested selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    events: BTreeSet<EventId>,
}

impl SelectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Events the selection covers.
    pub fn events(&self) -> &BTreeSet<EventId> {
        &self.events
    }
}

/// Issues monotonically increasing selection tickets.
#[derive(Debug, Default)]
pub struct SelectionSequencer {
    latest: AtomicU64,
}

impl SelectionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection, superseding every earlier ticket.
    pub fn issue(&self, events: BTreeSet<EventId>) -> SelectionTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionTicket { generation, events }
    }

    /// True if no newer selection has been issued since `ticket`.
    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.generation
    }

    /// Pass `result` through only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: &SelectionTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!(
                "Dropping result for superseded selection {} ({} events)",
                ticket.generation,
                ticket.events.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(ids: &[&str]) -> BTreeSet<EventId> {
        ids.iter().map(|id| EventId::from(*id)).collect()
    }

    #[test]
    fn test_tickets_increase() {
        let sequencer = SelectionSequencer::new();
        let first = sequencer.issue(events(&["a"]));
        let second = sequencer.issue(events(&["b"]));

        assert!(second.generation() > first.generation());
        assert_eq!(second.events(), &events(&["b"]));
    }

    #[test]
    fn test_stale_result_dropped() {
        let sequencer = SelectionSequencer::new();
        let older = sequencer.issue(events(&["a"]));
        let newer = sequencer.issue(events(&["a", "b"]));

        // The older fetch resolves last; it must not win.
        assert_eq!(sequencer.accept(&newer, "newer"), Some("newer"));
        assert_eq!(sequencer.accept(&older, "older"), None);
        assert!(!sequencer.is_current(&older));
    }

    #[test]
    fn test_current_ticket_accepted_repeatedly() {
        let sequencer = SelectionSequencer::new();
        let ticket = sequencer.issue(events(&["a"]));

        assert_eq!(sequencer.accept(&ticket, 1), Some(1));
        assert_eq!(sequencer.accept(&ticket, 2), Some(2));
    }
}
