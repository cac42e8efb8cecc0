//! Deferred world transitions keyed by simulated time.

use std::{collections::BTreeMap, time::Duration};

use outpost_core::{BuildingId, GoblinId};

/// Transition the world performs once its due time is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScheduledEvent {
    /// The building asks whether construction may complete.
    ConstructionAttempt(BuildingId),
    /// The dead goblin leaves the registry.
    RemoveGoblin(GoblinId),
    /// The destroyed building leaves the registry.
    RemoveBuilding(BuildingId),
}

/// Min-ordered queue of scheduled events.
///
/// Entries sharing a due time fire in insertion order.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    entries: BTreeMap<(Duration, u64), ScheduledEvent>,
    next_sequence: u64,
}

impl Schedule {
    /// Queues `event` to fire once the clock reaches `due`.
    pub(crate) fn push(&mut self, due: Duration, event: ScheduledEvent) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let _ = self.entries.insert((due, sequence), event);
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<ScheduledEvent> {
        let (&(due, _), _) = self.entries.first_key_value()?;
        if due > now {
            return None;
        }

        self.entries.pop_first().map(|(_, event)| event)
    }
}
