//! Interaction events as read from a log.

use serde::{Deserialize, Serialize};

use crate::edge::Timestamp;

/// One row of an implicit-feedback log: `actor` interacted with `target` at `time`.
///
/// Ids are opaque strings; nothing is assumed about their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub actor: String,
    pub target: String,
    pub time: Timestamp,
}

impl Event {
    pub fn new(actor: impl Into<String>, target: impl Into<String>, time: Timestamp) -> Self {
        Self {
            actor: actor.into(),
            target: target.into(),
            time,
        }
    }
}

/// Stable sort by time; events sharing a timestamp keep their relative order.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Whether `events` is already in non-decreasing time order.
pub fn is_chronological(events: &[Event]) -> bool {
    events.windows(2).all(|w| w[0].time <= w[1].time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable() {
        let mut events = vec![
            Event::new("b", "x", 20.0),
            Event::new("a", "x", 10.0),
            Event::new("c", "y", 20.0),
        ];
        sort_chronologically(&mut events);

        let actors: Vec<&str> = events.iter().map(|e| e.actor.as_str()).collect();
        assert_eq!(actors, ["a", "b", "c"]);
        assert!(is_chronological(&events));
    }
}
