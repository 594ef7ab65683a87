//! Pre-graph event selection: active-actor filtering and chronological splits.

use std::collections::{HashMap, HashSet};

use crate::event::Event;
use crate::{Error, Result};

/// Keep only events whose actor is among the `k` most active actors.
///
/// Activity is the number of events per actor. Equal counts are ranked by
/// first appearance in `events`. The relative order of kept events is unchanged.
pub fn top_actors(events: &[Event], k: usize) -> Vec<Event> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, e) in events.iter().enumerate() {
        counts.entry(e.actor.as_str()).or_insert((0, pos)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(actor, (count, first))| (actor, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let keep: HashSet<&str> = ranked.into_iter().take(k).map(|(a, _, _)| a).collect();
    events
        .iter()
        .filter(|e| keep.contains(e.actor.as_str()))
        .cloned()
        .collect()
}

/// Split without shuffling: the last `ceil(test_fraction * n)` events are the test split.
pub fn chronological_split(events: &[Event], test_fraction: f64) -> Result<(Vec<Event>, Vec<Event>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::InvalidSplit(test_fraction));
    }
    let n_test = ((test_fraction * events.len() as f64).ceil() as usize).min(events.len());
    let n_train = events.len() - n_test;

    let (train, test) = events.split_at(n_train);
    tracing::debug!(train = train.len(), test = test.len(), "chronological split");
    Ok((train.to_vec(), test.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(actor: &str, t: f64) -> Event {
        Event::new(actor, "item", t)
    }

    #[test]
    fn test_split_sizes() {
        let events: Vec<Event> = (0..10).map(|i| ev("a", i as f64)).collect();
        let (train, test) = chronological_split(&events, 0.2).unwrap();

        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(test[0].time, 8.0);
    }

    #[test]
    fn test_split_rounds_test_up() {
        let events: Vec<Event> = (0..7).map(|i| ev("a", i as f64)).collect();
        let (train, test) = chronological_split(&events, 0.2).unwrap();

        // ceil(1.4) = 2
        assert_eq!((train.len(), test.len()), (5, 2));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(matches!(chronological_split(&[], 0.0), Err(Error::InvalidSplit(_))));
        assert!(matches!(chronological_split(&[], 1.0), Err(Error::InvalidSplit(_))));
        assert!(chronological_split(&[], f64::NAN).is_err());
    }

    #[test]
    fn test_top_actors_ties_by_first_appearance() {
        let events = vec![
            ev("b", 1.0),
            ev("a", 2.0),
            ev("c", 3.0),
            ev("c", 4.0),
            ev("a", 5.0),
            ev("b", 6.0),
            ev("d", 7.0),
        ];
        let kept = top_actors(&events, 2);
        let actors: Vec<&str> = kept.iter().map(|e| e.actor.as_str()).collect();

        // all of a, b, c have 2 events; b and a appear first
        assert_eq!(actors, ["b", "a", "a", "b"]);
    }
}
