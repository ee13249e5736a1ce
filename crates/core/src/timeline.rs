//! Ordering rules for timeline events.

use std::cmp::Ordering;

use crate::types::DbId;

/// Anything that can be placed on a timeline.
pub trait Sequenced {
    fn id(&self) -> DbId;
    /// Position on the timeline. `None` means "undated".
    fn sort_key(&self) -> Option<i64>;
}

/// Compare two events: dated events by `(sort_key, id)`, undated ones last.
pub fn compare_events<T: Sequenced>(a: &T, b: &T) -> Ordering {
    match (a.sort_key(), b.sort_key()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id().cmp(&b.id())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id().cmp(&b.id()),
    }
}

/// Sort events in place into timeline order.
pub fn sort_events<T: Sequenced>(events: &mut [T]) {
    events.sort_by(compare_events);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ev(DbId, Option<i64>);

    impl Sequenced for Ev {
        fn id(&self) -> DbId {
            self.0
        }
        fn sort_key(&self) -> Option<i64> {
            self.1
        }
    }

    #[test]
    fn dated_events_sort_by_key_then_id() {
        let mut events = vec![Ev(3, Some(10)), Ev(1, Some(-5)), Ev(2, Some(10))];
        sort_events(&mut events);
        let ids: Vec<_> = events.iter().map(|e| e.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn undated_events_go_last_in_id_order() {
        let mut events = vec![Ev(5, None), Ev(4, Some(100)), Ev(2, None)];
        sort_events(&mut events);
        let ids: Vec<_> = events.iter().map(|e| e.0).collect();
        assert_eq!(ids, vec![4, 2, 5]);
    }

    #[test]
    fn empty_is_fine() {
        let mut events: Vec<Ev> = Vec::new();
        sort_events(&mut events);
        assert!(events.is_empty());
    }
}
