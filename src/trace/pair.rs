//! Send/receive pairing.
//!
//! Every receive is indexed by its [`PairKey`]. Each send, in sequence order,
//! claims the first receive under its key that is still unclaimed and whose
//! timestamp is strictly later than the send's. Unmatched events stay
//! unpaired; that is a normal outcome (dropped message, or the counterpart
//! is outside the trace window).

use std::collections::HashMap;

use super::event::{EventKind, PairKey, TraceEvent};

/// Link sends to receives in place.
///
/// `events` must already be time sorted. Existing links are discarded
/// first, so running this twice over the same sequence yields the same
/// links.
pub fn pair(events: &mut [TraceEvent]) {
    for event in events.iter_mut() {
        event.pair = None;
    }

    let mut receives: HashMap<PairKey, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if event.kind == EventKind::Receive {
            receives.entry(event.pair_key()).or_default().push(idx);
        }
    }

    let mut claimed = vec![false; events.len()];
    for tx in 0..events.len() {
        if events[tx].kind != EventKind::Send {
            continue;
        }
        let Some(candidates) = receives.get(&events[tx].pair_key()) else {
            continue;
        };
        let sent = events[tx].time;
        let Some(&rx) = candidates
            .iter()
            .find(|&&rx| !claimed[rx] && events[rx].time > sent)
        else {
            continue;
        };

        claimed[rx] = true;
        events[tx].pair = Some(rx);
        events[rx].pair = Some(tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::event::{Tag, Timestamp};

    fn event(kind: EventKind, seconds: u32, microseconds: u32) -> TraceEvent {
        TraceEvent {
            kind,
            source: 0,
            sender: 10,
            receiver: 20,
            time: Timestamp::new(seconds, microseconds),
            signo: 0x100,
            proc_id: Tag::Bytes([0, 0, 0, 1]),
            conn_id: Tag::Bytes([0, 0, 0, 2]),
            pair: None,
        }
    }

    fn links(events: &[TraceEvent]) -> Vec<Option<usize>> {
        events.iter().map(|e| e.pair).collect()
    }

    #[test]
    fn test_equal_timestamps_do_not_pair() {
        let mut events = vec![event(EventKind::Send, 5, 0), event(EventKind::Receive, 5, 0)];
        pair(&mut events);
        assert_eq!(links(&events), vec![None, None]);
    }

    #[test]
    fn test_later_receive_pairs() {
        let mut events = vec![event(EventKind::Send, 5, 0), event(EventKind::Receive, 6, 0)];
        pair(&mut events);
        assert_eq!(links(&events), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_microseconds_break_ties() {
        let mut events = vec![event(EventKind::Send, 5, 10), event(EventKind::Receive, 5, 11)];
        pair(&mut events);
        assert_eq!(links(&events), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_key_mismatch_does_not_pair() {
        let mut rx = event(EventKind::Receive, 6, 0);
        rx.conn_id = Tag::Bytes([9, 9, 9, 9]);
        let mut events = vec![event(EventKind::Send, 5, 0), rx];
        pair(&mut events);
        assert_eq!(links(&events), vec![None, None]);
    }

    #[test]
    fn test_first_unclaimed_candidate_wins() {
        let mut events = vec![
            event(EventKind::Send, 1, 0),
            event(EventKind::Send, 2, 0),
            event(EventKind::Receive, 3, 0),
            event(EventKind::Receive, 4, 0),
            event(EventKind::Receive, 5, 0),
        ];
        pair(&mut events);
        assert_eq!(
            links(&events),
            vec![Some(2), Some(3), Some(0), Some(1), None]
        );
    }

    #[test]
    fn test_receive_before_send_is_skipped() {
        let mut events = vec![
            event(EventKind::Receive, 1, 0),
            event(EventKind::Send, 2, 0),
            event(EventKind::Receive, 3, 0),
        ];
        pair(&mut events);
        assert_eq!(links(&events), vec![None, Some(2), Some(1)]);
    }

    #[test]
    fn test_other_kinds_never_pair() {
        let mut events = vec![event(EventKind::Send, 1, 0), event(EventKind::Other(4), 2, 0)];
        pair(&mut events);
        assert_eq!(links(&events), vec![None, None]);
    }

    #[test]
    fn test_pairing_is_idempotent() {
        let mut events = vec![
            event(EventKind::Send, 1, 0),
            event(EventKind::Receive, 2, 0),
            event(EventKind::Send, 3, 0),
            event(EventKind::Receive, 3, 0),
            event(EventKind::Receive, 4, 0),
        ];
        pair(&mut events);
        let first = links(&events);
        pair(&mut events);
        assert_eq!(links(&events), first);
        assert_eq!(first, vec![Some(1), Some(0), Some(4), None, Some(2)]);
    }
}
