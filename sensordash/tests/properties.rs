use proptest::prelude::*;

use sensordash::relay::{self, Capacity, Event, RecvError};
use sensordash::status::{parse_command, Command};
use sensordash::view::{Dashboard, LineHistory};
use sensordash::StatusIndicator;

fn indicator() -> impl Strategy<Value = StatusIndicator> {
    prop_oneof![
        Just(StatusIndicator::Unknown),
        Just(StatusIndicator::Active),
        Just(StatusIndicator::Inactive),
    ]
}

proptest! {
    #[test]
    fn history_keeps_last_min_n_c(lines in prop::collection::vec("[a-z0-9]{0,12}", 0..64), cap in 0usize..20) {
        let mut history = LineHistory::new(cap);
        for line in &lines {
            history.push(line.clone());
        }
        let keep = lines.len().min(cap);
        let expected: Vec<&str> = lines[lines.len() - keep..].iter().map(String::as_str).collect();
        prop_assert_eq!(history.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn status_depends_only_on_previous_and_payload(prev in indicator(), payload in ".{0,6}") {
        let next = prev.apply(&payload);
        let upper = payload.to_ascii_uppercase();
        if upper == "ON" {
            prop_assert_eq!(next, StatusIndicator::Active);
        } else if upper == "OFF" {
            prop_assert_eq!(next, StatusIndicator::Inactive);
        } else {
            prop_assert_eq!(next, prev);
            prop_assert_eq!(parse_command(&payload), Command::Unrecognized);
        }
        prop_assert_eq!(prev.apply(&payload), next);
    }

    #[test]
    fn outbound_events_show_up_verbatim(topic in "[a-z/_]{1,20}", payload in "[0-9.]{1,8}") {
        let (tx, out_rx) = relay::channel(Capacity::Unbounded);
        let (_in_tx, in_rx) = relay::channel(Capacity::Unbounded);
        let mut dash = Dashboard::new(out_rx, in_rx, 200, 40);

        tx.send(Event::new(topic.clone(), payload.clone())).unwrap();
        prop_assert!(dash.drain().sent);

        let line = dash.sent().iter().next_back().unwrap().to_string();
        let expected_tail = format!(" -> {}: {}", topic, payload);
        prop_assert!(line.ends_with(&expected_tail));
        prop_assert_eq!(line.len(), 8 + expected_tail.len());
    }

    #[test]
    fn bounded_relay_keeps_newest(payloads in prop::collection::vec("[a-z]{1,4}", 1..40), bound in 1usize..10) {
        let (tx, rx) = relay::channel(Capacity::DropOldest(bound));
        for p in &payloads {
            tx.send(Event::new("t", p.clone())).unwrap();
        }
        let keep = payloads.len().min(bound);
        for p in &payloads[payloads.len() - keep..] {
            prop_assert_eq!(&rx.try_recv().unwrap().payload, p);
        }
        prop_assert_eq!(rx.try_recv(), Err(RecvError::Empty));
        prop_assert_eq!(tx.dropped() as usize, payloads.len() - keep);
    }
}
