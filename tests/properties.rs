use proptest::prelude::*;

use compsession::event::{derive_status, Event, EventStatus};
use compsession::fmc::FmcEntry;
use compsession::scramble::{PenaltyAction, Scramble};
use compsession::util::TimeFormat;

fn scrambles_from(times: &[Option<u32>]) -> Vec<Scramble> {
    times
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut s = Scramble::new(i as u64, "R U R'");
            if let Some(t) = t {
                assert!(s.record_time(i64::from(*t)));
            }
            s
        })
        .collect()
}

proptest! {
    #[test]
    fn status_matches_attempted_count(times in prop::collection::vec(prop::option::of(0u32..100_000), 0..8)) {
        let attempted = times.iter().filter(|t| t.is_some()).count();
        let expected = if attempted == 0 {
            EventStatus::Unstarted
        } else if attempted == times.len() {
            EventStatus::Complete
        } else {
            EventStatus::Incomplete
        };
        prop_assert_eq!(derive_status(&scrambles_from(&times)), expected);
    }

    #[test]
    fn clear_penalty_restores_display(cs in 0u32..10_000_000, dnf in any::<bool>(), clock in any::<bool>()) {
        let format = if clock { TimeFormat::Clock } else { TimeFormat::Seconds };
        let mut s = Scramble::new(1, "F");
        s.record_time(i64::from(cs));
        let before = s.display_value(format);

        if dnf {
            prop_assert!(s.apply_dnf());
        } else {
            prop_assert!(s.apply_plus_two());
        }
        prop_assert!(s.clear_penalty());
        prop_assert_eq!(s.display_value(format), before);
        prop_assert_eq!(s.time(), Some(cs));
    }

    #[test]
    fn retry_then_record_is_history_free(
        first in 0u32..1_000_000,
        second in 0u32..1_000_000,
        penalty in prop::sample::select(vec![None, Some(PenaltyAction::Dnf), Some(PenaltyAction::PlusTwo)]),
    ) {
        let mut retried = Scramble::new(9, "B2");
        retried.record_time(i64::from(first));
        if let Some(action) = penalty {
            prop_assert!(retried.apply(action));
        }
        prop_assert!(retried.apply(PenaltyAction::Retry));
        prop_assert!(retried.record_time(i64::from(second)));

        let mut direct = Scramble::new(9, "B2");
        direct.record_time(i64::from(second));
        prop_assert_eq!(retried, direct);
    }

    #[test]
    fn penalty_flags_stay_exclusive(actions in prop::collection::vec(0usize..4, 0..24)) {
        let mut s = Scramble::new(1, "L");
        s.record_time(2500);
        for a in actions {
            s.apply(PenaltyAction::ALL[a]);
            prop_assert!(!(s.is_dnf() && s.is_plus_two()));
            if !s.is_attempted() {
                prop_assert!(!s.has_penalty());
                s.record_time(2500);
            }
        }
    }

    #[test]
    fn fmc_non_digits_never_change_count(noise in "[^0-9]{0,16}") {
        let mut event = Event::new(1, 17, "FMC", vec![Scramble::new(1, "R' U' F")]);
        let mut entry = FmcEntry::open(&event);
        let s = &mut event.scrambles[0];
        entry.keystroke(s, '4');
        entry.keystroke(s, '2');
        for c in noise.chars() {
            prop_assert!(!entry.keystroke(s, c));
        }
        prop_assert_eq!(s.time(), Some(42));
        prop_assert_eq!(entry.buffer(1), "42");
    }
}

#[test]
fn fmc_zero_then_fifty() {
    let mut event = Event::new(1, 17, "FMC", vec![Scramble::new(1, "R' U' F")]);
    let mut entry = FmcEntry::open(&event);
    let s = &mut event.scrambles[0];
    entry.keystroke(s, '0');
    assert_eq!(s.time(), None);

    let mut event = Event::new(1, 17, "FMC", vec![Scramble::new(1, "R' U' F")]);
    let mut entry = FmcEntry::open(&event);
    let s = &mut event.scrambles[0];
    entry.keystroke(s, '5');
    entry.keystroke(s, '0');
    assert_eq!(s.time(), Some(50));
}

#[test]
fn three_scramble_event_becomes_complete() {
    let mut event = Event::new(1, 1, "3x3", scrambles_from(&[Some(6012), None, None]));
    assert_eq!(event.status(), EventStatus::Incomplete);
    event.scrambles[1].record_time(700);
    event.scrambles[2].record_time(800);
    assert_eq!(derive_status(&event.scrambles), EventStatus::Complete);
}
