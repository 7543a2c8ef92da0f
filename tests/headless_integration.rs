use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use compsession::error::{SessionError, SummaryError};
use compsession::event::{Event, EventStatus};
use compsession::manager::{CompManager, Outcome};
use compsession::runtime::{FixedTicker, Runner, SessionEvent, TestEventSource};
use compsession::scramble::{PenaltyAction, Scramble};
use compsession::session::{Identity, Session};
use compsession::summary::SummaryService;
use compsession::timer::{ClockCall, RecordingClock};

struct Recorded(&'static str);

impl SummaryService for Recorded {
    fn request_summaries(&self, endpoint: &str, body: &str) -> Result<String, SummaryError> {
        assert_eq!(endpoint, "/eventSummaries");
        assert!(body.starts_with('['));
        Ok(self.0.to_string())
    }
}

fn session() -> Session {
    Session::new(vec![
        Event::new(
            101,
            1,
            "3x3",
            (1..=3).map(|i| Scramble::new(i, format!("3x3 #{i}"))).collect(),
        ),
        Event::new(
            102,
            2,
            "2x2",
            (4..=6).map(|i| Scramble::new(i, format!("2x2 #{i}"))).collect(),
        ),
        Event::new(103, 17, "FMC", vec![Scramble::new(7, "FMC #1")]),
        Event::new(104, 5, "Pyraminx", vec![Scramble::new(8, "pyra #1")]),
    ])
}

fn run_script<S: SummaryService>(
    manager: &mut CompManager<RecordingClock>,
    service: &S,
    script: &[&str],
) -> Vec<Result<Outcome, SessionError>> {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    for line in script {
        tx.send(SessionEvent::Command(line.parse().unwrap())).unwrap();
    }
    drop(tx);

    let mut outcomes = Vec::new();
    for _ in 0..500u32 {
        match runner.step() {
            SessionEvent::Tick => {}
            SessionEvent::Eof => break,
            SessionEvent::Command(cmd) => outcomes.push(manager.handle(cmd, service)),
        }
    }
    outcomes
}

// Drives a whole sitting through the Runner the way the driver binary does.
#[test]
fn headless_session_flow_completes() {
    let mut manager = CompManager::new(session(), RecordingClock::default());
    let service = Recorded(r#"{"101": "60.12 = 60.12, 55.00, (70.00)", "103": "29"}"#);

    let outcomes = run_script(
        &mut manager,
        &service,
        &[
            "open 101",
            "solve 6012",
            "solve 5500",
            "solve 7000",
            "close",
            "open 102",
            "solve 5012",
            "solve 4400",
            "dnf 5",
            "close",
            "open 103",
            "key 7 2",
            "key 7 x",
            "key 7 9",
            "close",
            "summary",
        ],
    );

    let session = manager.session();
    assert_eq!(session.event(101).unwrap().status(), EventStatus::Complete);
    assert_eq!(session.event(102).unwrap().status(), EventStatus::Incomplete);
    assert_eq!(session.event(103).unwrap().status(), EventStatus::Complete);
    assert_eq!(session.event(104).unwrap().status(), EventStatus::Unstarted);
    assert_eq!(session.scramble(103, 7).unwrap().time(), Some(29));

    let summary = match outcomes.last() {
        Some(Ok(Outcome::Summary(s))) => s.clone(),
        other => panic!("expected a summary, got {other:?}"),
    };
    let complete: Vec<_> = summary
        .complete_events
        .iter()
        .map(|e| (e.comp_event_id, e.summary.as_str()))
        .collect();
    assert_eq!(
        complete,
        vec![(101, "60.12 = 60.12, 55.00, (70.00)"), (103, "29")]
    );
    assert_eq!(summary.incomplete_events[0].summary, "? = 50.12, DNF");
    assert!(summary.show_submit_button);
    assert!(!summary.no_solves);
}

#[test]
fn headless_retry_then_record_matches_direct_record() {
    let mut manager = CompManager::new(session(), RecordingClock::default());
    let service = Recorded("{}");

    run_script(
        &mut manager,
        &service,
        &["open 101", "solve 900", "plus2 1", "retry 1", "solve 1100"],
    );

    let mut direct = Scramble::new(1, "3x3 #1");
    direct.record_time(1100);
    assert_eq!(manager.session().scramble(101, 1).unwrap(), &direct);
    assert_eq!(manager.attached(), Some(2));
    assert!(manager.clock().calls.contains(&ClockCall::Reset));
}

#[test]
fn headless_missing_summary_is_reported() {
    let mut manager = CompManager::new(session(), RecordingClock::default());
    let service = Recorded("{}");

    let outcomes = run_script(
        &mut manager,
        &service,
        &["open 104", "solve 321", "close", "summary"],
    );

    assert_matches!(
        outcomes.last(),
        Some(Err(SessionError::Summary(SummaryError::MissingSummary(104))))
    );
    assert_eq!(manager.session().event(104).unwrap().summary, None);
    assert!(!manager.summary_in_flight());
}

#[test]
fn headless_submit_button_follows_identity() {
    let script = ["open 102", "solve 5012", "close", "summary"];

    let mut anonymous = CompManager::new(session(), RecordingClock::default());
    let outcomes = run_script(&mut anonymous, &Recorded("{}"), &script);
    assert_matches!(outcomes.last(), Some(Ok(Outcome::Summary(s))) => {
        assert!(!s.show_submit_button);
        assert!(!s.logged_in);
    });

    let authed = session().with_identity(Identity::Authenticated("alex".into()));
    let mut manager = CompManager::new(authed, RecordingClock::default());
    let outcomes = run_script(&mut manager, &Recorded("{}"), &script);
    assert_matches!(outcomes.last(), Some(Ok(Outcome::Summary(s))) => {
        assert!(s.show_submit_button);
        assert!(s.logged_in);
    });
}

#[test]
fn headless_submission_payload_is_whole_session() {
    let mut manager = CompManager::new(session(), RecordingClock::default())
        .with_endpoints("/eventSummaries", "input-results");
    manager.open_event(101).unwrap();
    manager.on_timer_complete(4321).unwrap();
    manager
        .apply_action(1, PenaltyAction::PlusTwo)
        .unwrap();
    manager.set_comment("first official sub-45").unwrap();

    let form = manager.submission_form().unwrap();
    assert_eq!(form.field, "input-results");
    let value: serde_json::Value = serde_json::from_str(&form.payload).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 4);
    assert_eq!(value["101"]["scrambles"][0]["isPlusTwo"], true);
    assert_eq!(value["101"]["comment"], "first official sub-45");
    assert_eq!(value["104"]["status"], "unstarted");
}
