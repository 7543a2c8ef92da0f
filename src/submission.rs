use std::collections::HashMap;

use crate::error::{SessionError, SummaryError};
use crate::event::{CompEventId, Event, EventStatus};
use crate::session::Session;

/// Default path the batch of complete events is posted to.
pub const SUMMARY_ENDPOINT: &str = "/eventSummaries";
/// Default form field carrying the serialized session on submit.
pub const RESULTS_FIELD: &str = "results";

/// The outbound `/eventSummaries` batch, captured in full before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    complete: Vec<Event>,
    incomplete: Vec<CompEventId>,
}

impl SummaryRequest {
    pub fn new(session: &Session) -> Self {
        let complete = session
            .events()
            .filter(|e| e.status() == EventStatus::Complete)
            .cloned()
            .collect();
        Self {
            complete,
            incomplete: session.ids_with_status(EventStatus::Incomplete),
        }
    }

    pub fn complete_ids(&self) -> impl Iterator<Item = CompEventId> + '_ {
        self.complete.iter().map(|e| e.comp_event_id)
    }

    pub fn incomplete_ids(&self) -> &[CompEventId] {
        &self.incomplete
    }

    /// JSON array of the complete events, in `comp_event_id` order.
    pub fn body(&self) -> Result<String, SessionError> {
        serde_json::to_string(&self.complete).map_err(SessionError::Serialize)
    }
}

/// Reads the `comp_event_id -> summary` object the endpoint answers with.
pub fn parse_summary_response(body: &str) -> Result<HashMap<CompEventId, String>, SummaryError> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    AwaitingSummary,
}

/// Keeps a second summary request from starting while one is unanswered.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    state: SubmitState,
}

impl SubmitGuard {
    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn begin(&mut self) -> Result<(), SessionError> {
        match self.state {
            SubmitState::AwaitingSummary => Err(SessionError::SummaryInFlight),
            SubmitState::Idle => {
                self.state = SubmitState::AwaitingSummary;
                Ok(())
            }
        }
    }

    pub fn finish(&mut self) -> Result<(), SessionError> {
        match self.state {
            SubmitState::Idle => Err(SessionError::NoSummaryInFlight),
            SubmitState::AwaitingSummary => {
                self.state = SubmitState::Idle;
                Ok(())
            }
        }
    }
}

/// Final submit: the whole session, unstarted events included, as one JSON field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub field: String,
    pub payload: String,
}

impl SubmissionForm {
    pub fn new(session: &Session, field: impl Into<String>) -> Result<Self, SessionError> {
        Ok(Self {
            field: field.into(),
            payload: session.to_json()?,
        })
    }

    pub fn pairs(&self) -> [(&str, &str); 1] {
        [(self.field.as_str(), self.payload.as_str())]
    }
}
