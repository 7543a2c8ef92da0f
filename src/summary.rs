use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;

use crate::error::SummaryError;
use crate::event::{CompEventId, Event};
use crate::session::Session;
use crate::submission::SummaryRequest;
use crate::util::TimeFormat;

/// Whatever computes official averages/bests for complete events.
///
/// Gets the JSON body of a [`SummaryRequest`] and answers with the raw response body,
/// a JSON object of `comp_event_id -> summary`.
pub trait SummaryService {
    fn request_summaries(&self, endpoint: &str, body: &str) -> Result<String, SummaryError>;
}

/// Replays a recorded `/eventSummaries` response from disk.
#[derive(Debug, Clone)]
pub struct FileSummaryService {
    path: PathBuf,
}

impl FileSummaryService {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl SummaryService for FileSummaryService {
    fn request_summaries(&self, endpoint: &str, body: &str) -> Result<String, SummaryError> {
        tracing::debug!(endpoint, bytes = body.len(), path = %self.path.display(), "replaying summary response");
        Ok(fs::read_to_string(&self.path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub comp_event_id: CompEventId,
    pub event_name: String,
    pub summary: String,
}

/// What the summary panel shows before the final submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub logged_in: bool,
    pub comp_title: String,
    pub complete_events: Vec<EventSummary>,
    pub incomplete_events: Vec<EventSummary>,
    pub show_submit_button: bool,
    pub no_solves: bool,
}

pub fn show_submit_button(complete: usize, incomplete: usize, authenticated: bool) -> bool {
    complete > 0 || (authenticated && complete + incomplete > 0)
}

/// `"? = "` followed by the attempted solves; there is no official result yet.
pub fn incomplete_summary(event: &Event, format: TimeFormat) -> String {
    format!(
        "? = {}",
        event
            .attempted()
            .map(|s| event.display_value(s, format))
            .join(", ")
    )
}

/// Attaches the fetched summaries to the complete events and the local fallback to the
/// incomplete ones.
///
/// Every complete event must have an entry in `fetched`; nothing is attached unless
/// they all do.
pub fn build_summary(
    session: &mut Session,
    request: &SummaryRequest,
    fetched: &HashMap<CompEventId, String>,
) -> Result<SessionSummary, SummaryError> {
    if let Some(missing) = request.complete_ids().find(|id| !fetched.contains_key(id)) {
        return Err(SummaryError::MissingSummary(missing));
    }

    let format = session.time_format();
    let mut complete_events = Vec::new();
    for id in request.complete_ids() {
        let Ok(event) = session.event_mut(id) else {
            continue;
        };
        let summary = fetched[&id].clone();
        event.summary = Some(summary.clone());
        complete_events.push(EventSummary {
            comp_event_id: id,
            event_name: event.event_name.clone(),
            summary,
        });
    }

    let mut incomplete_events = Vec::new();
    for &id in request.incomplete_ids() {
        let Ok(event) = session.event_mut(id) else {
            continue;
        };
        let summary = incomplete_summary(event, format);
        event.summary = Some(summary.clone());
        incomplete_events.push(EventSummary {
            comp_event_id: id,
            event_name: event.event_name.clone(),
            summary,
        });
    }

    Ok(SessionSummary {
        logged_in: session.is_authenticated(),
        comp_title: session.comp_title().to_string(),
        show_submit_button: show_submit_button(
            complete_events.len(),
            incomplete_events.len(),
            session.is_authenticated(),
        ),
        no_solves: complete_events.is_empty() && incomplete_events.is_empty(),
        complete_events,
        incomplete_events,
    })
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.comp_title.is_empty() {
            writeln!(f, "{}", self.comp_title)?;
        }
        if self.no_solves {
            writeln!(f, "no solves recorded")?;
        }
        for e in self.complete_events.iter().chain(&self.incomplete_events) {
            writeln!(f, "{}: {}", e.event_name, e.summary)?;
        }
        if self.show_submit_button {
            writeln!(f, "ready to submit")?;
        }
        Ok(())
    }
}
