use serde::{Deserialize, Serialize};

use crate::scramble::{Scramble, ScrambleId};
use crate::util::TimeFormat;

pub type CompEventId = u64;

/// Name of the one event recorded by manual move-count entry instead of the timer.
pub const FMC_EVENT_NAME: &str = "FMC";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Unstarted,
    Incomplete,
    Complete,
}

/// Completeness of an event, counted by presence of a recorded time.
pub fn derive_status(scrambles: &[Scramble]) -> EventStatus {
    let attempted = scrambles.iter().filter(|s| s.is_attempted()).count();
    match attempted {
        0 => EventStatus::Unstarted,
        n if n == scrambles.len() => EventStatus::Complete,
        _ => EventStatus::Incomplete,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub comp_event_id: CompEventId,
    pub event_id: u64,
    #[serde(alias = "name")]
    pub event_name: String,
    pub scrambles: Vec<Scramble>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Event {
    pub fn new(
        comp_event_id: CompEventId,
        event_id: u64,
        event_name: impl Into<String>,
        scrambles: Vec<Scramble>,
    ) -> Self {
        let mut event = Self {
            comp_event_id,
            event_id,
            event_name: event_name.into(),
            scrambles,
            comment: String::new(),
            status: EventStatus::Unstarted,
            summary: None,
        };
        event.refresh_status();
        event
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn is_fmc(&self) -> bool {
        self.event_name == FMC_EVENT_NAME
    }

    pub fn scramble(&self, id: ScrambleId) -> Option<&Scramble> {
        self.scrambles.iter().find(|s| s.id == id)
    }

    pub(crate) fn scramble_mut(&mut self, id: ScrambleId) -> Option<&mut Scramble> {
        self.scrambles.iter_mut().find(|s| s.id == id)
    }

    /// First scramble, in attempt order, with no recorded time.
    pub fn first_unset(&self) -> Option<ScrambleId> {
        self.scrambles
            .iter()
            .find(|s| !s.is_attempted())
            .map(|s| s.id)
    }

    pub fn attempted(&self) -> impl Iterator<Item = &Scramble> {
        self.scrambles.iter().filter(|s| s.is_attempted())
    }

    pub(crate) fn refresh_status(&mut self) {
        self.status = derive_status(&self.scrambles);
    }

    /// FMC results are move counts and are shown bare.
    pub fn display_value(&self, scramble: &Scramble, format: TimeFormat) -> String {
        if self.is_fmc() {
            scramble.time().map(|n| n.to_string()).unwrap_or_default()
        } else {
            scramble.display_value(format)
        }
    }
}
