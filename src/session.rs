use std::collections::BTreeMap;

use crate::error::SessionError;
use crate::event::{CompEventId, Event, EventStatus};
use crate::scramble::{Scramble, ScrambleId};
use crate::util::TimeFormat;

/// Who the session's results are attributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(String),
}

/// Every event of one sitting, and the context their results are shown in.
#[derive(Debug, Clone, Default)]
pub struct Session {
    events: BTreeMap<CompEventId, Event>,
    identity: Identity,
    comp_title: String,
    time_format: TimeFormat,
}

impl Session {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        let events = events
            .into_iter()
            .map(|mut event| {
                event.scrambles.iter_mut().for_each(Scramble::normalize);
                if event.is_fmc() {
                    for s in &mut event.scrambles {
                        s.set_move_count(s.time().filter(|&count| count > 0));
                    }
                }
                event.refresh_status();
                (event.comp_event_id, event)
            })
            .collect();
        Self {
            events,
            ..Self::default()
        }
    }

    /// Accepts the event definitions either keyed by `comp_event_id`, as the hosting
    /// page renders them, or as a plain list.
    pub fn from_events_json(json: &str) -> Result<Self, SessionError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(SessionError::Bootstrap)?;
        let events: Vec<Event> = match value {
            serde_json::Value::Object(keyed) => keyed
                .into_iter()
                .map(|(_, event)| serde_json::from_value(event))
                .collect::<Result<_, _>>(),
            listed => serde_json::from_value(listed),
        }
        .map_err(SessionError::Bootstrap)?;
        let session = Self::new(events);
        tracing::debug!(events = session.events.len(), "session bootstrapped");
        Ok(session)
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.comp_title = title.into();
        self
    }

    pub fn with_time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.identity, Identity::Authenticated(_))
    }

    pub fn comp_title(&self) -> &str {
        &self.comp_title
    }

    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    /// Events in ascending `comp_event_id` order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn event(&self, id: CompEventId) -> Result<&Event, SessionError> {
        self.events.get(&id).ok_or(SessionError::UnknownEvent(id))
    }

    pub(crate) fn event_mut(&mut self, id: CompEventId) -> Result<&mut Event, SessionError> {
        self.events
            .get_mut(&id)
            .ok_or(SessionError::UnknownEvent(id))
    }

    pub fn scramble(&self, event: CompEventId, scramble: ScrambleId) -> Result<&Scramble, SessionError> {
        self.event(event)?
            .scramble(scramble)
            .ok_or(SessionError::UnknownScramble { event, scramble })
    }

    pub fn ids_with_status(&self, status: EventStatus) -> Vec<CompEventId> {
        self.events
            .values()
            .filter(|e| e.status() == status)
            .map(|e| e.comp_event_id)
            .collect()
    }

    /// Runs `f` against one scramble and re-derives the owning event's status.
    /// A change drops the event's summary, which no longer describes its solves.
    /// Returns what `f` returned, i.e. whether the scramble changed.
    pub fn mutate_scramble<F>(
        &mut self,
        event: CompEventId,
        scramble: ScrambleId,
        f: F,
    ) -> Result<bool, SessionError>
    where
        F: FnOnce(&mut Scramble) -> bool,
    {
        let ev = self.event_mut(event)?;
        let target = ev
            .scramble_mut(scramble)
            .ok_or(SessionError::UnknownScramble { event, scramble })?;
        let changed = f(target);
        ev.refresh_status();
        if changed {
            ev.summary = None;
            tracing::debug!(event, scramble, status = %ev.status(), "scramble updated");
        }
        Ok(changed)
    }

    pub fn set_comment(&mut self, event: CompEventId, comment: impl Into<String>) -> Result<(), SessionError> {
        self.event_mut(event)?.comment = comment.into();
        Ok(())
    }

    /// The whole session as the JSON object sent on submit, keyed by `comp_event_id`.
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(&self.events).map_err(SessionError::Serialize)
    }
}
