use crate::command::Command;
use crate::error::{SessionError, SummaryError};
use crate::event::CompEventId;
use crate::fmc::FmcEntry;
use crate::scramble::{parse_raw_time, PenaltyAction, Scramble, ScrambleId};
use crate::session::Session;
use crate::submission::{
    parse_summary_response, SubmissionForm, SubmitGuard, SummaryRequest, RESULTS_FIELD,
    SUMMARY_ENDPOINT,
};
use crate::summary::{build_summary, SessionSummary, SummaryService};
use crate::timer::{Clock, TimerAttachment};

/// How results are entered for the event currently open.
#[derive(Debug)]
pub enum EntryMode {
    Timer,
    Fmc(FmcEntry),
}

#[derive(Debug)]
struct OpenEvent {
    id: CompEventId,
    mode: EntryMode,
}

/// Result of handling one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Whether session state changed.
    Updated(bool),
    Summary(SessionSummary),
    Submission(SubmissionForm),
}

/// Owns a session and routes user commands and clock readings into it.
#[derive(Debug)]
pub struct CompManager<C: Clock> {
    session: Session,
    clock: C,
    timer: TimerAttachment,
    open: Option<OpenEvent>,
    guard: SubmitGuard,
    pending: Option<SummaryRequest>,
    summary_endpoint: String,
    results_field: String,
}

impl<C: Clock> CompManager<C> {
    pub fn new(session: Session, clock: C) -> Self {
        Self {
            session,
            clock,
            timer: TimerAttachment::new(),
            open: None,
            guard: SubmitGuard::default(),
            pending: None,
            summary_endpoint: SUMMARY_ENDPOINT.to_string(),
            results_field: RESULTS_FIELD.to_string(),
        }
    }

    pub fn with_endpoints(
        mut self,
        summary_endpoint: impl Into<String>,
        results_field: impl Into<String>,
    ) -> Self {
        self.summary_endpoint = summary_endpoint.into();
        self.results_field = results_field.into();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn attached(&self) -> Option<ScrambleId> {
        self.timer.attached()
    }

    pub fn open_event_id(&self) -> Option<CompEventId> {
        self.open.as_ref().map(|o| o.id)
    }

    pub fn entry_mode(&self) -> Option<&EntryMode> {
        self.open.as_ref().map(|o| &o.mode)
    }

    pub fn fmc(&self) -> Option<&FmcEntry> {
        match self.entry_mode() {
            Some(EntryMode::Fmc(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn summary_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn open_event(&mut self, id: CompEventId) -> Result<(), SessionError> {
        let event = self.session.event(id)?;
        if self.open.is_some() {
            self.timer.detach();
        }
        let mode = if event.is_fmc() {
            EntryMode::Fmc(FmcEntry::open(event))
        } else {
            self.timer.select_initial(event, &mut self.clock);
            EntryMode::Timer
        };
        tracing::debug!(event = id, name = %event.event_name, "event opened");
        self.open = Some(OpenEvent { id, mode });
        Ok(())
    }

    pub fn close_event(&mut self) {
        if let Some(open) = self.open.take() {
            self.timer.detach();
            tracing::debug!(event = open.id, "event closed");
        }
    }

    fn open_id(&self) -> Result<CompEventId, SessionError> {
        self.open_event_id().ok_or(SessionError::NoOpenEvent)
    }

    /// A finished reading from the clock. Ignored when nothing is attached.
    pub fn on_timer_complete(&mut self, elapsed: i64) -> Result<bool, SessionError> {
        let Some(scramble) = self.timer.attached() else {
            tracing::trace!(elapsed, "reading with no attached scramble");
            return Ok(false);
        };
        let event = self.open_id()?;
        let recorded = self
            .session
            .mutate_scramble(event, scramble, |s| s.record_time(elapsed))?;
        if recorded {
            self.timer
                .advance(self.session.event(event)?, &mut self.clock);
        }
        Ok(recorded)
    }

    /// Textual form of [`Self::on_timer_complete`]; malformed readings are refused.
    pub fn on_timer_reading(&mut self, raw: &str) -> Result<bool, SessionError> {
        match parse_raw_time(raw) {
            Some(cs) => self.on_timer_complete(i64::from(cs)),
            None => {
                tracing::debug!(raw, "malformed timer reading refused");
                Ok(false)
            }
        }
    }

    /// Penalty menu action on a scramble of the open event. FMC events have no menu.
    pub fn apply_action(
        &mut self,
        scramble: ScrambleId,
        action: PenaltyAction,
    ) -> Result<bool, SessionError> {
        let event = self.open_id()?;
        if self.fmc().is_some() {
            return Ok(false);
        }
        let applied = self
            .session
            .mutate_scramble(event, scramble, |s| s.apply(action))?;
        if applied && action == PenaltyAction::Retry {
            let target = self.session.scramble(event, scramble)?;
            self.timer.retry_attach(target, &mut self.clock);
        }
        Ok(applied)
    }

    pub fn fmc_keystroke(&mut self, scramble: ScrambleId, key: char) -> Result<bool, SessionError> {
        self.with_fmc(scramble, |entry, s| entry.keystroke(s, key))
    }

    pub fn fmc_backspace(&mut self, scramble: ScrambleId) -> Result<bool, SessionError> {
        self.with_fmc(scramble, FmcEntry::backspace)
    }

    pub fn fmc_select(&mut self, scramble: ScrambleId) -> Result<bool, SessionError> {
        let event = self.open_id()?;
        let ev = self.session.event(event)?;
        match self.open.as_mut().map(|o| &mut o.mode) {
            Some(EntryMode::Fmc(entry)) => Ok(entry.select(ev, scramble)),
            _ => Ok(false),
        }
    }

    fn with_fmc<F>(&mut self, scramble: ScrambleId, f: F) -> Result<bool, SessionError>
    where
        F: FnOnce(&mut FmcEntry, &mut Scramble) -> bool,
    {
        let Some(open) = self.open.as_mut() else {
            return Err(SessionError::NoOpenEvent);
        };
        let EntryMode::Fmc(entry) = &mut open.mode else {
            return Ok(false);
        };
        self.session
            .mutate_scramble(open.id, scramble, |s| f(entry, s))
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), SessionError> {
        let event = self.open_id()?;
        self.session.set_comment(event, comment)
    }

    /// Captures the batch of complete events and marks a request in flight.
    /// Returns the request body.
    pub fn begin_summary(&mut self) -> Result<String, SessionError> {
        let request = SummaryRequest::new(&self.session);
        let body = request.body()?;
        self.guard.begin()?;
        self.pending = Some(request);
        Ok(body)
    }

    /// Runs the summary builder on the endpoint's answer. A failed or malformed
    /// answer is reported as is and leaves every event summary untouched.
    pub fn complete_summary(
        &mut self,
        response: Result<String, SummaryError>,
    ) -> Result<SessionSummary, SessionError> {
        let request = self.pending.take().ok_or(SessionError::NoSummaryInFlight)?;
        self.guard.finish()?;
        let built = response
            .and_then(|body| parse_summary_response(&body))
            .and_then(|fetched| build_summary(&mut self.session, &request, &fetched));
        built.map_err(|e| {
            tracing::warn!(error = %e, "event summary failed");
            SessionError::from(e)
        })
    }

    pub fn fetch_summary<S: SummaryService>(
        &mut self,
        service: &S,
    ) -> Result<SessionSummary, SessionError> {
        let body = self.begin_summary()?;
        let response = service.request_summaries(&self.summary_endpoint, &body);
        self.complete_summary(response)
    }

    pub fn submission_form(&self) -> Result<SubmissionForm, SessionError> {
        SubmissionForm::new(&self.session, self.results_field.as_str())
    }

    pub fn handle<S: SummaryService>(
        &mut self,
        command: Command,
        service: &S,
    ) -> Result<Outcome, SessionError> {
        let updated = match command {
            Command::Open(id) => self.open_event(id).map(|_| true),
            Command::TimerComplete(raw) => self.on_timer_reading(&raw),
            Command::Penalty(scramble, action) => self.apply_action(scramble, action),
            Command::FmcKey(scramble, key) => self.fmc_keystroke(scramble, key),
            Command::FmcBackspace(scramble) => self.fmc_backspace(scramble),
            Command::FmcSelect(scramble) => self.fmc_select(scramble),
            Command::Comment(text) => self.set_comment(text).map(|_| true),
            Command::Close => {
                self.close_event();
                Ok(true)
            }
            Command::Summary => return self.fetch_summary(service).map(Outcome::Summary),
            Command::Submit => return self.submission_form().map(Outcome::Submission),
        }?;
        Ok(Outcome::Updated(updated))
    }
}
