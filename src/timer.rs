use crate::event::Event;
use crate::scramble::{Scramble, ScrambleId};

/// The external clock service a solve is timed with.
///
/// The clock runs its own ticks. The core only tells it where the next reading goes
/// and when to start over; readings come back through
/// [`crate::manager::CompManager::on_timer_complete`].
pub trait Clock {
    fn attach(&mut self, scramble: ScrambleId);
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCall {
    Attach(ScrambleId),
    Reset,
}

/// Clock that only remembers what it was told. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingClock {
    pub calls: Vec<ClockCall>,
}

impl Clock for RecordingClock {
    fn attach(&mut self, scramble: ScrambleId) {
        self.calls.push(ClockCall::Attach(scramble));
    }

    fn reset(&mut self) {
        self.calls.push(ClockCall::Reset);
    }
}

/// Tracks the single scramble the clock currently records into.
#[derive(Debug, Default)]
pub struct TimerAttachment {
    attached: Option<ScrambleId>,
}

impl TimerAttachment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> Option<ScrambleId> {
        self.attached
    }

    /// A finished event being revisited is left unattached.
    pub fn select_initial<C: Clock>(&mut self, event: &Event, clock: &mut C) -> Option<ScrambleId> {
        self.attach_first_unset(event, clock)
    }

    /// Moves on after a solve was recorded; detaches once every scramble is timed.
    pub fn advance<C: Clock>(&mut self, event: &Event, clock: &mut C) -> Option<ScrambleId> {
        self.attach_first_unset(event, clock)
    }

    /// Binds straight to a scramble that was just reset for another attempt,
    /// ignoring attempt order.
    pub fn retry_attach<C: Clock>(&mut self, scramble: &Scramble, clock: &mut C) {
        clock.reset();
        self.attach(scramble.id, clock);
    }

    pub fn detach(&mut self) {
        if let Some(previous) = self.attached.take() {
            tracing::debug!(scramble = previous, "timer detached");
        }
    }

    fn attach_first_unset<C: Clock>(&mut self, event: &Event, clock: &mut C) -> Option<ScrambleId> {
        match event.first_unset() {
            Some(id) => self.attach(id, clock),
            None => self.detach(),
        }
        self.attached
    }

    fn attach<C: Clock>(&mut self, scramble: ScrambleId, clock: &mut C) {
        self.attached = Some(scramble);
        clock.attach(scramble);
        tracing::debug!(scramble, "timer attached");
    }
}
