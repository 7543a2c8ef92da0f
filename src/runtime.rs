use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::command::Command;

/// Unified event type consumed by the session runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Command(Command),
    /// The clock's own periodic tick. Never mutates scramble state; the driver ignores it.
    Tick,
    /// Input is exhausted.
    Eof,
}

/// Source of session events (script lines, UI adapters, tests)
pub trait SessionEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Reads one command per line on a background thread.
///
/// Blank lines and `#` comments are skipped; lines that do not parse are logged and
/// dropped. `Eof` is sent once the reader runs dry.
pub struct LineEventSource {
    rx: Receiver<SessionEvent>,
}

impl LineEventSource {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => {
                        if tx.send(SessionEvent::Command(cmd)).is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!(line, error = %e, "skipping script line"),
                }
            }
            let _ = tx.send(SessionEvent::Eof);
        });

        Self { rx }
    }
}

impl SessionEventSource for LineEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl SessionEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the session one event/tick at a time
pub struct Runner<E: SessionEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: SessionEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, Tick on timeout,
    /// or Eof once the source has gone away
    pub fn step(&self) -> SessionEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => SessionEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => SessionEvent::Eof,
        }
    }
}
