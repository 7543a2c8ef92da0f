use thiserror::Error;

use crate::event::CompEventId;
use crate::scramble::ScrambleId;

/// Failures surfaced to whoever drives a session.
///
/// Refused solve transitions are not errors; they come back as `false` from the
/// transition itself.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown competition event {0}")]
    UnknownEvent(CompEventId),
    #[error("scramble {scramble} does not belong to competition event {event}")]
    UnknownScramble {
        event: CompEventId,
        scramble: ScrambleId,
    },
    #[error("no event is open")]
    NoOpenEvent,
    #[error("a summary request is already in flight")]
    SummaryInFlight,
    #[error("no summary request is in flight")]
    NoSummaryInFlight,
    #[error("event summary failed: {0}")]
    Summary(#[from] SummaryError),
    #[error("invalid event bootstrap data: {0}")]
    Bootstrap(#[source] serde_json::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Failures of the `/eventSummaries` round trip.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary endpoint answered with status {0}")]
    Status(u16),
    #[error("malformed summary response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("summary response has no entry for competition event {0}")]
    MissingSummary(CompEventId),
    #[error("summary transport failed: {0}")]
    Transport(String),
    #[error("summary response unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// A script line that could not be turned into a [`crate::command::Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` is missing an argument")]
    MissingArgument(&'static str),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}
