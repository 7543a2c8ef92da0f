use serde::{Deserialize, Serialize};

use crate::util::{format_centiseconds, TimeFormat, PLUS_TWO_CS};

pub type ScrambleId = u64;

/// Penalty currently applied to a timed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    Clean,
    PlusTwo,
    Dnf,
}

/// Where a scramble sits in the solve state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Unset,
    Timed(Penalty),
}

/// One scramble of an event together with the result recorded against it.
///
/// The recorded result is only reachable through the transitions below, which keep
/// `isDNF` and `isPlusTwo` mutually exclusive and never drop the underlying time of a
/// penalized solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scramble {
    pub id: ScrambleId,
    #[serde(alias = "scramble", default)]
    pub scramble_text: String,
    #[serde(default)]
    time: Option<u32>,
    #[serde(rename = "isDNF", default)]
    is_dnf: bool,
    #[serde(rename = "isPlusTwo", default)]
    is_plus_two: bool,
}

impl Scramble {
    pub fn new(id: ScrambleId, scramble_text: impl Into<String>) -> Self {
        Self {
            id,
            scramble_text: scramble_text.into(),
            time: None,
            is_dnf: false,
            is_plus_two: false,
        }
    }

    pub fn time(&self) -> Option<u32> {
        self.time
    }

    pub fn is_dnf(&self) -> bool {
        self.is_dnf
    }

    pub fn is_plus_two(&self) -> bool {
        self.is_plus_two
    }

    /// Presence, not truthiness: a recorded `0` counts as attempted.
    pub fn is_attempted(&self) -> bool {
        self.time.is_some()
    }

    pub fn has_penalty(&self) -> bool {
        self.is_dnf || self.is_plus_two
    }

    pub fn state(&self) -> SolveState {
        match self.time {
            None => SolveState::Unset,
            Some(_) if self.is_dnf => SolveState::Timed(Penalty::Dnf),
            Some(_) if self.is_plus_two => SolveState::Timed(Penalty::PlusTwo),
            Some(_) => SolveState::Timed(Penalty::Clean),
        }
    }

    pub fn record_time(&mut self, raw: i64) -> bool {
        if self.is_attempted() {
            tracing::trace!(scramble = self.id, "record refused, already timed");
            return false;
        }
        let Ok(cs) = u32::try_from(raw) else {
            tracing::trace!(scramble = self.id, raw, "record refused, malformed time");
            return false;
        };
        self.time = Some(cs);
        self.is_dnf = false;
        self.is_plus_two = false;
        true
    }

    pub fn apply_dnf(&mut self) -> bool {
        if !self.is_attempted() || self.is_dnf {
            return false;
        }
        self.is_dnf = true;
        self.is_plus_two = false;
        true
    }

    pub fn apply_plus_two(&mut self) -> bool {
        if !self.is_attempted() || self.is_plus_two {
            return false;
        }
        self.is_plus_two = true;
        self.is_dnf = false;
        true
    }

    pub fn clear_penalty(&mut self) -> bool {
        if !self.has_penalty() {
            return false;
        }
        self.is_dnf = false;
        self.is_plus_two = false;
        true
    }

    pub fn retry(&mut self) -> bool {
        if !self.is_attempted() {
            return false;
        }
        self.time = None;
        self.is_dnf = false;
        self.is_plus_two = false;
        true
    }

    /// Re-validates `action` against the current state before dispatching it.
    pub fn apply(&mut self, action: PenaltyAction) -> bool {
        if !action.is_enabled(self) {
            tracing::trace!(scramble = self.id, %action, "disabled action refused");
            return false;
        }
        match action {
            PenaltyAction::ClearPenalty => self.clear_penalty(),
            PenaltyAction::Dnf => self.apply_dnf(),
            PenaltyAction::PlusTwo => self.apply_plus_two(),
            PenaltyAction::Retry => self.retry(),
        }
    }

    /// Manual move-count entry. Returns whether the stored value changed.
    pub(crate) fn set_move_count(&mut self, count: Option<u32>) -> bool {
        let changed = self.time != count || self.has_penalty();
        self.time = count;
        self.is_dnf = false;
        self.is_plus_two = false;
        changed
    }

    /// Bootstrap data is not trusted to uphold the flag invariants.
    pub(crate) fn normalize(&mut self) {
        if self.time.is_none() {
            self.is_dnf = false;
            self.is_plus_two = false;
        } else if self.is_dnf {
            self.is_plus_two = false;
        }
    }

    /// Value shown on the solve card; empty while unattempted.
    pub fn display_value(&self, format: TimeFormat) -> String {
        match (self.state(), self.time) {
            (SolveState::Timed(Penalty::Dnf), _) => "DNF".to_string(),
            (SolveState::Timed(Penalty::PlusTwo), Some(cs)) => {
                format!("{}+", format_centiseconds(cs.saturating_add(PLUS_TWO_CS), format))
            }
            (_, Some(cs)) => format_centiseconds(cs, format),
            (_, None) => String::new(),
        }
    }
}

/// Parses a textual timer reading into centiseconds. Negative, fractional or
/// non-numeric readings are rejected.
pub fn parse_raw_time(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Commands the solve menu can issue against a timed scramble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PenaltyAction {
    #[strum(to_string = "Clear penalty")]
    ClearPenalty,
    #[strum(to_string = "DNF")]
    Dnf,
    #[strum(to_string = "+2")]
    PlusTwo,
    #[strum(to_string = "Redo solve")]
    Retry,
}

impl PenaltyAction {
    pub const ALL: [PenaltyAction; 4] = [
        PenaltyAction::ClearPenalty,
        PenaltyAction::Dnf,
        PenaltyAction::PlusTwo,
        PenaltyAction::Retry,
    ];

    pub fn is_enabled(self, scramble: &Scramble) -> bool {
        match self {
            PenaltyAction::ClearPenalty => scramble.has_penalty(),
            PenaltyAction::Dnf => scramble.is_attempted() && !scramble.is_dnf(),
            PenaltyAction::PlusTwo => scramble.is_attempted() && !scramble.is_plus_two(),
            PenaltyAction::Retry => scramble.is_attempted(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub action: PenaltyAction,
    pub label: String,
    pub enabled: bool,
}

pub fn penalty_menu(scramble: &Scramble) -> Vec<MenuItem> {
    PenaltyAction::ALL
        .iter()
        .map(|&action| MenuItem {
            action,
            label: action.to_string(),
            enabled: action.is_enabled(scramble),
        })
        .collect()
}
