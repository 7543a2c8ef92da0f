use std::collections::HashMap;

use crate::event::Event;
use crate::scramble::{Scramble, ScrambleId};

/// Move count an entry stands for, if it is a positive integer.
pub fn move_count(entry: &str) -> Option<u32> {
    entry.parse::<u32>().ok().filter(|&n| n > 0)
}

/// Manual move-count entry for the FMC event, which has no timer.
///
/// Each scramble keeps its own digit buffer. Every accepted edit immediately
/// re-evaluates the buffer and writes the result (or its absence) to the scramble.
#[derive(Debug, Default)]
pub struct FmcEntry {
    buffers: HashMap<ScrambleId, String>,
    active: Option<ScrambleId>,
}

impl FmcEntry {
    /// Seeds the buffers from counts already recorded and shows the first scramble.
    pub fn open(event: &Event) -> Self {
        let buffers = event
            .scrambles
            .iter()
            .map(|s| (s.id, s.time().map(|n| n.to_string()).unwrap_or_default()))
            .collect();
        Self {
            buffers,
            active: event.scrambles.first().map(|s| s.id),
        }
    }

    pub fn active(&self) -> Option<ScrambleId> {
        self.active
    }

    pub fn active_scramble_text<'a>(&self, event: &'a Event) -> Option<&'a str> {
        self.active
            .and_then(|id| event.scramble(id))
            .map(|s| s.scramble_text.as_str())
    }

    pub fn buffer(&self, scramble: ScrambleId) -> &str {
        self.buffers.get(&scramble).map(String::as_str).unwrap_or("")
    }

    /// Only decimal digits get in; anything else is dropped without touching state.
    /// Returns whether the recorded count changed.
    pub fn keystroke(&mut self, scramble: &mut Scramble, c: char) -> bool {
        if !c.is_ascii_digit() {
            tracing::trace!(scramble = scramble.id, key = %c, "non-digit ignored");
            return false;
        }
        self.buffers.entry(scramble.id).or_default().push(c);
        self.commit(scramble)
    }

    pub fn backspace(&mut self, scramble: &mut Scramble) -> bool {
        let popped = self
            .buffers
            .get_mut(&scramble.id)
            .and_then(String::pop)
            .is_some();
        popped && self.commit(scramble)
    }

    /// Switches the displayed scramble. Recorded counts are left alone.
    pub fn select(&mut self, event: &Event, scramble: ScrambleId) -> bool {
        if event.scramble(scramble).is_none() {
            return false;
        }
        self.active = Some(scramble);
        true
    }

    fn commit(&self, scramble: &mut Scramble) -> bool {
        scramble.set_move_count(move_count(self.buffer(scramble.id)))
    }
}
