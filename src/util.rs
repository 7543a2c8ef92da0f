use serde::{Deserialize, Serialize};

/// Centiseconds added to the displayed time of a +2 solve.
pub const PLUS_TWO_CS: u32 = 200;

const CS_PER_SECOND: u32 = 100;
const CS_PER_MINUTE: u32 = 60 * CS_PER_SECOND;

/// How centisecond values are rendered. One format is used for a whole session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeFormat {
    /// `SS.cc`, seconds never roll over into minutes
    #[default]
    Seconds,
    /// `M:SS.cc` from one minute up, `SS.cc` below
    Clock,
}

pub fn format_centiseconds(cs: u32, format: TimeFormat) -> String {
    match format {
        TimeFormat::Clock if cs >= CS_PER_MINUTE => format!(
            "{}:{:02}.{:02}",
            cs / CS_PER_MINUTE,
            (cs % CS_PER_MINUTE) / CS_PER_SECOND,
            cs % CS_PER_SECOND
        ),
        _ => format!("{}.{:02}", cs / CS_PER_SECOND, cs % CS_PER_SECOND),
    }
}
