use std::str::FromStr;

use crate::error::CommandError;
use crate::event::CompEventId;
use crate::scramble::{PenaltyAction, ScrambleId};

/// One user input, decoupled from whatever widget produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(CompEventId),
    /// Elapsed reading delivered by the clock, kept raw so bad readings can be refused.
    TimerComplete(String),
    Penalty(ScrambleId, PenaltyAction),
    FmcKey(ScrambleId, char),
    FmcBackspace(ScrambleId),
    FmcSelect(ScrambleId),
    Comment(String),
    Close,
    Summary,
    Submit,
}

fn id_arg(arg: Option<&str>, name: &'static str) -> Result<u64, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument(name))?;
    arg.parse()
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    /// Script syntax, one command per line:
    /// `open 12`, `solve 6012`, `dnf 100`, `plus2 100`, `clear 100`, `retry 100`,
    /// `key 200 5`, `backspace 200`, `select 200`, `comment text`, `close`,
    /// `summary`, `submit`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        match word {
            "" => Err(CommandError::Empty),
            "open" => Ok(Command::Open(id_arg(args.next(), "open")?)),
            "solve" => args
                .next()
                .map(|raw| Command::TimerComplete(raw.to_string()))
                .ok_or(CommandError::MissingArgument("solve")),
            "clear" => penalty(args.next(), PenaltyAction::ClearPenalty),
            "dnf" => penalty(args.next(), PenaltyAction::Dnf),
            "plus2" | "+2" => penalty(args.next(), PenaltyAction::PlusTwo),
            "retry" => penalty(args.next(), PenaltyAction::Retry),
            "key" => {
                let scramble = id_arg(args.next(), "key")?;
                let arg = args.next().ok_or(CommandError::MissingArgument("key"))?;
                let mut chars = arg.chars();
                match (chars.next(), chars.next()) {
                    (Some(key), None) => Ok(Command::FmcKey(scramble, key)),
                    _ => Err(CommandError::InvalidNumber(arg.to_string())),
                }
            }
            "backspace" => Ok(Command::FmcBackspace(id_arg(args.next(), "backspace")?)),
            "select" => Ok(Command::FmcSelect(id_arg(args.next(), "select")?)),
            "comment" => Ok(Command::Comment(rest.to_string())),
            "close" => Ok(Command::Close),
            "summary" => Ok(Command::Summary),
            "submit" => Ok(Command::Submit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn penalty(arg: Option<&str>, action: PenaltyAction) -> Result<Command, CommandError> {
    let name = match action {
        PenaltyAction::ClearPenalty => "clear",
        PenaltyAction::Dnf => "dnf",
        PenaltyAction::PlusTwo => "plus2",
        PenaltyAction::Retry => "retry",
    };
    Ok(Command::Penalty(id_arg(arg, name)?, action))
}
