//! Chat command parsing.

use std::fmt;

use crate::bot::duration::{self, ParseError};

/// Upper bound on messages deleted by one `clear`.
const CLEAR_LIMIT: u32 = 100;

/// A recognized chat command with validated arguments.
///
/// Mention arguments (`save`, `load`, `add`) come from the message's mention
/// lists rather than the text, so those variants carry no payload here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `save @user...`: snapshot each mentioned member's roles.
    Save,
    /// `load @user...`: restore each mentioned member's saved roles.
    Load,
    /// `add @user... @role...`: grant every mentioned role to every mentioned user.
    Add,
    /// `clear <count>`: bulk-delete recent messages in the invoking channel.
    Clear { count: u8 },
    /// `!remind <duration> <text...>`: delayed notification, gated on kick capability.
    Remind { seconds: u64, text: String },
}

/// Rejected arguments for a recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    MissingCount,
    InvalidCount(String),
    MissingDuration,
    Duration(ParseError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCount => write!(f, "clear needs a message count"),
            Self::InvalidCount(raw) => write!(f, "'{}' is not a message count", raw),
            Self::MissingDuration => write!(f, "!remind needs a duration"),
            Self::Duration(source) => write!(f, "bad duration: {}", source),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parse a message into a command.
    ///
    /// `None` means the first token is not a command, just normal chat traffic,
    /// not an error. `Some(Err(_))` means a recognized command carried
    /// arguments that fail validation.
    pub fn parse(text: &str) -> Option<Result<Command, CommandError>> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?;

        let parsed = match head {
            "save" => Ok(Command::Save),
            "load" => Ok(Command::Load),
            "add" => Ok(Command::Add),
            "clear" => parse_clear(tokens.next()),
            "!remind" => parse_remind(tokens.next(), tokens),
            _ => return None,
        };
        Some(parsed)
    }
}

fn parse_clear(count: Option<&str>) -> Result<Command, CommandError> {
    let raw = count.ok_or(CommandError::MissingCount)?;
    let count: u32 = raw
        .parse()
        .map_err(|_| CommandError::InvalidCount(raw.to_string()))?;
    Ok(Command::Clear { count: count.min(CLEAR_LIMIT) as u8 })
}

fn parse_remind<'a>(
    duration: Option<&str>,
    rest: impl Iterator<Item = &'a str>,
) -> Result<Command, CommandError> {
    let token = duration.ok_or(CommandError::MissingDuration)?;
    let seconds = duration::parse_duration(token).map_err(CommandError::Duration)?;
    let text = rest.collect::<Vec<_>>().join(" ");
    Ok(Command::Remind { seconds, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(Command::parse("save <@100>"), Some(Ok(Command::Save)));
        assert_eq!(Command::parse("load <@100> <@101>"), Some(Ok(Command::Load)));
        assert_eq!(Command::parse("add <@100> <@&200>"), Some(Ok(Command::Add)));
    }

    #[test]
    fn test_normal_chat_is_not_a_command() {
        assert_eq!(Command::parse("hello everyone"), None);
        assert_eq!(Command::parse("saved you a seat"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_clear_count() {
        assert_eq!(Command::parse("clear 50"), Some(Ok(Command::Clear { count: 50 })));
    }

    #[test]
    fn test_clear_clamps_to_limit() {
        assert_eq!(Command::parse("clear 150"), Some(Ok(Command::Clear { count: 100 })));
        assert_eq!(Command::parse("clear 100"), Some(Ok(Command::Clear { count: 100 })));
    }

    #[test]
    fn test_clear_rejects_bad_count() {
        assert_eq!(
            Command::parse("clear soon"),
            Some(Err(CommandError::InvalidCount("soon".to_string())))
        );
        assert_eq!(
            Command::parse("clear -5"),
            Some(Err(CommandError::InvalidCount("-5".to_string())))
        );
        assert_eq!(Command::parse("clear"), Some(Err(CommandError::MissingCount)));
    }

    #[test]
    fn test_remind_parses_duration_and_payload() {
        assert_eq!(
            Command::parse("!remind 1h30m stand up and stretch"),
            Some(Ok(Command::Remind { seconds: 5400, text: "stand up and stretch".to_string() }))
        );
    }

    #[test]
    fn test_remind_empty_payload() {
        assert_eq!(
            Command::parse("!remind 45s"),
            Some(Ok(Command::Remind { seconds: 45, text: String::new() }))
        );
    }

    #[test]
    fn test_remind_zero_duration_is_valid() {
        assert_eq!(
            Command::parse("!remind 0m tea"),
            Some(Ok(Command::Remind { seconds: 0, text: "tea".to_string() }))
        );
    }

    #[test]
    fn test_remind_rejects_bad_duration() {
        assert!(matches!(
            Command::parse("!remind 1x tea"),
            Some(Err(CommandError::Duration(_)))
        ));
        assert_eq!(Command::parse("!remind"), Some(Err(CommandError::MissingDuration)));
    }
}
