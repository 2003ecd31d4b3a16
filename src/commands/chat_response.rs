//! Chat response formatters for bot commands.
//!
//! Twitch chat is plain text: every formatter returns a single line, and
//! [`format_chat_line`] flattens multi-line file content before it is sent.

use crate::commands::command::Command;

/// Formats the list of commands answered by the bot.
///
/// # Examples
///
/// ```
/// use tarkov_bot::commands::{Command, format_available_commands};
///
/// let listing = format_available_commands("!", &[Command::Rules, Command::Shopping]);
/// assert_eq!(listing, "Available commands: !rules, !shopping");
/// ```
pub fn format_available_commands(prefix: &str, commands: &[Command]) -> String {
    let triggers = commands
        .iter()
        .map(|command| format!("{}{}", prefix, command.trigger()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Available commands: {}", triggers)
}

/// Joins the non-blank lines of `text` with ` | `.
///
/// A chat message ends at the first CR or LF on the wire, so no reply may
/// contain one.
///
/// # Examples
///
/// ```
/// use tarkov_bot::commands::format_chat_line;
///
/// assert_eq!(format_chat_line("1. Be nice\r\n\n2. Have fun"), "1. Be nice | 2. Have fun");
/// ```
pub fn format_chat_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Formats the reply sent when a response file does not exist.
pub fn format_file_not_found(name: &str) -> String {
    format!("Error: {} not found.", name)
}

/// Formats the reply sent when a response file holds only whitespace.
pub fn format_file_empty(name: &str) -> String {
    format!("Error: {} is empty.", name)
}

/// Formats the reply sent when a response file cannot be read.
pub fn format_read_error() -> String {
    "Error reading command file.".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_available_commands() {
        assert_eq!(
            format_available_commands("!", &[Command::Rules, Command::Shopping, Command::TarkovPve]),
            "Available commands: !rules, !shopping, !tarkov_pve"
        );
    }

    #[test]
    fn test_format_available_commands_empty() {
        assert_eq!(format_available_commands("!", &[]), "Available commands: ");
    }

    #[test]
    fn test_format_chat_line() {
        assert_eq!(format_chat_line("PVE info here"), "PVE info here");
        assert_eq!(
            format_chat_line("Shopping List:\n- Item 1\r\n- Item 2"),
            "Shopping List: | - Item 1 | - Item 2"
        );
        assert_eq!(format_chat_line("a\rPRIVMSG #other :b"), "a | PRIVMSG #other :b");
    }

    #[test]
    fn test_format_file_not_found() {
        assert_eq!(format_file_not_found("rules.txt"), "Error: rules.txt not found.");
    }

    #[test]
    fn test_format_file_empty() {
        assert_eq!(format_file_empty("rules.txt"), "Error: rules.txt is empty.");
    }

    #[test]
    fn test_format_read_error() {
        assert_eq!(format_read_error(), "Error reading command file.");
    }
}
