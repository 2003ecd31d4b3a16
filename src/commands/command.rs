//! Command registry and parsing.
//!
//! This module defines the fixed set of chat commands the bot answers to and
//! converts chat message text into a [`Command`].

use log::debug;

/// A chat command the bot answers to.
///
/// The registry is the list [`Command::ALL`]; its order is the order used in
/// the `commands` listing.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Command {
    /// Replies with `rules.txt`
    Rules,
    /// Replies with `shopping.txt`
    Shopping,
    /// Replies with `tarkov_pve.txt`
    TarkovPve,
    /// Lists the other commands
    Commands,
}

/// Errors that can occur during command parsing.
///
/// Both are answered with silence: regular chat is not a command, and an
/// unknown trigger may belong to another bot in the channel.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message does not start with the command prefix
    NotACommand,
    /// The trigger after the prefix is not registered
    Unknown(String),
}

impl Command {
    /// Every registered command, in listing order.
    pub const ALL: [Command; 4] = [
        Command::Rules,
        Command::Shopping,
        Command::TarkovPve,
        Command::Commands,
    ];

    /// The word typed after the prefix to invoke this command.
    pub fn trigger(&self) -> &'static str {
        match self {
            Command::Rules => "rules",
            Command::Shopping => "shopping",
            Command::TarkovPve => "tarkov_pve",
            Command::Commands => "commands",
        }
    }

    /// Name of the file whose content answers this command, if any.
    pub fn response_file(&self) -> Option<String> {
        match self {
            Command::Commands => None,
            _ => Some(format!("{}.txt", self.trigger())),
        }
    }

    /// Looks a command up by its exact trigger.
    pub fn from_trigger(trigger: &str) -> Option<Command> {
        Self::ALL
            .into_iter()
            .find(|command| command.trigger() == trigger)
    }

    /// Parses a chat message into a Command.
    ///
    /// The message must start with `prefix` immediately followed by a trigger.
    /// The trigger ends at the first whitespace or at the end of the message;
    /// anything after it is ignored. Matching is case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarkov_bot::commands::{Command, CommandParsingError};
    ///
    /// assert_eq!(Command::parse("!", "!rules please"), Ok(Command::Rules));
    /// assert_eq!(Command::parse("!", "rules"), Err(CommandParsingError::NotACommand));
    /// ```
    pub fn parse(prefix: &str, body: &str) -> Result<Self, CommandParsingError> {
        let Some(rest) = body.strip_prefix(prefix) else {
            return Err(CommandParsingError::NotACommand);
        };

        let trigger = rest.split(char::is_whitespace).next().unwrap_or_default();
        debug!("parsing trigger {:?}", trigger);

        Self::from_trigger(trigger).ok_or_else(|| CommandParsingError::Unknown(trigger.to_owned()))
    }
}
