//! Bot command parsing, rate limiting and dispatch.
//!
//! This module provides the complete command processing pipeline for the bot.
//!
//! # Overview
//!
//! The commands module handles the entire lifecycle of a chat command:
//! 1. **Parsing** - Matching the message text against the registry ([`Command`])
//! 2. **Rate limiting** - Checking the command's cooldown bucket ([`CooldownTracker`])
//! 3. **Execution** - Computing the reply in an action handler
//! 4. **Reply** - Flattening the reply to one line ([`format_chat_line`]) and
//!    sending it through a [`ChatGateway`](crate::twitch::ChatGateway)
//!
//! # Architecture
//!
//! ```text
//! Chat Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← Entry point: dispatch()
//! └─────────────┘
//!      │
//!      ├── Command::parse() ──── not a command / unknown → ignored
//!      │
//!      ├── CooldownTracker ───── refused → dropped silently
//!      │
//!      ├── Action Handlers
//!      │    - handle_response_file   (rules, shopping, tarkov_pve)
//!      │    - handle_commands        (commands)
//!      │
//!      └── ChatGateway::reply()
//! ```
//!
//! # Available Commands
//!
//! | Command | Reply |
//! |---------|-------|
//! | `!rules` | Content of `rules.txt` |
//! | `!shopping` | Content of `shopping.txt` |
//! | `!tarkov_pve` | Content of `tarkov_pve.txt` |
//! | `!commands` | List of the commands above |
//!
//! Arguments after the trigger are ignored.
//!
//! # Module Organization
//!
//! - [`commander`] - Dispatch of chat messages to handlers
//! - [`command`] - Command registry and parsing
//! - [`cooldown`] - Per-command rate limiting
//! - [`actions`] - Individual command handlers
//! - [`chat_response`] - Reply text formatting

mod actions;
mod chat_response;
mod command;
mod commander;
mod cooldown;

pub use crate::commands::chat_response::{
    format_available_commands, format_chat_line, format_file_empty, format_file_not_found,
    format_read_error,
};
pub use crate::commands::command::{Command, CommandParsingError};
pub use crate::commands::commander::Commander;
pub use crate::commands::cooldown::{CooldownPolicy, CooldownScope, CooldownTracker};

use crate::twitch::InboundMessage;

/// Who invoked a command, and where.
///
/// Built from the inbound message for each dispatch; used to select the
/// cooldown bucket and for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Login of the channel the command was sent in
    pub channel_login: String,
    /// Numeric id of the chatter
    pub sender_id: String,
    /// Login of the chatter
    pub sender_login: String,
}

impl From<&InboundMessage> for CommandContext {
    fn from(message: &InboundMessage) -> Self {
        CommandContext {
            channel_login: message.channel_login.clone(),
            sender_id: message.sender_id.clone(),
            sender_login: message.sender_login.clone(),
        }
    }
}

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command, or an unknown trigger: nothing was sent
    Ignored,
    /// The command is cooling down for this scope: nothing was sent
    CoolingDown(Command),
    /// The reply was sent
    Replied(Command),
    /// The handler or the send failed: the error was logged
    Failed(Command),
}
