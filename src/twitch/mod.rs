//! Twitch integration for the bot.
//!
//! This module wraps the two ways the bot talks to Twitch:
//! - the chat connection (`twitch-irc`), used to receive chat messages and
//!   send replies, behind the [`ChatGateway`] trait
//! - the Helix REST API (`reqwest`), used to look up the bot account and the
//!   target channel
//!
//! # Modules
//!
//! - `client` - Chat connection and inbound message loop
//! - `gateway` - Outbound operations trait, mocked in tests
//! - `helix` - HTTP client for Helix user lookups
//! - `response_structs` - Data structures for Helix responses

mod client;
mod gateway;
mod helix;
mod response_structs;

pub use crate::twitch::client::{ChatIdentity, TwitchChat};
#[cfg(test)]
pub use crate::twitch::gateway::MockChatGateway;
pub use crate::twitch::gateway::ChatGateway;
#[cfg(test)]
pub use crate::twitch::helix::MockHelix;
pub use crate::twitch::helix::{HELIX_URL, Helix, HelixError, HelixRequester};
pub use crate::twitch::response_structs::HelixUser;

/// Credentials used to log into chat.
#[derive(Debug, Clone)]
pub struct ChatCredentials {
    /// Lowercase login of the bot account
    pub login: String,
    /// OAuth access token, without the `oauth:` prefix
    pub token: String,
}

/// A chat message received from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Login of the channel the message was sent in
    pub channel_login: String,
    /// Numeric id of the channel
    pub channel_id: String,
    /// Numeric id of the author
    pub sender_id: String,
    /// Login of the author
    pub sender_login: String,
    /// Unique id of the message, used to reply in thread
    pub message_id: String,
    /// Message text
    pub text: String,
}

impl From<twitch_irc::message::PrivmsgMessage> for InboundMessage {
    fn from(message: twitch_irc::message::PrivmsgMessage) -> Self {
        InboundMessage {
            channel_login: message.channel_login,
            channel_id: message.channel_id,
            sender_id: message.sender.id,
            sender_login: message.sender.login,
            message_id: message.message_id,
            text: message.message_text,
        }
    }
}

/// Where a reply goes: a channel and, optionally, the message being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Login of the channel to send to
    pub channel_login: String,
    /// Id of the message to reply to
    pub message_id: Option<String>,
}

impl From<&InboundMessage> for ReplyTarget {
    fn from(message: &InboundMessage) -> Self {
        ReplyTarget {
            channel_login: message.channel_login.clone(),
            message_id: Some(message.message_id.clone()),
        }
    }
}
