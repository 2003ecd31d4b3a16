//! Outbound side of the chat connection.
//!
//! The [`ChatGateway`] trait is the seam between command handling and the
//! Twitch client library: commands only ever subscribe to a channel and reply
//! to a message, so that is all the trait exposes.

use async_trait::async_trait;
use mockall::automock;

use crate::twitch::ReplyTarget;

/// Operations the bot performs on the chat connection.
///
/// Implemented by [`TwitchChat`](crate::twitch::TwitchChat) for the real
/// connection and mocked in tests. `async_trait` keeps the returned futures
/// `Send` so calls can be made from spawned tasks with a generic gateway.
#[automock]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Starts receiving the chat messages of a channel.
    async fn subscribe(&self, channel_login: &str) -> Result<(), anyhow::Error>;

    /// Sends `text` to the channel of `target`.
    async fn reply(&self, target: &ReplyTarget, text: &str) -> Result<(), anyhow::Error>;
}
