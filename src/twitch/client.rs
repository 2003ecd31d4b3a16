//! Twitch chat client wrapper for bot messaging.
//!
//! This module provides a high-level [`TwitchChat`] interface that wraps the
//! `twitch-irc` client: it owns the connection, consumes the stream of server
//! messages and sends replies.

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::{
    sync::{Mutex, mpsc::UnboundedReceiver},
    time,
};
use twitch_irc::{
    ClientConfig, SecureTCPTransport, TwitchIRCClient, login::StaticLoginCredentials,
    message::ServerMessage,
};

use crate::twitch::{ChatCredentials, ChatGateway, InboundMessage, ReplyTarget};

type IrcClient = TwitchIRCClient<SecureTCPTransport, StaticLoginCredentials>;

/// Account Twitch logged the connection in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatIdentity {
    /// Numeric id of the account
    pub user_id: String,
    /// Display name of the account
    pub user_name: String,
}

/// High-level Twitch chat client.
///
/// Holds the library client used for sending and the receiving half of its
/// message stream until [`TwitchChat::sync`] takes it over.
pub struct TwitchChat {
    /// Underlying chat client, cheap to clone and safe to share
    client: IrcClient,
    /// Server messages, consumed once by the sync loop
    incoming: Mutex<Option<UnboundedReceiver<ServerMessage>>>,
    /// Login of the bot account
    login: String,
    /// Reply in thread to the triggering message instead of a plain message
    threaded_replies: bool,
}

impl TwitchChat {
    /// Creates the chat client and opens the connection.
    ///
    /// The connection is authenticated with the bot login and token. Twitch
    /// reports authentication failures as notices on the message stream:
    /// call [`TwitchChat::wait_for_login`] to know the outcome.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Login and OAuth token of the bot account
    /// * `threaded_replies` - Whether replies quote the triggering message
    pub async fn connect(credentials: &ChatCredentials, threaded_replies: bool) -> Self {
        let config = ClientConfig::new_simple(StaticLoginCredentials::new(
            credentials.login.clone(),
            Some(credentials.token.clone()),
        ));
        let (incoming, client) = IrcClient::new(config);

        info!("connecting to twitch chat as {}", credentials.login);
        client.connect().await;

        TwitchChat {
            client,
            incoming: Mutex::new(Some(incoming)),
            login: credentials.login.clone(),
            threaded_replies,
        }
    }

    /// Login of the connected bot account.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Waits until Twitch confirms the login.
    ///
    /// Messages received before the confirmation are consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if Twitch refuses the credentials, if the stream
    /// closes, if nothing is confirmed within `timeout`, or if the message
    /// loop already started.
    pub async fn wait_for_login(&self, timeout: Duration) -> Result<ChatIdentity, anyhow::Error> {
        let mut incoming = self.incoming.lock().await;
        let Some(incoming) = incoming.as_mut() else {
            return Err(anyhow!("chat sync already started"));
        };

        time::timeout(timeout, await_login(incoming))
            .await
            .map_err(|_| {
                anyhow!(
                    "twitch chat did not confirm the login within {}s",
                    timeout.as_secs()
                )
            })?
    }

    /// Runs the inbound message loop.
    ///
    /// Invokes `on_message` for each chat message of the subscribed channels.
    /// Connection-level messages (identity confirmation, joins, notices) are
    /// only logged. Returns when the library closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop was already started.
    pub async fn sync<F>(&self, on_message: F) -> Result<(), anyhow::Error>
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        let Some(mut incoming) = self.incoming.lock().await.take() else {
            return Err(anyhow!("chat sync already started"));
        };

        info!("start receiving chat messages");

        while let Some(message) = incoming.recv().await {
            match message {
                ServerMessage::Privmsg(privmsg) => on_message(InboundMessage::from(privmsg)),
                ServerMessage::GlobalUserState(state) => {
                    info!("logged in as {} (id {})", state.user_name, state.user_id)
                }
                ServerMessage::Join(join) if join.user_login == self.login => {
                    info!("joined channel #{}", join.channel_login)
                }
                ServerMessage::Notice(notice) => {
                    warn!("notice from twitch: {}", notice.message_text)
                }
                ServerMessage::Reconnect(_) => info!("twitch requested a reconnect"),
                other => debug!("ignored server message {:?}", other),
            }
        }

        info!("chat message stream ended");
        Ok(())
    }
}

/// Reads server messages until the login is confirmed or refused.
///
/// Before the login succeeds, the only notices Twitch sends are
/// authentication failures.
async fn await_login(
    incoming: &mut UnboundedReceiver<ServerMessage>,
) -> Result<ChatIdentity, anyhow::Error> {
    while let Some(message) = incoming.recv().await {
        match message {
            ServerMessage::GlobalUserState(state) => {
                info!("logged in as {} (id {})", state.user_name, state.user_id);
                return Ok(ChatIdentity {
                    user_id: state.user_id,
                    user_name: state.user_name,
                });
            }
            ServerMessage::Notice(notice) => {
                return Err(anyhow!(
                    "twitch chat refused the login: {}",
                    notice.message_text
                ));
            }
            other => debug!("ignored server message during login {:?}", other),
        }
    }

    Err(anyhow!("chat connection closed before the login was confirmed"))
}

#[async_trait]
impl ChatGateway for TwitchChat {
    async fn subscribe(&self, channel_login: &str) -> Result<(), anyhow::Error> {
        info!("joining channel #{}", channel_login);
        self.client
            .join(channel_login.to_owned())
            .map_err(|e| anyhow!("invalid channel login {}: {}", channel_login, e))
    }

    async fn reply(&self, target: &ReplyTarget, text: &str) -> Result<(), anyhow::Error> {
        let result = match (&target.message_id, self.threaded_replies) {
            (Some(message_id), true) => {
                self.client
                    .say_in_reply_to(
                        &(target.channel_login.as_str(), message_id.as_str()),
                        text.to_owned(),
                    )
                    .await
            }
            _ => {
                self.client
                    .say(target.channel_login.clone(), text.to_owned())
                    .await
            }
        };

        result.map_err(|e| anyhow!("failed to send message to #{}: {}", target.channel_login, e))
    }
}
