//! Bot module for managing the Twitch chat session.
//!
//! This module provides the main [`Bot`] implementation that connects to Twitch
//! chat, joins the configured channel and answers commands. It orchestrates the
//! session lifecycle from the validated configuration to the message loop.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected → Connecting → SubscribingEvents → Ready → (Dispatching) → Ready
//! ```
//!
//! - **Connecting**: the bot login is resolved (through Helix when a client id
//!   is configured), the chat connection is opened and Twitch confirms the login
//! - **SubscribingEvents**: the channel is looked up through Helix, then joined
//! - **Ready**: every chat message is handed to the [`Commander`] in its own task
//!
//! Any failure before **Ready** is returned to the caller. Once in chat,
//! command failures are logged and never stop the session.
//!
//! # Example
//!
//! ```no_run
//! # use tarkov_bot::bot::Bot;
//! # use tarkov_bot::config::BotConfig;
//! # async fn run() -> Result<(), anyhow::Error> {
//! let config = BotConfig::load(Some("config.yaml"))?;
//!
//! let bot = Bot::new(config).await?;
//! bot.start().await?; // Runs until the chat connection closes
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use log::{debug, info, warn};

use crate::{
    commands::{Commander, CooldownTracker},
    config::BotConfig,
    responses::ResponseReader,
    twitch::{
        ChatCredentials, ChatGateway, HELIX_URL, Helix, HelixError, HelixRequester, HelixUser,
        InboundMessage, TwitchChat,
    },
    utils::retry,
};

/// Attempts made for each Helix lookup during setup.
const SETUP_ATTEMPTS: u32 = 3;

/// Delay before the first retry of a Helix lookup, doubled afterwards.
const SETUP_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Time allowed for Twitch chat to accept the credentials.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Recognises messages sent by the bot account.
///
/// Ids always match. A login only matches when Helix confirmed it: the
/// configured bot name may be the login of a viewer.
#[derive(Debug, Clone, Default)]
struct SelfFilter {
    ids: Vec<String>,
    login: Option<String>,
}

impl SelfFilter {
    fn matches(&self, message: &InboundMessage) -> bool {
        self.ids.iter().any(|id| *id == message.sender_id)
            || self
                .login
                .as_deref()
                .is_some_and(|login| message.sender_login.eq_ignore_ascii_case(login))
    }
}

/// Main bot structure tying the chat connection to the command handling.
///
/// # Thread Safety
///
/// The chat client and the commander are wrapped in `Arc` so every message
/// task holds its own reference. The only mutable state, the cooldown
/// buckets, lives behind a mutex inside the commander.
pub struct Bot {
    /// Chat connection, receives messages and sends replies
    chat: Arc<TwitchChat>,

    /// Command parser and executor, shared with the message tasks
    commander: Arc<Commander>,

    /// Helix client, only when a client id is configured
    helix: Option<HelixRequester>,

    /// Login of the channel to join
    channel: String,

    /// Numeric id of the bot account
    bot_id: String,

    /// Skips messages sent by the bot account, `None` to answer them
    self_filter: Option<SelfFilter>,
}

impl Bot {
    /// Creates the bot and opens the chat connection.
    ///
    /// When a client id is configured, the login used for chat is the one of
    /// the account owning the token, looked up through Helix. Otherwise the
    /// configured bot name is used, lowercased.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The token is rejected by Helix or by Twitch chat
    /// - Helix stays unreachable after the retries
    /// - Twitch chat does not confirm the login in time
    /// - No response directory is configured and the executable location is
    ///   unknown
    pub async fn new(config: BotConfig) -> Result<Self, anyhow::Error> {
        info!("connecting...");

        let helix = config
            .client_id
            .as_deref()
            .map(|client_id| HelixRequester::new(HELIX_URL, &config.access_token, client_id))
            .transpose()?;

        let confirmed_login = match &helix {
            Some(helix) => Some(
                resolve_bot_login(helix, &config.bot_id, SETUP_RETRY_DELAY)
                    .await?
                    .login,
            ),
            None => None,
        };

        let chat = Arc::new(
            TwitchChat::connect(
                &ChatCredentials {
                    login: confirmed_login
                        .clone()
                        .unwrap_or_else(|| config.bot_display_name.to_lowercase()),
                    token: config.access_token.clone(),
                },
                config.threaded_replies,
            )
            .await,
        );

        let identity = chat.wait_for_login(LOGIN_TIMEOUT).await?;
        let mut self_ids = vec![config.bot_id.clone()];
        if identity.user_id != config.bot_id {
            warn!(
                "chat logged in as {} (id {}) but TWITCH_BOT_ID is {}",
                identity.user_name, identity.user_id, config.bot_id
            );
            self_ids.push(identity.user_id);
        }
        let self_filter = config.ignore_self.then(|| SelfFilter {
            ids: self_ids,
            login: confirmed_login,
        });

        let reader = match config.responses_dir {
            Some(dir) => ResponseReader::new(dir),
            None => ResponseReader::beside_executable()?,
        };
        info!("reading responses from {}", reader.dir().display());

        let commander = Arc::new(Commander::new(
            &config.prefix,
            reader,
            CooldownTracker::new(config.cooldown, config.cooldown_scope),
        ));

        Ok(Bot {
            chat,
            commander,
            helix,
            channel: config.channel,
            bot_id: config.bot_id,
            self_filter,
        })
    }

    /// Joins the channel and processes chat messages.
    ///
    /// This method consumes `self` and runs until the chat connection closes.
    /// Each message is dispatched in its own task so a slow file read never
    /// delays the next message.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel does not exist, if Helix stays
    /// unreachable, or if the channel cannot be joined.
    pub async fn start(self) -> Result<(), anyhow::Error> {
        info!("subscribing to #{}...", self.channel);

        match &self.helix {
            Some(helix) => {
                let channel = resolve_channel(helix, &self.channel, SETUP_RETRY_DELAY).await?;
                info!("found channel {}", channel);
            }
            None => info!("no client id configured, joining #{} by name", self.channel),
        }

        self.chat.subscribe(&self.channel).await?;
        self.commander.start_cooldown_sweep();

        info!(
            "ready as {} (id {}) in #{}",
            self.chat.login(),
            self.bot_id,
            self.channel
        );

        let chat = Arc::clone(&self.chat);
        let commander = Arc::clone(&self.commander);
        let self_filter = self.self_filter.clone();

        let on_message = move |message: InboundMessage| {
            if self_filter
                .as_ref()
                .is_some_and(|filter| filter.matches(&message))
            {
                debug!("skipping own message {}", message.message_id);
                return;
            }

            let chat = Arc::clone(&chat);
            let commander = Arc::clone(&commander);
            tokio::spawn(async move {
                commander.dispatch(&message, chat.as_ref()).await;
            });
        };

        self.chat.sync(on_message).await
    }
}

/// Looks up the account owning the token.
///
/// A different id than the configured one is only reported: chat keeps
/// working with the token owner.
async fn resolve_bot_login<H: Helix>(
    helix: &H,
    bot_id: &str,
    retry_delay: Duration,
) -> Result<HelixUser, anyhow::Error> {
    let user = retry(
        SETUP_ATTEMPTS,
        retry_delay,
        HelixError::is_transient,
        || helix.get_current_user(),
    )
    .await
    .map_err(|e| anyhow!("cannot look up the bot account: {}", e))?;

    if user.id != bot_id {
        warn!(
            "the token belongs to {} but TWITCH_BOT_ID is {}",
            user, bot_id
        );
    }

    Ok(user)
}

/// Looks up the channel to join.
///
/// A channel that does not exist is an error: there is nothing to join.
async fn resolve_channel<H: Helix>(
    helix: &H,
    channel: &str,
    retry_delay: Duration,
) -> Result<HelixUser, anyhow::Error> {
    retry(
        SETUP_ATTEMPTS,
        retry_delay,
        HelixError::is_transient,
        || helix.get_user_by_login(channel),
    )
    .await
    .map_err(|e| anyhow!("cannot look up channel #{}: {}", channel, e))?
    .ok_or_else(|| anyhow!("channel #{} not found", channel))
}
