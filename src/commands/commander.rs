//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, which serves as the main entry point
//! for processing chat messages. It parses them, applies the cooldown gate, routes
//! commands to their handlers and sends the reply.
//!
//! # Flow
//!
//! ```text
//! Chat Message → parse() → Command → cooldown → execute() → reply
//! ```

use std::sync::Arc;

use anyhow::anyhow;
use log::{debug, error, info};

use crate::{
    commands::{
        CommandContext, DispatchOutcome,
        actions::{handle_commands, handle_response_file},
        chat_response::format_chat_line,
        command::{Command, CommandParsingError},
        cooldown::CooldownTracker,
    },
    responses::ResponseReader,
    twitch::{ChatGateway, InboundMessage, ReplyTarget},
};

/// Command orchestrator for parsing and executing bot commands.
///
/// The Commander is responsible for:
/// - Recognising commands in chat messages
/// - Enforcing the per-command cooldown
/// - Routing commands to the appropriate handlers
/// - Replying through the chat gateway
///
/// No error escapes [`Commander::dispatch`]: failures are logged and the
/// message is left unanswered.
pub struct Commander {
    /// Prefix every command starts with
    prefix: String,
    /// Reader for the response files
    reader: ResponseReader,
    /// Cooldown buckets, shared with the sweep task
    cooldowns: Arc<CooldownTracker>,
}

impl Commander {
    /// Creates a new Commander.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The command prefix, `!` by default
    /// * `reader` - Reader for the response files
    /// * `cooldowns` - Rate limiter applied before every handler
    pub fn new(prefix: &str, reader: ResponseReader, cooldowns: CooldownTracker) -> Self {
        Commander {
            prefix: prefix.to_owned(),
            reader,
            cooldowns: Arc::new(cooldowns),
        }
    }

    /// Parses a chat message into a command.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - The message invokes a registered command
    /// * `Err(CommandParsingError)` - Regular chat or an unknown trigger
    pub fn parse(&self, body: &str) -> Result<Command, CommandParsingError> {
        Command::parse(&self.prefix, body)
    }

    /// Computes the reply of a command.
    ///
    /// # Errors
    ///
    /// Returns an error if a text command has no response file. Missing or
    /// unreadable files are not errors: they produce an error text.
    pub async fn execute(&self, command: Command) -> Result<String, anyhow::Error> {
        match command {
            Command::Commands => Ok(handle_commands(&self.prefix)),
            Command::Rules | Command::Shopping | Command::TarkovPve => {
                let file_name = command
                    .response_file()
                    .ok_or_else(|| anyhow!("no response file for !{}", command.trigger()))?;
                Ok(handle_response_file(&self.reader, &file_name).await)
            }
        }
    }

    /// Handles one chat message end to end.
    ///
    /// Non-commands and unknown triggers are ignored. A command refused by the
    /// cooldown is dropped without reply. The reply is sent as a single line.
    /// Handler and send errors are logged.
    pub async fn dispatch<G>(&self, message: &InboundMessage, gateway: &G) -> DispatchOutcome
    where
        G: ChatGateway + ?Sized,
    {
        let command = match self.parse(&message.text) {
            Ok(command) => command,
            Err(CommandParsingError::NotACommand) => return DispatchOutcome::Ignored,
            Err(CommandParsingError::Unknown(trigger)) => {
                debug!("ignoring unknown command {:?}", trigger);
                return DispatchOutcome::Ignored;
            }
        };

        let context = CommandContext::from(message);

        if !self.cooldowns.try_acquire(command, &context).await {
            debug!(
                "!{} from {} is cooling down",
                command.trigger(),
                context.sender_login
            );
            return DispatchOutcome::CoolingDown(command);
        }

        let response = match self.execute(command).await {
            Ok(response) => format_chat_line(&response),
            Err(e) => {
                error!("command !{} failed: {:?}", command.trigger(), e);
                return DispatchOutcome::Failed(command);
            }
        };

        if let Err(e) = gateway.reply(&ReplyTarget::from(message), &response).await {
            error!("failed to reply to !{}: {:?}", command.trigger(), e);
            return DispatchOutcome::Failed(command);
        }

        info!(
            "answered !{} from {} in #{}",
            command.trigger(),
            context.sender_login,
            context.channel_login
        );
        DispatchOutcome::Replied(command)
    }

    /// Starts the background removal of idle cooldown buckets.
    pub fn start_cooldown_sweep(&self) {
        self.cooldowns.start_sweep_task();
    }
}
