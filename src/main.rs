//! Entry point of the Twitch bot.
//!
//! # Configuration
//!
//! Settings come from the environment, optionally completed by a YAML file.
//! A `.env` file in the working directory is loaded first:
//!
//! ```bash
//! TWITCH_TOKEN=oauth:abcdef123456
//! TWITCH_CHANNEL=streamer_name
//! TWITCH_BOT_ID=123456789
//! TWITCH_BOT_USERNAME=TarkovBot
//! ```
//!
//! Run `get-bot-id` to find the values of `TWITCH_BOT_ID` and
//! `TWITCH_BOT_USERNAME`. See the [`config`](tarkov_bot::config) module for
//! every setting.
//!
//! # Usage
//!
//! ```bash
//! tarkov-bot
//! tarkov-bot --config config.yaml --responses ./responses
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//!   - Set to `debug` for verbose output
//!   - Set to `warn` or `error` for minimal logging
//!
//! # Exit Status
//!
//! The process exits with a non-zero status when the configuration is invalid
//! or the session cannot be set up. Ctrl-C stops the bot with status 0.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tarkov_bot::{bot::Bot, config::BotConfig};

/// Command-line arguments for the bot.
///
/// Both are optional: the environment alone is a complete configuration.
///
/// # Examples
///
/// ```bash
/// tarkov-bot --config config.yaml --responses ./responses
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file.
    ///
    /// Environment variables prefixed with `TWITCH_` override its values.
    #[arg(short, long)]
    config: Option<String>,

    /// Directory of the response files.
    ///
    /// Defaults to the directory of the executable.
    #[arg(short, long)]
    responses: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting tarkov-bot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    if dotenv::dotenv().is_ok() {
        info!("loaded .env file");
    }

    let mut config = match BotConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(responses) = args.responses {
        config.responses_dir = Some(responses.into());
    }

    let bot = match Bot::new(config).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize bot: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = bot.start() => match result {
            Ok(()) => {
                info!("chat connection closed");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Bot stopped: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            ExitCode::SUCCESS
        }
    }
}
