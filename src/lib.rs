//! Tarkov bot - A Twitch chat bot answering `!commands` with text files.
//!
//! The bot joins one Twitch channel and answers a fixed set of commands. Text
//! commands reply with the content of a file read on every invocation, so the
//! replies can be edited while the bot runs.
//!
//! # Commands
//!
//! - `!rules` - Content of `rules.txt`
//! - `!shopping` - Content of `shopping.txt`
//! - `!tarkov_pve` - Content of `tarkov_pve.txt`
//! - `!commands` - List of the commands above
//!
//! Each command can be used once every 30 seconds by each chatter by default.
//!
//! # Architecture
//!
//! - [`bot`] - Session lifecycle, from configuration to the message loop
//! - [`commands`] - Command parsing, cooldowns and handlers
//! - [`config`] - YAML and environment configuration with validation
//! - [`responses`] - Response file reading
//! - [`twitch`] - Chat connection and Helix API client
//! - [`utils`] - Path and retry helpers

pub mod bot;
pub mod commands;
pub mod config;
pub mod responses;
pub mod twitch;
pub mod utils;
