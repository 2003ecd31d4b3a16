//! Command action handlers.
//!
//! Individual handler functions for each kind of command. Handlers only
//! compute the reply text; sending it and rate limiting are done by the
//! [`Commander`](crate::commands::Commander).
//!
//! # Available Handlers
//!
//! - [`handle_commands`] - List the registered commands
//! - [`handle_response_file`] - Reply with the content of a response file

mod help;
mod response_file;

pub use crate::commands::actions::{help::handle_commands, response_file::handle_response_file};
