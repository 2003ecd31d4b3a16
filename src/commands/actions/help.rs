//! Commands listing handler.
//!
//! The listing is built from [`Command::ALL`] so it always matches the
//! registry. The listing command itself is left out.

use log::debug;

use crate::commands::{chat_response::format_available_commands, command::Command};

/// Returns the list of commands a chatter can use.
pub fn handle_commands(prefix: &str) -> String {
    debug!("handling commands command");

    let listed = Command::ALL
        .into_iter()
        .filter(|command| *command != Command::Commands)
        .collect::<Vec<_>>();

    format_available_commands(prefix, &listed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_commands() {
        assert_eq!(
            handle_commands("!"),
            "Available commands: !rules, !shopping, !tarkov_pve"
        );
    }

    #[test]
    fn test_handle_commands_uses_prefix() {
        assert_eq!(
            handle_commands("?"),
            "Available commands: ?rules, ?shopping, ?tarkov_pve"
        );
    }

    #[test]
    fn test_handle_commands_lists_every_file_command() {
        let listing = handle_commands("!");
        for command in Command::ALL {
            let listed = listing.contains(&format!("!{}", command.trigger()));
            assert_eq!(listed, command.response_file().is_some());
        }
    }
}
