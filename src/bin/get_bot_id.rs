//! Prints the id and login of the account owning `TWITCH_TOKEN`.
//!
//! The bot needs its numeric account id in `TWITCH_BOT_ID`. This tool asks
//! Helix who owns the token and prints the lines to add to `.env`.
//!
//! # Usage
//!
//! ```bash
//! TWITCH_TOKEN=oauth:abcdef TWITCH_CLIENT_ID=client get-bot-id
//! ```
//!
//! Exits with status 1 if the credentials are missing or the lookup fails.

use std::process::ExitCode;

use env_logger::Env;
use tarkov_bot::{
    config::LookupCredentials,
    twitch::{HELIX_URL, Helix, HelixError, HelixRequester, HelixUser},
};

const RULE: &str = "==================================================";

/// Lines printed once the account is found.
fn success_report(user: &HelixUser) -> Vec<String> {
    vec![
        "Success!".to_string(),
        format!("Bot Username: {}", user.login),
        format!("Display Name: {}", user.display_name),
        format!("Bot ID: {}", user.id),
        String::new(),
        RULE.to_string(),
        "Add these lines to your .env file:".to_string(),
        format!("TWITCH_BOT_ID={}", user.id),
        format!("TWITCH_BOT_USERNAME={}", user.login),
        RULE.to_string(),
    ]
}

/// Lines printed when the lookup fails.
fn failure_report(error: &HelixError) -> Vec<String> {
    match error {
        HelixError::Unauthorized => vec![
            "Error: Invalid or expired OAuth token".to_string(),
            "Please generate a new token and update .env".to_string(),
        ],
        HelixError::Status(status, body) => vec![
            format!("Error: Twitch API returned status {}", status),
            format!("Response: {}", body),
        ],
        HelixError::NoUser => vec!["Error: No user data returned from Twitch API".to_string()],
        HelixError::Request(e) => vec![format!("Error making API request: {}", e)],
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = Env::default().filter_or("RUST_LOG", "warn");
    env_logger::init_from_env(env);

    dotenv::dotenv().ok();

    println!("Twitch Bot ID Fetcher");
    println!("{}", RULE);

    let credentials = match LookupCredentials::load() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Set TWITCH_TOKEN and TWITCH_CLIENT_ID in .env first.");
            return ExitCode::FAILURE;
        }
    };

    println!("Fetching bot information from Twitch API...");

    let result = match HelixRequester::new(HELIX_URL, &credentials.token, &credentials.client_id) {
        Ok(helix) => helix.get_current_user().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(user) => {
            for line in success_report(&user) {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            for line in failure_report(&e) {
                eprintln!("{}", line);
            }
            eprintln!("Failed to fetch bot ID");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_report_env_lines() {
        let user = HelixUser {
            id: "123456789".to_string(),
            login: "tarkovbot".to_string(),
            display_name: "TarkovBot".to_string(),
        };
        let report = success_report(&user);

        assert!(report.contains(&"TWITCH_BOT_ID=123456789".to_string()));
        assert!(report.contains(&"TWITCH_BOT_USERNAME=tarkovbot".to_string()));
        assert!(report.contains(&"Display Name: TarkovBot".to_string()));
    }

    #[test]
    fn test_failure_report() {
        assert_eq!(
            failure_report(&HelixError::Unauthorized)[0],
            "Error: Invalid or expired OAuth token"
        );
        assert_eq!(
            failure_report(&HelixError::Status(500, "oops".to_string())),
            vec![
                "Error: Twitch API returned status 500".to_string(),
                "Response: oops".to_string()
            ]
        );
        assert_eq!(
            failure_report(&HelixError::NoUser),
            vec!["Error: No user data returned from Twitch API".to_string()]
        );
    }
}
