//! Configuration for the bot.
//!
//! Settings are read from an optional YAML file merged with environment
//! variables prefixed by `TWITCH_`. Environment variables win over the file.
//! A `.env` file in the working directory is loaded by the binaries before
//! this module reads the environment.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # OAuth access token of the bot account, with or without the `oauth:` prefix
//! token: "oauth:abcdef123456"
//!
//! # Channel to join, `#` and case are normalized
//! channel: "streamer_name"
//!
//! # Numeric id of the bot account, see the `get-bot-id` binary
//! bot_id: "123456789"
//! bot_username: "TarkovBot"
//!
//! # Optional: enables Helix lookups of the bot account and the channel
//! client_id: "abcdef"
//! client_secret: "secret"
//!
//! # Optional command settings
//! prefix: "!"
//! cooldown_seconds: 30
//! cooldown_uses: 1
//! cooldown_scope: "user"
//! ignore_self: true
//! threaded_replies: false
//! responses_dir: "/srv/bot/responses"
//! ```
//!
//! # Environment Variables
//!
//! Every key can be set with the upper-cased key and the `TWITCH_` prefix,
//! e.g. `TWITCH_TOKEN`, `TWITCH_CHANNEL`, `TWITCH_BOT_ID`. The bot account
//! name is read from `TWITCH_BOT_USERNAME`.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer};

use crate::commands::{CooldownPolicy, CooldownScope};

/// Values containing this marker were copied from the sample configuration
/// and never filled in.
pub const PLACEHOLDER_MARKER: &str = "YOUR_";

const DEFAULT_BOT_DISPLAY_NAME: &str = "Bot";
const DEFAULT_PREFIX: &str = "!";
const DEFAULT_COOLDOWN_SECONDS: u64 = 30;
const DEFAULT_COOLDOWN_USES: u32 = 1;
/// Longest accepted cooldown window, one day.
const MAX_COOLDOWN_SECONDS: u64 = 86_400;

/// Raw settings, as found in the file and the environment.
///
/// Nothing is validated here; see [`BotConfig`] for the checked version.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "lossy_string")]
    pub token: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub channel: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub client_id: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub client_secret: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub bot_id: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub bot_username: Option<String>,
    #[serde(deserialize_with = "lossy_string")]
    pub prefix: Option<String>,
    pub cooldown_seconds: Option<u64>,
    pub cooldown_uses: Option<u32>,
    #[serde(deserialize_with = "lossy_string")]
    pub cooldown_scope: Option<String>,
    pub ignore_self: Option<bool>,
    pub threaded_replies: Option<bool>,
    #[serde(deserialize_with = "lossy_string")]
    pub responses_dir: Option<String>,
}

impl Config {
    /// Reads the settings from `path`, if given, and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is given but does not exist, if the file is
    /// not valid YAML, or if a value has the wrong type.
    pub fn load(path: Option<&str>) -> Result<Config, figment::Error> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !Path::new(path).is_file() {
                return Err(figment::Error::from(format!(
                    "config file {} not found",
                    path
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment.merge(Env::prefixed("TWITCH_")).extract()
    }
}

/// Environment values such as ids are parsed as numbers, so string settings
/// accept any scalar and keep its text.
fn lossy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Unsigned(number) => number.to_string(),
        Scalar::Signed(number) => number.to_string(),
        Scalar::Float(number) => number.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

/// Reasons the configuration cannot be used.
///
/// All of them are fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The file or the environment could not be read
    Extract(figment::Error),
    /// A required value is absent or empty
    Missing(&'static str),
    /// A value still holds a sample placeholder
    Placeholder(&'static str),
    /// The bot account id is absent
    MissingBotId,
    /// A value cannot be interpreted
    Invalid { field: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Extract(e) => write!(f, "cannot read configuration: {}", e),
            ConfigError::Missing(field) => write!(f, "{} is not set", field),
            ConfigError::Placeholder(field) => {
                write!(f, "{} still holds a placeholder value", field)
            }
            ConfigError::MissingBotId => write!(
                f,
                "TWITCH_BOT_ID is not set, run get-bot-id to find the id of the bot account"
            ),
            ConfigError::Invalid { field, value } => {
                write!(f, "invalid value {:?} for {}", value, field)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Extract(e) => Some(e),
            _ => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Extract(e)
    }
}

/// Removes the `oauth:` prefix chat clients used to require.
///
/// ```
/// use tarkov_bot::config::normalize_token;
///
/// assert_eq!(normalize_token("oauth:abc"), "abc");
/// assert_eq!(normalize_token("abc"), "abc");
/// ```
pub fn normalize_token(token: &str) -> String {
    let token = token.trim();
    token.strip_prefix("oauth:").unwrap_or(token).to_owned()
}

/// Channel logins are lowercase and written without `#`.
pub fn normalize_channel(channel: &str) -> String {
    let channel = channel.trim();
    channel.strip_prefix('#').unwrap_or(channel).to_lowercase()
}

fn is_placeholder(value: &str) -> bool {
    value.contains(PLACEHOLDER_MARKER)
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ConfigError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ConfigError::Missing(field));
    }
    if is_placeholder(value) {
        return Err(ConfigError::Placeholder(field));
    }
    Ok(value.to_owned())
}

fn optional(value: Option<&str>, field: &'static str) -> Result<Option<String>, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if is_placeholder(value) => Err(ConfigError::Placeholder(field)),
        Some(value) => Ok(Some(value.to_owned())),
    }
}

/// Validated settings of the bot.
///
/// Built once at startup and never modified.
#[derive(Clone)]
pub struct BotConfig {
    /// OAuth token, without the `oauth:` prefix
    pub access_token: String,
    /// Channel login, lowercase, without `#`
    pub channel: String,
    /// Application client id, enables Helix lookups
    pub client_id: Option<String>,
    /// Application client secret, unused by chat
    pub client_secret: Option<String>,
    /// Numeric id of the bot account
    pub bot_id: String,
    /// Name of the bot account
    pub bot_display_name: String,
    /// Prefix of every command
    pub prefix: String,
    /// `None` disables rate limiting
    pub cooldown: Option<CooldownPolicy>,
    pub cooldown_scope: CooldownScope,
    /// Skip messages sent by the bot account
    pub ignore_self: bool,
    /// Reply in thread to the triggering message
    pub threaded_replies: bool,
    /// Directory of the response files, beside the executable when `None`
    pub responses_dir: Option<PathBuf>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("access_token", &"<redacted>")
            .field("channel", &self.channel)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("bot_id", &self.bot_id)
            .field("bot_display_name", &self.bot_display_name)
            .field("prefix", &self.prefix)
            .field("cooldown", &self.cooldown)
            .field("cooldown_scope", &self.cooldown_scope)
            .field("ignore_self", &self.ignore_self)
            .field("threaded_replies", &self.threaded_replies)
            .field("responses_dir", &self.responses_dir)
            .finish()
    }
}

impl BotConfig {
    /// Loads and validates the settings.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional YAML file merged under the environment
    pub fn load(path: Option<&str>) -> Result<BotConfig, ConfigError> {
        BotConfig::from_config(Config::load(path)?)
    }

    /// Validates raw settings and applies defaults.
    ///
    /// # Errors
    ///
    /// Fails on an empty or placeholder token or channel, a missing bot id,
    /// a placeholder in any credential, an empty prefix, zero cooldown uses
    /// or an unknown cooldown scope.
    pub fn from_config(config: Config) -> Result<BotConfig, ConfigError> {
        let access_token = normalize_token(&required(config.token.as_deref(), "TWITCH_TOKEN")?);
        if access_token.is_empty() {
            return Err(ConfigError::Missing("TWITCH_TOKEN"));
        }

        let channel = normalize_channel(&required(config.channel.as_deref(), "TWITCH_CHANNEL")?);
        if channel.is_empty() {
            return Err(ConfigError::Missing("TWITCH_CHANNEL"));
        }

        let bot_id = match required(config.bot_id.as_deref(), "TWITCH_BOT_ID") {
            Err(ConfigError::Missing(_)) => return Err(ConfigError::MissingBotId),
            other => other?,
        };

        let client_id = optional(config.client_id.as_deref(), "TWITCH_CLIENT_ID")?;
        let client_secret = optional(config.client_secret.as_deref(), "TWITCH_CLIENT_SECRET")?;
        let bot_display_name = optional(config.bot_username.as_deref(), "TWITCH_BOT_USERNAME")?
            .unwrap_or_else(|| DEFAULT_BOT_DISPLAY_NAME.to_owned());

        let prefix = match config.prefix {
            None => DEFAULT_PREFIX.to_owned(),
            Some(prefix) if prefix.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    field: "TWITCH_PREFIX",
                    value: prefix,
                });
            }
            Some(prefix) => prefix.trim().to_owned(),
        };

        let cooldown_seconds = config.cooldown_seconds.unwrap_or(DEFAULT_COOLDOWN_SECONDS);
        if cooldown_seconds > MAX_COOLDOWN_SECONDS {
            return Err(ConfigError::Invalid {
                field: "TWITCH_COOLDOWN_SECONDS",
                value: cooldown_seconds.to_string(),
            });
        }
        let cooldown_uses = config.cooldown_uses.unwrap_or(DEFAULT_COOLDOWN_USES);
        if cooldown_uses == 0 {
            return Err(ConfigError::Invalid {
                field: "TWITCH_COOLDOWN_USES",
                value: cooldown_uses.to_string(),
            });
        }
        let cooldown = (cooldown_seconds > 0).then(|| CooldownPolicy {
            uses: cooldown_uses,
            per: Duration::from_secs(cooldown_seconds),
        });

        let cooldown_scope = match config.cooldown_scope.as_deref() {
            None => CooldownScope::default(),
            Some(scope) => scope.parse::<CooldownScope>().map_err(|value| ConfigError::Invalid {
                field: "TWITCH_COOLDOWN_SCOPE",
                value,
            })?,
        };

        Ok(BotConfig {
            access_token,
            channel,
            client_id,
            client_secret,
            bot_id,
            bot_display_name,
            prefix,
            cooldown,
            cooldown_scope,
            ignore_self: config.ignore_self.unwrap_or(true),
            threaded_replies: config.threaded_replies.unwrap_or(false),
            responses_dir: config
                .responses_dir
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// Credentials needed to look the bot account up, used by `get-bot-id`.
#[derive(Clone)]
pub struct LookupCredentials {
    /// OAuth token, without the `oauth:` prefix
    pub token: String,
    pub client_id: String,
}

impl LookupCredentials {
    /// Loads the token and client id from the environment.
    pub fn load() -> Result<LookupCredentials, ConfigError> {
        LookupCredentials::from_config(Config::load(None)?)
    }

    /// Both the token and the client id are required.
    pub fn from_config(config: Config) -> Result<LookupCredentials, ConfigError> {
        let token = normalize_token(&required(config.token.as_deref(), "TWITCH_TOKEN")?);
        if token.is_empty() {
            return Err(ConfigError::Missing("TWITCH_TOKEN"));
        }

        Ok(LookupCredentials {
            token,
            client_id: required(config.client_id.as_deref(), "TWITCH_CLIENT_ID")?,
        })
    }
}
