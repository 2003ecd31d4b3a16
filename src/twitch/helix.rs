//! HTTP client for the Twitch Helix API.
//!
//! This module provides the [`HelixRequester`] struct used to look up user
//! accounts: the account owning the OAuth token (the bot itself) and the
//! account behind a channel login.

use std::{fmt, time::Duration};

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, StatusCode};

use crate::twitch::response_structs::{HelixResponse, HelixUser};

/// Base URL of the production Helix API.
pub const HELIX_URL: &str = "https://api.twitch.tv/helix";

/// Time allowed for one Helix request, connection included.
pub const HELIX_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned by Helix requests.
#[derive(Debug)]
pub enum HelixError {
    /// The token was rejected (HTTP 401).
    Unauthorized,
    /// Any other non-success status, with the response body.
    Status(u16, String),
    /// The token owner lookup returned no user.
    NoUser,
    /// Transport or decoding failure.
    Request(reqwest::Error),
}

impl HelixError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            HelixError::Request(_) => true,
            HelixError::Status(status, _) => *status >= 500 || *status == 429,
            HelixError::Unauthorized | HelixError::NoUser => false,
        }
    }
}

impl fmt::Display for HelixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HelixError::Unauthorized => write!(f, "invalid or expired OAuth token"),
            HelixError::Status(status, body) => {
                write!(f, "Twitch API returned status {status}: {body}")
            }
            HelixError::NoUser => write!(f, "no user data returned from Twitch API"),
            HelixError::Request(e) => write!(f, "error making API request: {e}"),
        }
    }
}

impl std::error::Error for HelixError {}

impl From<reqwest::Error> for HelixError {
    fn from(error: reqwest::Error) -> Self {
        HelixError::Request(error)
    }
}

/// HTTP client for requesting user data from Helix.
///
/// Every request carries the bot token as a bearer token and the application
/// client id in the `Client-Id` header.
pub struct HelixRequester {
    /// Helix base url, without trailing slash
    url: String,
    /// OAuth access token, without the `oauth:` prefix
    token: String,
    /// Application client id
    client_id: String,
    /// HTTP client
    client: Client,
}

/// Trait for the Helix lookups the bot needs.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Helix {
    /// Fetches the account owning the access token.
    async fn get_current_user(&self) -> Result<HelixUser, HelixError>;
    /// Fetches an account by login, `None` when no such account exists.
    async fn get_user_by_login(&self, login: &str) -> Result<Option<HelixUser>, HelixError>;
}

impl HelixRequester {
    /// Create a new [HelixRequester] with the default [`HELIX_TIMEOUT`].
    ///
    /// # Arguments
    ///
    /// * `url` - The Helix base URL, [`HELIX_URL`] outside of tests.
    /// * `token` - The OAuth access token.
    /// * `client_id` - The application client id registered with Twitch.
    pub fn new(url: &str, token: &str, client_id: &str) -> Result<Self, HelixError> {
        Self::with_timeout(url, token, client_id, HELIX_TIMEOUT)
    }

    /// Create a new [HelixRequester] whose requests fail after `timeout`.
    ///
    /// A timed out request is a [`HelixError::Request`], so it is retried
    /// like any transport failure.
    pub fn with_timeout(
        url: &str,
        token: &str,
        client_id: &str,
        timeout: Duration,
    ) -> Result<Self, HelixError> {
        Ok(HelixRequester {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client_id: client_id.to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Request `/users`, optionally filtered by login.
    ///
    /// Without a login, Helix answers with the account owning the token.
    async fn get_users(&self, login: Option<&str>) -> Result<Vec<HelixUser>, HelixError> {
        let url = format!("{}/users", &self.url);
        debug!("request {} login={:?}", &url, login);

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Client-Id", &self.client_id);
        if let Some(login) = login {
            request = request.query(&[("login", login)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(HelixError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HelixError::Status(status.as_u16(), body));
        }

        let users: HelixResponse<HelixUser> = response.json().await?;
        debug!("response from {} -> {:?}", &url, &users);

        Ok(users.data)
    }
}

impl Helix for HelixRequester {
    async fn get_current_user(&self) -> Result<HelixUser, HelixError> {
        info!("request token owner");
        self.get_users(None)
            .await?
            .into_iter()
            .next()
            .ok_or(HelixError::NoUser)
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<HelixUser>, HelixError> {
        info!("request user {}", login);
        Ok(self.get_users(Some(login)).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_BODY: &str =
        r#"{"data": [{"id": "123456789", "login": "tarkovbot", "display_name": "TarkovBot"}]}"#;

    #[tokio::test]
    async fn test_get_current_user() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .match_header("authorization", "Bearer token123")
            .match_header("client-id", "client123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_BODY)
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "token123", "client123").unwrap();
        let user = helix.get_current_user().await.unwrap();
        assert_eq!(user.id, "123456789");
        assert_eq!(user.login, "tarkovbot");
        assert_eq!(user.display_name, "TarkovBot");
    }

    #[tokio::test]
    async fn test_get_current_user_unauthorized() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .with_status(401)
            .with_body(r#"{"error":"Unauthorized","status":401,"message":"Invalid OAuth token"}"#)
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "expired", "client123").unwrap();
        let result = helix.get_current_user().await;
        assert!(matches!(result, Err(HelixError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_get_current_user_empty_data() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "token123", "client123").unwrap();
        let result = helix.get_current_user().await;
        assert!(matches!(result, Err(HelixError::NoUser)));
    }

    #[tokio::test]
    async fn test_get_current_user_server_error() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "token123", "client123").unwrap();
        match helix.get_current_user().await {
            Err(error @ HelixError::Status(503, _)) => {
                assert!(error.is_transient());
                assert!(error.to_string().contains("unavailable"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_user_by_login() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .match_query(mockito::Matcher::UrlEncoded(
                "login".to_owned(),
                "tarkovbot".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_BODY)
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "token123", "client123").unwrap();
        let user = helix.get_user_by_login("tarkovbot").await.unwrap();
        assert_eq!(user.unwrap().id, "123456789");
    }

    #[tokio::test]
    async fn test_get_user_by_login_unknown_channel() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/users")
            .match_query(mockito::Matcher::UrlEncoded(
                "login".to_owned(),
                "nobody".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let helix = HelixRequester::new(&server.url(), "token123", "client123").unwrap();
        let user = helix.get_user_by_login("nobody").await.unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_error_transience() {
        assert!(!HelixError::Unauthorized.is_transient());
        assert!(!HelixError::NoUser.is_transient());
        assert!(!HelixError::Status(404, String::new()).is_transient());
        assert!(HelixError::Status(429, String::new()).is_transient());
        assert!(HelixError::Status(500, String::new()).is_transient());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let helix = HelixRequester::new("http://localhost/helix/", "t", "c").unwrap();
        assert_eq!(helix.url, "http://localhost/helix");
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // Accepts connections through the backlog but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let helix =
            HelixRequester::with_timeout(&url, "token123", "client123", Duration::from_millis(200))
                .unwrap();
        let result = helix.get_current_user().await;

        match result {
            Err(e @ HelixError::Request(_)) => assert!(e.is_transient()),
            other => panic!("expected a request error, got {:?}", other),
        }
    }
}
