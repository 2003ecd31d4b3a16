//! Response structures for Twitch Helix API endpoints.
//!
//! This module contains structures for deserializing JSON responses from
//! the Helix REST API. Only the fields the bot reads are declared; everything
//! else in the payloads is ignored by serde.

use serde::Deserialize;
use std::fmt;

/// Envelope of every Helix collection response.
///
/// ```text
/// { "data": [ ... ] }
/// ```
#[derive(Deserialize, Debug)]
pub struct HelixResponse<T> {
    /// Returned items, possibly empty.
    pub data: Vec<T>,
}

/// Representation of a user from `/helix/users`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HelixUser {
    /// Numeric account identifier, sent as a string by Twitch.
    pub id: String,
    /// Lowercase login name.
    pub login: String,
    /// Display name with the user's capitalisation.
    pub display_name: String,
}

impl fmt::Display for HelixUser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, login={}, display_name={}",
            self.id, self.login, self.display_name
        )
    }
}
