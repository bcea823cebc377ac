//! Typed request payloads.
//!
//! Field names follow the JSON bodies the route handlers already receive, so a
//! handler can deserialize straight into these and call `validate`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::DoodleDbError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern compiles")
});

/// Parse a numeric id taken from a URL path segment.
///
/// Only positive decimal integers are ids; surrounding whitespace is ignored.
///
/// # Errors
/// Returns `DoodleDbError::Validation` for anything else.
pub fn parse_id(field: &str, raw: &str) -> Result<i64, DoodleDbError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DoodleDbError::Validation(format!(
            "{field} must be a positive integer, got {raw:?}"
        )));
    }
    let id: i64 = trimmed.parse().map_err(|_| {
        DoodleDbError::Validation(format!("{field} is out of range: {raw:?}"))
    })?;
    check_id(field, id)
}

/// # Errors
/// Returns `DoodleDbError::Validation` unless `id` is positive.
pub fn check_id(field: &str, id: i64) -> Result<i64, DoodleDbError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(DoodleDbError::Validation(format!(
            "{field} must be a positive integer, got {id}"
        )))
    }
}

fn check_text(field: &str, value: &str) -> Result<(), DoodleDbError> {
    if value.trim().is_empty() {
        Err(DoodleDbError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Body of a first login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    #[serde(rename = "googleId")]
    pub google_id: String,
    pub email: String,
    pub name: String,
    /// Avatar; users may sign up without one.
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl NewUser {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for a blank identity or name, or a malformed email.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_text("googleId", &self.google_id)?;
        check_text("name", &self.name)?;
        if !EMAIL_RE.is_match(&self.email) {
            return Err(DoodleDbError::Validation(format!(
                "email is not an address: {:?}",
                self.email
            )));
        }
        Ok(())
    }
}

/// A directed friend edge, `user_id` → `friend_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FriendEdge {
    pub user_id: i64,
    pub friend_id: i64,
}

impl FriendEdge {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for non-positive ids or a self edge.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_id("user_id", self.user_id)?;
        check_id("friend_id", self.friend_id)?;
        if self.user_id == self.friend_id {
            return Err(DoodleDbError::Validation(
                "a user cannot befriend themselves".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewImage {
    pub url: String,
    pub uploader_id: i64,
}

impl NewImage {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for a blank url or bad uploader id.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_text("url", &self.url)?;
        check_id("uploader_id", self.uploader_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDoodle {
    pub url: String,
    /// Captions are optional in the app.
    #[serde(default)]
    pub caption: Option<String>,
    /// Image the doodle was traced from.
    pub original_id: i64,
    pub doodler_id: i64,
}

impl NewDoodle {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for a blank url or bad ids.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_text("url", &self.url)?;
        check_id("original_id", self.original_id)?;
        check_id("doodler_id", self.doodler_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub comment: String,
    pub doodle_id: i64,
    pub user_id: i64,
}

impl NewComment {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for an empty comment or bad ids.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_text("comment", &self.comment)?;
        check_id("doodle_id", self.doodle_id)?;
        check_id("user_id", self.user_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BioUpdate {
    pub user_id: i64,
    /// May be empty: clearing a bio is allowed.
    pub bio: String,
}

impl BioUpdate {
    /// # Errors
    /// Returns `DoodleDbError::Validation` for a bad user id.
    pub fn validate(&self) -> Result<(), DoodleDbError> {
        check_id("user_id", self.user_id)?;
        Ok(())
    }
}
