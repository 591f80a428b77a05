//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CustomerConfig;
use crate::credentials::MessagingCredentials;

/// Identifier of a group on the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    /// Create a new group ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a user on the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A group as listed by the console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    pub id: GroupId,
}

impl Group {
    /// Create a group entry
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(id),
        }
    }
}

/// Account status shown as a prefix in user listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Row prefixed with `#`
    Enabled,
    /// Row prefixed with `#!`
    Disabled,
    /// Row without a recognized prefix
    Unknown,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Enabled => write!(f, "enabled"),
            UserStatus::Disabled => write!(f, "disabled"),
            UserStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A user as listed by the console.
///
/// The password is write-only on the console and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub gid: GroupId,
    pub username: String,
    pub status: UserStatus,
    pub mt_messaging_cred: MessagingCredentials,
}

/// Group and user identifiers derived from a customer's username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIds {
    pub group_id: GroupId,
    pub user_id: UserId,
}

impl CustomerIds {
    /// Derive the identifiers using the configured suffixes
    pub fn derive(username: &str, config: &CustomerConfig) -> Self {
        Self {
            group_id: GroupId(format!("{}{}", username, config.group_suffix)),
            user_id: UserId(format!("{}{}", username, config.user_suffix)),
        }
    }
}
