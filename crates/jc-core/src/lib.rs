//! jc-core: Core abstractions and configuration for jcli-admin
//!
//! This crate provides the domain types, error taxonomy, configuration
//! structures and console traits shared by the session layer and the CLI,
//! plus the parsers that turn jCli listings into those types.

pub mod config;
pub mod credentials;
pub mod error;
pub mod parse;
pub mod traits;
pub mod types;

pub use error::JcError;
pub use types::{Group, GroupId, User, UserId, UserStatus};
