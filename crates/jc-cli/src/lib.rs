//! jcli-admin: command-line client for the jCli console
//!
//! The binary lives in `main.rs`; this library holds the pieces it is
//! assembled from so they can be tested directly.

pub mod commands;
pub mod output;
