//! Core trait definitions

mod console;

pub use console::{ConsoleConnector, TextConsole};
