//! Interactive console for tablegate.
//!
//! This crate provides:
//! - A login flow against any [`Authenticator`](tablegate_core::Authenticator)
//! - A REPL that authorizes every command before it reaches the store
//! - Slash commands for inspecting the session

mod error;
pub mod repl;

pub use error::CliError;
pub use repl::{login, read_input, read_password, run_console, Console, Step};
