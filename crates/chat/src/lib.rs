//! Chat gateways that feed lines into the command processor.
//!
//! This crate provides:
//! - `Gateway` trait for pluggable chat transports
//! - Allow-list access policy deciding who is a privileged sender
//! - `MessageHandler` tying access policy and command processor together
//! - Twitch IRC and console (debug) gateway implementations

pub mod access;
pub mod console;
pub mod handler;
pub mod traits;
pub mod twitch;

pub use access::AccessPolicy;
pub use console::ConsoleGateway;
pub use handler::MessageHandler;
pub use traits::{ChatError, ChatMessage, Gateway};
pub use twitch::{TwitchConfig, TwitchGateway};
