use std::path::PathBuf;

use clap::Parser;

/// Chat-driven INI configuration bot.
///
/// Watches a chat channel for configuration commands and applies them to an
/// INI file, reloading its own settings whenever the settings file changes.
#[derive(Parser, Debug)]
#[command(name = "chatcfg", about = "Chat-driven INI configuration bot")]
pub struct CliArgs {
    /// Path to the YAML settings file
    #[arg(long, env = "CHATCFG_CONFIG", default_value = "config/settings.yml")]
    pub config: PathBuf,

    /// Read commands from the console instead of connecting to chat
    #[arg(long)]
    pub debug: bool,

    /// Log at debug level (ignored when RUST_LOG is set)
    #[arg(long)]
    pub verbose: bool,
}
