mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use chatcfg_chat::{ConsoleGateway, Gateway, MessageHandler, TwitchConfig, TwitchGateway};
use chatcfg_rules::{CommandProcessor, SettingsSource};
use chatcfg_storage::IniFileStore;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    chatcfg_core::config::load_dotenv();
    let args = CliArgs::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    info!(path = %args.config.display(), "loading settings");
    let mut source = SettingsSource::load(args.config.clone())
        .with_context(|| format!("failed to load settings from {}", args.config.display()))?;
    let settings = source.current();
    settings.log_summary();
    debug!(settings = %settings.redacted_summary(), "effective settings");

    let store = Arc::new(
        IniFileStore::from_settings(&settings).context("failed to open INI configuration store")?,
    );
    info!(
        original = %store.original_path().display(),
        modified = %store.modified_path().display(),
        "INI store ready"
    );

    let processor = Arc::new(
        CommandProcessor::new(&settings, store).context("invalid command settings")?,
    );
    let handler = Arc::new(MessageHandler::new(Arc::clone(&processor), &settings));

    source.subscribe(processor.reload_listener());
    source.subscribe(handler.reload_listener());
    source.watch().context("failed to watch settings file")?;

    let mut gateway: Box<dyn Gateway> = if args.debug {
        Box::new(ConsoleGateway::stdio())
    } else {
        let config = TwitchConfig::from_settings(&settings).context("invalid chat settings")?;
        Box::new(TwitchGateway::new(config))
    };

    info!(gateway = gateway.name(), "starting gateway");
    let outcome = gateway.run(handler).await;
    if let Err(e) = &outcome {
        error!(gateway = gateway.name(), error = %e, "gateway stopped");
    }
    outcome.with_context(|| format!("{} gateway failed", gateway.name()))?;

    // Keep the watcher alive for the whole session.
    drop(source);
    info!("shutting down");
    Ok(())
}
