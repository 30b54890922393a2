pub mod cache;
pub mod cli;
pub mod command;
pub mod convert;
pub mod core;
pub mod dispatcher;
pub mod providers;
pub mod store;
pub mod telegram;

#[cfg(test)]
mod test_support;

use crate::cache::{RateCacheManager, SnapshotCache};
use crate::core::clock::LocalClock;
use crate::core::config::AppConfig;
use crate::dispatcher::CommandDispatcher;
use crate::providers::fixer::FixerProvider;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Run,
    Convert {
        from: String,
        to: String,
        amount: String,
    },
    Rates {
        codes: Vec<String>,
    },
}

/// Wires the fixer provider, the configured store and the local clock together.
pub fn build_manager(config: &AppConfig) -> Result<RateCacheManager> {
    let provider = FixerProvider::new(&config.fixer.base_url, config.fixer_access_key()?)
        .context("Failed to create fixer client")?;
    let store = store::open_store(config)?;
    Ok(RateCacheManager::new(
        Arc::new(provider),
        store,
        Arc::new(LocalClock),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = AppConfig::resolve(config_path)?;
    debug!(
        store = ?config.store,
        fixer = %config.fixer.base_url,
        bot = %config.telegram.bot_username,
        "Loaded config"
    );

    match command {
        AppCommand::Run => {
            info!("cnvtbot starting...");
            let token = config.telegram_token()?.to_string();
            let manager = build_manager(&config)?;
            let cache = SnapshotCache::init(manager)
                .await
                .context("Failed to load today's exchange rates")?;
            let dispatcher = Arc::new(CommandDispatcher::new(
                Arc::new(cache),
                &config.telegram.bot_username,
            ));
            telegram::run_bot(&token, dispatcher).await;
            Ok(())
        }
        AppCommand::Convert { from, to, amount } => {
            let manager = build_manager(&config)?;
            cli::convert::run(&manager, &from, &to, &amount).await
        }
        AppCommand::Rates { codes } => {
            let manager = build_manager(&config)?;
            cli::rates::run(&manager, &codes).await
        }
    }
}
