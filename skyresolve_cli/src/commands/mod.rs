pub mod cone;
pub mod config;
pub mod patterns;
pub mod resolve;
pub mod search;
pub mod status;

use crate::cli::{Cli, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use skyresolve_core::config::ConfigStoreError;
use skyresolve_core::{
    CancellationToken, ConfigStore, ObjectResolver, ResolveError, ResolverConfig,
};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Core(#[from] ResolveError),

    #[error("Config file error: {0}")]
    ConfigStore(#[from] ConfigStoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CommandError {
    /// 130 for an interrupted search, 2 for bad input, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Core(ResolveError::Cancelled) => 130,
            CommandError::InvalidInput(_) | CommandError::Core(ResolveError::InvalidInput(_)) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

pub fn load_config() -> ResolverConfig {
    ConfigStore::new_default().load()
}

pub fn create_resolver() -> Result<ObjectResolver> {
    let config = load_config();
    config
        .validate()
        .map_err(|e| CommandError::InvalidConfig(e.to_string()))?;
    Ok(ObjectResolver::new(config)?)
}

/// Cancel `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted; cancelling search");
            token.cancel();
        }
    });
}

/// Spinner for pretty output; hidden for machine-readable formats.
pub fn spinner(cli: &Cli, message: impl Into<String>) -> ProgressBar {
    if cli.output != OutputFormat::Pretty {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
