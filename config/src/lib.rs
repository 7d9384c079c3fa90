//! Configuration for labelgraph.
//!
//! Two layers:
//!
//! * [`load_and_apply`] fills the process environment from the project `.env` and the XDG
//!   `config.toml` `[env]` table, with priority **existing env > .env > XDG**.
//! * [`Settings::from_env`] reads the typed settings (model names, API keys, step budget,
//!   prompt directory) back out of the environment.
//!
//! With the `tracing-init` feature, [`logging::init`] installs the shared subscriber used by
//! the CLI.

mod dotenv;
#[cfg(feature = "tracing-init")]
pub mod logging;
mod settings;
mod xdg_toml;

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

pub use settings::{Settings, SettingsError, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Sets environment variables from `.env` and `$XDG_CONFIG_HOME/<app_name>/config.toml`,
/// only for keys that are **not** already set.
///
/// * `app_name`: `"labelgraph"` for the CLI; selects `~/.config/<app_name>/config.toml`.
/// * `override_dir`: look for `.env` here instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: HashSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, v);
        }
    }

    Ok(())
}

/// Serializes tests that touch `XDG_CONFIG_HOME` or shared env keys.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
