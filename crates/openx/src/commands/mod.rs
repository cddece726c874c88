//! CLI command handlers.

pub mod accounts;
pub mod get;
pub mod login;
pub mod report;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use openx_oauth::OpenXClient;

use crate::config::OpenXConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Path of the TOML config file.
    pub config_path: PathBuf,
    /// Output as JSON for scripting.
    pub json_output: bool,
}

impl Context {
    pub fn load_config(&self) -> Result<OpenXConfig> {
        OpenXConfig::load(&self.config_path)
            .with_context(|| format!("could not load {}", self.config_path.display()))
    }

    /// Build a client from the config and run the SSO login.
    pub fn connect(&self) -> Result<OpenXClient> {
        let config = self.load_config()?;
        let mut client = config
            .client_builder()?
            .build()
            .context("invalid client configuration")?;
        client.authenticate().context("OpenX login failed")?;
        Ok(client)
    }
}
