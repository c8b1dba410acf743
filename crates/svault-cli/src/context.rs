use anyhow::{Context as _, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;

use svault_config::{JsonPreferences, default_config_path, load_or_default};
use svault_constants::PREFERENCES_FILE_NAME;
use svault_core::{SaverError, StatusVault};

/// What every handler needs: the vault and a runtime to drive it.
pub struct Context {
    runtime: Runtime,
    vault: StatusVault,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path: PathBuf =
            config_path.map_or_else(default_config_path, Path::to_path_buf);
        let config = load_or_default(&config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;

        let preferences_path = config_path.parent().map_or_else(
            || PathBuf::from(PREFERENCES_FILE_NAME),
            |dir| dir.join(PREFERENCES_FILE_NAME),
        );
        let preferences = Arc::new(JsonPreferences::new(preferences_path));

        let runtime = Runtime::new().context("Failed to start the async runtime")?;
        let vault = StatusVault::from_config(config, preferences);
        Ok(Self { runtime, vault })
    }

    #[must_use]
    pub const fn vault(&self) -> &StatusVault {
        &self.vault
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Keeps the reason code visible once the error leaves the library crates.
pub fn report(err: SaverError) -> anyhow::Error {
    let reason = err.reason();
    anyhow::Error::new(err).context(format!("[{reason}]"))
}
