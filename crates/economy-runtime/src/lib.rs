//! # Economy Runtime Library
//!
//! Exposes the container and configuration for the binary and for tests.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`economy-telemetry`)
//! 2. Load `EconomyConfig` from the environment and validate it
//! 3. Load content packs (directory or built-in)
//! 4. Wire the container (adapters, ledger, engine, services)

pub mod container;
pub mod content;

pub use container::{ConfigError, EconomyConfig, EconomyContainer};
pub use content::ContentPacks;

/// Load configuration and content, then wire the container.
pub fn bootstrap() -> Result<EconomyContainer, ConfigError> {
    let config = EconomyConfig::from_env()?;
    config.validate()?;
    let content = match &config.content_dir {
        Some(dir) => ContentPacks::load_dir(dir)?,
        None => ContentPacks::builtin().map_err(|e| ConfigError::Content {
            file: "<builtin>".into(),
            reason: e.to_string(),
        })?,
    };
    Ok(EconomyContainer::new(config, content))
}
