//! # Economy Container
//!
//! Configuration plus the wired services.

pub mod config;
pub mod services;

pub use config::{ConfigError, EconomyConfig};
pub use services::EconomyContainer;
