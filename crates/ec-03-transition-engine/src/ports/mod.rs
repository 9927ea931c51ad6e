//! # Ports Module
//!
//! - Inbound: `Transition`, the pure state function a caller hands the engine
//! - Outbound: `ec_01_account_store::AccountStore`

pub mod transition;

pub use transition::Transition;
