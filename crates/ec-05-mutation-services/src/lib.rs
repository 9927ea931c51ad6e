//! # EC-05 Mutation Services
//!
//! User-facing economy operations built on the transition engine, the
//! audit ledger and the rollback coordinator.
//!
//! **Subsystem ID:** 5
//!
//! ## Operation Pipeline
//!
//! ```text
//! ┌───────────┐    ┌──────────────┐    ┌────────────────┐    ┌─────────┐
//! │ rate gate │───→│ engine       │───→│ ledger entries │───→│ Receipt │
//! │           │    │ attempt(CAS) │    │ (correlation)  │    │         │
//! └───────────┘    └──────────────┘    └────────────────┘    └─────────┘
//! ```
//!
//! ## Operations
//!
//! | Service | Entries |
//! |---------|---------|
//! | `CurrencyService::adjust` | `grant` |
//! | `TransferService::transfer` | two `transfer`, shared `transferId` |
//! | `ItemService::grant` / `remove` | `grant` |
//! | `CraftingService::craft` | one `craft` per changed key |
//! | `StoreService::buy` / `sell` | `store_buy` / `store_sell` |
//! | `ClaimService::claim` | `daily_claim` / `work_claim` |
//! | `PerkService::purchase` | `perk_purchase` |
//! | `StatusService::set_status` | `status_update` |
//! | `RollbackService::rollback` | one `rollback` |
//!
//! A ledger failure after a commit does not undo the commit. It is logged
//! at `error` and surfaces as `ServiceError::AuditWriteFailed`.

#![warn(clippy::all)]

pub mod context;
pub mod domain;
pub mod services;

pub use context::{EntryTemplate, ServiceContext};
pub use domain::*;
pub use services::{
    ClaimService, CraftingService, CurrencyService, ItemService, PerkService, RollbackService,
    StatusService, StoreService, TransferService,
};
