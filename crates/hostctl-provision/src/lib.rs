//! Provisioning workflows for the hostctl control panel.
//!
//! Each workflow composes the three core pieces: it brackets itself with an
//! audit operation, opens a saga on the engine, performs forward steps
//! through the command gateway, and registers an idempotent-safe rollback
//! after each step that mutated host state. A failure anywhere rolls the
//! host back to where the workflow started, best effort, and the audit
//! trail records the final outcome either way.

mod context;
mod error;
pub mod mocks;
pub mod operations;
mod types;

pub use context::ProvisionContext;
pub use error::{ProvisionError, Result};
pub use types::*;
