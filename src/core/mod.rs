//! Core business logic module
//!
//! This module contains the classification and review components:
//! - `defaults` - durable vendor-to-account learned mapping
//! - `classifier` - partitions a batch into auto and manual transactions
//! - `session` - crash-tolerant review decision log
//! - `engine` - pipeline orchestration, review loop included

pub mod classifier;
pub mod defaults;
pub mod engine;
pub mod session;

pub use classifier::{classify, Classification, VendorQueue};
pub use defaults::DefaultsStore;
pub use engine::{EngineConfig, ImportEngine};
pub use session::{ReviewSession, SessionEntry};
