//! High-level SDK for evplan.
//!
//! [`Planner`] is the state object a front end (menu, CLI, service) creates
//! at startup and passes around: it owns the attendee/user [`Registry`] and a
//! compact index of recently registered keys, loads persisted state on open,
//! and writes it back on close.

pub mod config;
pub mod error;
pub mod planner;

pub use config::{PlannerConfig, MAX_RECENT_LIMIT};
pub use error::{SdkError, SdkResult};
pub use planner::Planner;

// Re-export key types
pub use evplan_registry::{Registry, RegistryConfig, RegistryStats};
pub use evplan_types::{Payload, Record};
pub use evplan_xorlist::XorList;
