//! Foundation types for evplan.
//!
//! Every record kept by the attendee/user registry is a [`Record`]: a unique
//! string key plus an opaque [`Payload`]. The registry never interprets the
//! payload; callers pick their own encoding (the JSON helpers on [`Payload`]
//! cover the common case of structured user or event data).
//!
//! # Key Types
//!
//! - [`Record`] — A keyed registry entry
//! - [`Payload`] — Opaque record contents
//! - [`validate_key`] — Record key validation rules

pub mod error;
pub mod key;
pub mod record;

pub use error::{TypesError, TypesResult};
pub use key::{validate_key, MAX_KEY_LEN};
pub use record::{Payload, Record};
