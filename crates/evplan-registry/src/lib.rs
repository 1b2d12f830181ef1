//! Persistent attendee/user registry for evplan.
//!
//! The registry is an open-addressing hash table keyed by record key. Slots
//! are `Empty`, `Occupied` or `Tombstone`; deleted records leave a tombstone
//! behind so that probe sequences of other keys sharing the same home index
//! keep working.
//!
//! # Probing
//!
//! Capacities are always primes congruent to 3 mod 4. Probe `j` of a key
//! visits `home`, `home + 1`, `home - 1`, `home + 4`, `home - 4`, ... and for
//! such primes the first `capacity` probes touch every slot exactly once, so
//! an insert only fails when the table is genuinely full.
//!
//! # Modules
//!
//! - [`error`] — Error types for registry operations
//! - [`config`] — [`RegistryConfig`] tuning knobs
//! - [`hasher`] — The [`KeyHasher`] trait and the default BLAKE3 hasher
//! - [`probe`] — Capacity selection and the probe sequence
//! - [`registry`] — The [`Registry`] hash table itself
//! - [`persist`] — Save/load in the length-prefixed, CRC-checked file format

pub mod config;
pub mod error;
pub mod hasher;
pub mod persist;
pub mod probe;
pub mod registry;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use hasher::{Blake3KeyHasher, KeyHasher};
pub use probe::{probe_capacity, ProbeSequence, MAX_CAPACITY, MIN_CAPACITY};
pub use registry::{Registry, RegistryStats, SlotState};

pub use evplan_types::{Payload, Record};
