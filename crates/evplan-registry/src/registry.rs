//! The [`Registry`] hash table.
//!
//! Open addressing over a slot array whose length is always a probe
//! capacity (see [`crate::probe`]). Deleting a record leaves a tombstone;
//! tombstones are skipped by lookups, reused by inserts, and dropped whenever
//! the table is rehashed.

use std::fmt;
use std::mem;
use std::sync::Arc;

use evplan_types::{validate_key, Payload, Record};
use tracing::debug;

use crate::config::{RegistryConfig, DEFAULT_INITIAL_CAPACITY};
use crate::error::{RegistryError, Result};
use crate::hasher::{Blake3KeyHasher, KeyHasher};
use crate::persist::check_record_len;
use crate::probe::{probe_capacity, ProbeSequence, MAX_CAPACITY};

#[derive(Clone, Debug)]
pub(crate) enum Slot {
    Empty,
    Occupied(Record),
    Tombstone,
}

/// The observable state of a single slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Occupied,
    Tombstone,
}

/// A point-in-time summary of a registry's occupancy.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryStats {
    /// Total slots.
    pub capacity: usize,
    /// Occupied slots.
    pub len: usize,
    /// Tombstoned slots.
    pub tombstones: usize,
    /// `len / capacity`.
    pub load_factor: f64,
}

enum Placement {
    Inserted,
    Updated(Payload),
}

/// Attendee/user registry: a quadratic-probing hash table of [`Record`]s.
///
/// Inserting an existing key replaces its payload in place and returns the
/// previous one; this is the registry's duplicate-key policy, not an error.
pub struct Registry {
    slots: Vec<Slot>,
    len: usize,
    tombstones: usize,
    config: RegistryConfig,
    hasher: Arc<dyn KeyHasher>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("tombstones", &self.tombstones)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::Empty; DEFAULT_INITIAL_CAPACITY],
            len: 0,
            tombstones: 0,
            config: RegistryConfig::default(),
            hasher: Arc::new(Blake3KeyHasher::REGISTRY),
        }
    }

    /// Create an empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        Self::with_hasher(config, Blake3KeyHasher::REGISTRY)
    }

    /// Create an empty registry with a custom key hasher.
    pub fn with_hasher(config: RegistryConfig, hasher: impl KeyHasher + 'static) -> Result<Self> {
        config.validate()?;
        Self::build(config, Arc::new(hasher), 0)
    }

    fn build(config: RegistryConfig, hasher: Arc<dyn KeyHasher>, expected: usize) -> Result<Self> {
        let initial =
            probe_capacity(config.initial_capacity).ok_or(RegistryError::CapacityTooLarge {
                requested: config.initial_capacity,
                max: MAX_CAPACITY,
            })?;
        let mut registry = Self {
            slots: Vec::new(),
            len: 0,
            tombstones: 0,
            config,
            hasher,
        };
        let capacity = registry.min_capacity_for(expected)?.max(initial);
        registry.slots = empty_slots(capacity)?;
        Ok(registry)
    }

    /// An empty registry sharing this one's configuration and hasher, sized
    /// to hold `expected` records without growing.
    pub(crate) fn fresh_sibling(&self, expected: usize) -> Result<Self> {
        Self::build(self.config.clone(), Arc::clone(&self.hasher), expected)
    }

    // ---------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of tombstoned slots.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Ratio of occupied slots to total capacity.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// The active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Occupancy summary.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            capacity: self.capacity(),
            len: self.len,
            tombstones: self.tombstones,
            load_factor: self.load_factor(),
        }
    }

    /// The state of every slot, by slot index.
    pub fn slot_states(&self) -> Vec<SlotState> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Empty => SlotState::Empty,
                Slot::Occupied(_) => SlotState::Occupied,
                Slot::Tombstone => SlotState::Tombstone,
            })
            .collect()
    }

    /// The slot index `key` hashes to before any probing.
    pub fn home_index(&self, key: &str) -> usize {
        self.home_in(key, self.capacity())
    }

    /// The slots probed for `key`, in probe order.
    pub fn probe_sequence(&self, key: &str) -> ProbeSequence {
        ProbeSequence::new(self.home_index(key), self.capacity())
    }

    /// All records, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            _ => None,
        })
    }

    /// All keys, in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|record| record.key.as_str())
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Fetch the payload stored under `key`.
    pub fn lookup(&self, key: &str) -> Result<&Payload> {
        self.get(key).ok_or_else(|| RegistryError::not_found(key))
    }

    /// Fetch the payload stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match &self.slots[self.find_slot(key)?] {
            Slot::Occupied(record) => Some(&record.payload),
            _ => None,
        }
    }

    /// Returns `true` if a record is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.find_slot(key).is_some()
    }

    /// Index of the occupied slot holding `key`. Stops at the first empty
    /// slot; tombstones are probed through.
    fn find_slot(&self, key: &str) -> Option<usize> {
        for idx in self.probe_sequence(key) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(record) if record.key == key => return Some(idx),
                _ => {}
            }
        }
        None
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Insert a record, or replace the payload of an existing one.
    ///
    /// Returns the previous payload when `key` was already present. Fails
    /// with [`RegistryError::CapacityExceeded`] when no slot is free; with
    /// `auto_resize` enabled the table grows before that can happen. Records
    /// too large for a registry file are rejected with
    /// [`RegistryError::RecordTooLarge`], so every stored record can be saved.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Result<Option<Payload>> {
        let key = key.into();
        validate_key(&key)?;
        let record = Record {
            key,
            payload: payload.into(),
        };
        check_record_len(&record)?;

        match self.place(record)? {
            Placement::Updated(previous) => Ok(Some(previous)),
            Placement::Inserted => {
                if self.config.auto_resize && self.load_factor() > self.config.max_load_factor {
                    self.grow()?;
                }
                Ok(None)
            }
        }
    }

    fn place(&mut self, record: Record) -> Result<Placement> {
        let mut reusable = None;
        let mut empty = None;

        for idx in self.probe_sequence(&record.key) {
            match &mut self.slots[idx] {
                Slot::Occupied(existing) if existing.key == record.key => {
                    let previous = mem::replace(&mut existing.payload, record.payload);
                    return Ok(Placement::Updated(previous));
                }
                Slot::Occupied(_) => {}
                Slot::Tombstone => {
                    reusable.get_or_insert(idx);
                }
                Slot::Empty => {
                    empty = Some(idx);
                    break;
                }
            }
        }

        let idx = reusable.or(empty).ok_or(RegistryError::CapacityExceeded {
            capacity: self.capacity(),
        })?;
        if matches!(self.slots[idx], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[idx] = Slot::Occupied(record);
        self.len += 1;
        Ok(Placement::Inserted)
    }

    /// Remove the record stored under `key`, leaving a tombstone.
    pub fn remove(&mut self, key: &str) -> Result<Payload> {
        let idx = self
            .find_slot(key)
            .ok_or_else(|| RegistryError::not_found(key))?;

        let record = match mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(record) => record,
            other => {
                self.slots[idx] = other;
                return Err(RegistryError::not_found(key));
            }
        };
        self.len -= 1;
        self.tombstones += 1;

        if self.tombstones as f64 > self.config.tombstone_ratio * self.capacity() as f64 {
            self.compact()?;
        }
        Ok(record.payload)
    }

    /// Remove every record, keeping the current capacity.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }

    // ---------------------------------------------------------------
    // Resizing
    // ---------------------------------------------------------------

    /// Rehash into a table of at least `new_capacity` slots.
    ///
    /// The capacity is rounded up to a probe capacity. Tombstones are
    /// dropped. On error the registry is left unchanged.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        let capacity = probe_capacity(new_capacity).ok_or(RegistryError::CapacityTooLarge {
            requested: new_capacity,
            max: MAX_CAPACITY,
        })?;
        let required = self.min_capacity_for(self.len)?;
        if capacity < required {
            return Err(RegistryError::CapacityTooSmall {
                requested: new_capacity,
                required,
            });
        }
        self.rehash(capacity)
    }

    /// Rehash in place at the current capacity, dropping tombstones.
    pub fn compact(&mut self) -> Result<()> {
        debug!(
            capacity = self.capacity(),
            tombstones = self.tombstones,
            "compacting registry"
        );
        self.rehash(self.capacity())
    }

    fn grow(&mut self) -> Result<()> {
        let scaled = self
            .capacity()
            .saturating_mul(self.config.growth_factor)
            .min(MAX_CAPACITY);
        let capacity = self
            .min_capacity_for(self.len)?
            .max(probe_capacity(scaled).unwrap_or(MAX_CAPACITY));
        debug!(
            from = self.capacity(),
            to = capacity,
            len = self.len,
            "growing registry"
        );
        self.rehash(capacity)
    }

    /// Smallest probe capacity keeping `len` records strictly under the
    /// configured load factor.
    fn min_capacity_for(&self, len: usize) -> Result<usize> {
        let bound = (len as f64 / self.config.max_load_factor).floor() as usize;
        probe_capacity(bound.saturating_add(1)).ok_or(RegistryError::CapacityExceeded {
            capacity: MAX_CAPACITY,
        })
    }

    /// Move every record into a fresh slot array of `capacity` slots.
    ///
    /// Destinations are planned before anything moves, so a failure leaves
    /// the current slots untouched.
    fn rehash(&mut self, capacity: usize) -> Result<()> {
        let mut slots = empty_slots(capacity)?;
        let mut taken = vec![false; capacity];
        let mut moves = Vec::with_capacity(self.len);

        for (from, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(record) = slot {
                let home = self.home_in(&record.key, capacity);
                let to = ProbeSequence::new(home, capacity)
                    .find(|&idx| !taken[idx])
                    .ok_or(RegistryError::CapacityExceeded { capacity })?;
                taken[to] = true;
                moves.push((from, to));
            }
        }

        for (from, to) in moves {
            slots[to] = mem::replace(&mut self.slots[from], Slot::Empty);
        }
        self.slots = slots;
        self.tombstones = 0;

        debug!(capacity, len = self.len, "registry rehashed");
        Ok(())
    }

    fn home_in(&self, key: &str, capacity: usize) -> usize {
        (self.hasher.hash_key(key) % capacity as u64) as usize
    }
}

fn empty_slots(capacity: usize) -> Result<Vec<Slot>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| RegistryError::OutOfMemory { capacity })?;
    slots.resize(capacity, Slot::Empty);
    Ok(slots)
}
