use evplan_registry::{Registry, RegistryError, RegistryStats};
use evplan_types::Payload;
use evplan_xorlist::XorList;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::{SdkError, SdkResult};

/// Application state for an evplan front end.
///
/// Owns the attendee/user registry and an index of recently registered keys
/// (oldest first). Access is single-threaded; callers wanting to share a
/// planner must serialize access themselves.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    registry: Registry,
    recent: XorList<String>,
}

impl Planner {
    /// Open a planner, loading the registry file if it exists.
    ///
    /// A missing file starts an empty registry. A malformed file is an
    /// error; see [`Planner::open_or_reset`] to start empty instead.
    pub fn open(config: PlannerConfig) -> SdkResult<Self> {
        config.validate()?;

        let registry = if config.data_path.exists() {
            Registry::open(&config.data_path, config.registry.clone())?
        } else {
            debug!(path = %config.data_path.display(), "no registry file, starting empty");
            Registry::with_config(config.registry.clone())?
        };

        info!(
            path = %config.data_path.display(),
            records = registry.len(),
            capacity = registry.capacity(),
            "planner opened"
        );
        Ok(Self {
            config,
            registry,
            recent: XorList::new(),
        })
    }

    /// Like [`Planner::open`], but a malformed registry file is logged and
    /// replaced by an empty registry (on the next save).
    pub fn open_or_reset(config: PlannerConfig) -> SdkResult<Self> {
        match Self::open(config.clone()) {
            Err(SdkError::Registry(RegistryError::Format { path, reason })) => {
                warn!(path = %path.display(), %reason, "malformed registry file, starting empty");
                Ok(Self {
                    registry: Registry::with_config(config.registry.clone())?,
                    config,
                    recent: XorList::new(),
                })
            }
            other => other,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry occupancy.
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    // ---- Records ----

    /// Register (or update) a record and mark its key as most recent.
    ///
    /// Returns the previous payload when the key was already registered.
    /// Once the registry accepts the record the call succeeds; a failure to
    /// update the recent index is logged and leaves that key out of it.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> SdkResult<Option<Payload>> {
        let key = key.into();
        let previous = self.registry.insert(key.clone(), payload)?;
        if let Err(e) = self.touch_recent(&key) {
            warn!(%key, error = %e, "recent index not updated");
        }
        Ok(previous)
    }

    /// Fetch the payload registered under `key`.
    pub fn find(&self, key: &str) -> SdkResult<&Payload> {
        Ok(self.registry.lookup(key)?)
    }

    /// Remove a registered record, also dropping it from the recent index.
    pub fn unregister(&mut self, key: &str) -> SdkResult<Payload> {
        let payload = self.registry.remove(key)?;
        if self.recent.contains(key) {
            self.recent.remove(key)?;
        }
        Ok(payload)
    }

    /// Recently registered keys, oldest first. Use `.rev()` for newest first.
    pub fn recent(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.recent.iter().map(String::as_str)
    }

    fn touch_recent(&mut self, key: &str) -> SdkResult<()> {
        if self.recent.contains(key) {
            self.recent.remove(key)?;
        }
        self.recent.push_back(key.to_string())?;
        while self.recent.len() > self.config.recent_limit {
            self.recent.pop_front();
        }
        Ok(())
    }

    // ---- Persistence ----

    /// Write the registry to the configured data file.
    pub fn save(&self) -> SdkResult<usize> {
        Ok(self.registry.save(&self.config.data_path)?)
    }

    /// Save and shut down.
    pub fn close(self) -> SdkResult<usize> {
        let written = self.save()?;
        info!(
            path = %self.config.data_path.display(),
            records = written,
            "planner closed"
        );
        Ok(written)
    }
}
