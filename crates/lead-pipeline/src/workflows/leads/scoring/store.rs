use super::config::{Ruleset, RulesError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

/// Holds the active [`Ruleset`] as an immutable snapshot.
///
/// Readers clone the `Arc` and never observe a half-applied update. Writers
/// validate outside any lock, then take the writer mutex to assign the next
/// version and swap the snapshot.
#[derive(Debug)]
pub struct RulesStore {
    active: RwLock<Arc<Ruleset>>,
    writer: Mutex<()>,
}

impl RulesStore {
    pub fn new(initial: Ruleset) -> Result<Self, RulesError> {
        initial.validate()?;
        let mut initial = initial;
        initial.version = initial.version.max(1);
        Ok(Self::from_valid(initial))
    }

    fn from_valid(ruleset: Ruleset) -> Self {
        Self {
            active: RwLock::new(Arc::new(ruleset)),
            writer: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Arc<Ruleset> {
        let guard = self.active.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn version(&self) -> u64 {
        self.get().version
    }

    pub fn replace(&self, candidate: Ruleset) -> Result<Arc<Ruleset>, RulesError> {
        self.replace_with(candidate, |_| Ok(()))
    }

    pub fn replace_json(&self, value: serde_json::Value) -> Result<Arc<Ruleset>, RulesError> {
        let candidate: Ruleset = serde_json::from_value(value)?;
        self.replace(candidate)
    }

    /// Like [`Self::replace`], running `persist` on the versioned candidate
    /// before it is published. A failed persist leaves the store untouched.
    pub fn replace_with<F>(&self, candidate: Ruleset, persist: F) -> Result<Arc<Ruleset>, RulesError>
    where
        F: FnOnce(&Ruleset) -> Result<(), RulesError>,
    {
        candidate.validate()?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = candidate;
        candidate.version = self.version() + 1;
        persist(&candidate)?;

        let published = Arc::new(candidate);
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&published);
        info!(version = published.version, "installed scoring ruleset");

        Ok(published)
    }
}

impl Default for RulesStore {
    fn default() -> Self {
        Self::from_valid(Ruleset::default())
    }
}
