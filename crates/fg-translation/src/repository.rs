//! Translation profile storage.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{TranslationError, TranslationResult};
use crate::profile::TranslationProfile;

/// Source of translation profile definitions.
///
/// Used to resolve profiles by name, including profiles referenced by
/// `includeInputProfile`.
pub trait ProfileRepository: Send + Sync {
    /// Lists all profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn list_profiles(&self) -> TranslationResult<Vec<TranslationProfile>>;

    /// Gets a profile by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn get_profile(&self, name: &str) -> TranslationResult<Option<TranslationProfile>>;
}

/// In-memory profile repository, keeping insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<IndexMap<String, TranslationProfile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository from profile definitions.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = TranslationProfile>) -> Self {
        let repo = Self::new();
        for profile in profiles {
            repo.add(profile);
        }
        repo
    }

    /// Loads a repository from a JSON array of profile definitions.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Configuration` if the document is malformed.
    pub fn from_json(json: &str) -> TranslationResult<Self> {
        let profiles: Vec<TranslationProfile> = serde_json::from_str(json)
            .map_err(|e| TranslationError::config(format!("invalid profile list: {e}")))?;
        Ok(Self::with_profiles(profiles))
    }

    /// Adds or replaces a profile.
    pub fn add(&self, profile: TranslationProfile) {
        self.profiles.write().insert(profile.name.clone(), profile);
    }

    /// Removes a profile, returning it if present.
    pub fn remove(&self, name: &str) -> Option<TranslationProfile> {
        self.profiles.write().shift_remove(name)
    }

    /// Wraps the repository for sharing.
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn ProfileRepository> {
        Arc::new(self)
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn list_profiles(&self) -> TranslationResult<Vec<TranslationProfile>> {
        Ok(self.profiles.read().values().cloned().collect())
    }

    fn get_profile(&self, name: &str) -> TranslationResult<Option<TranslationProfile>> {
        Ok(self.profiles.read().get(name).cloned())
    }
}
