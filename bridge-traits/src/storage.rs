//! Storage bridges: local sample lookup and key-value preferences.

use crate::error::Result;
use std::path::PathBuf;

/// Lookup of locally installed or bundled recitation samples.
///
/// The store answers one question: does a playable local file exist right now
/// for this exact reciter and chapter? Content arrives on disk through the
/// host's bulk download manager or through resident resource packs; this
/// trait only exposes the lookup, never the transfer.
pub trait SampleStore: Send + Sync {
    /// Absolute path of an installed sample for `reciter_id` + `surah_id`,
    /// or `None` when no local file is present.
    fn installed_sample(&self, reciter_id: &str, surah_id: u16) -> Option<PathBuf>;
}

/// Sample store with no local content; every lookup misses.
#[derive(Debug, Clone, Default)]
pub struct EmptySampleStore;

impl SampleStore for EmptySampleStore {
    fn installed_sample(&self, _reciter_id: &str, _surah_id: u16) -> Option<PathBuf> {
        None
    }
}

/// Key-value preferences storage (UserDefaults, SharedPreferences, a config
/// file on desktop).
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store a floating-point value
    async fn set_f64(&self, key: &str, value: f64) -> Result<()>;

    /// Retrieve a floating-point value
    async fn get_f64(&self, key: &str) -> Result<Option<f64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_store_misses() {
        let store = EmptySampleStore;
        assert!(store.installed_sample("saad-al-ghamdi", 1).is_none());
    }
}
