//! # Memorizer Error Types
//!
//! Error taxonomy for selection resolution, pack acquisition, and playback.
//! Every failure is caught at the coordinator boundary and translated into
//! the `SampleAvailability` observable; these types never cross into the UI
//! layer as errors.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Outcome of a deferred-download pack acquisition.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The acquisition was superseded by a newer selection. Silently
    /// absorbed, never surfaced to the user.
    #[error("Acquisition cancelled")]
    Cancelled,

    /// The pack could not be fetched (network or storage failure).
    #[error("Resource pack unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while resolving and binding a playback session.
#[derive(Error, Debug)]
pub enum MemorizerError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// No playable source exists for this chapter/reciter combination.
    #[error("No sample available for surah {surah_id} with reciter {reciter_id}")]
    SourceUnavailable { surah_id: u16, reciter_id: String },

    /// A tagged chapter's local sample could not be found after its pack
    /// was acquired.
    #[error("Pack {tag} acquired but no local sample for surah {surah_id}")]
    SampleMissing { tag: String, surah_id: u16 },

    // ========================================================================
    // Acquisition Errors
    // ========================================================================
    /// Pack acquisition failed or was cancelled.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// The media backend could not open or decode the resolved source.
    #[error("Media load failed: {0}")]
    MediaLoad(String),

    /// A bridge capability failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MemorizerError {
    /// Returns `true` if this error is a silent supersession, not a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, MemorizerError::Acquisition(AcquisitionError::Cancelled))
    }

    /// Returns `true` if retrying the same selection could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MemorizerError::Acquisition(AcquisitionError::Unavailable(_)) => true,
            MemorizerError::Bridge(e) => e.is_transient(),
            MemorizerError::MediaLoad(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the failure came from fetching content rather than
    /// decoding it. The UI words its retry affordance off this distinction.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            MemorizerError::Acquisition(AcquisitionError::Unavailable(_))
                | MemorizerError::Bridge(BridgeError::Network(_))
        )
    }
}

/// Result type for memorizer core operations.
pub type Result<T> = std::result::Result<T, MemorizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_not_transient_failure() {
        let err = MemorizerError::from(AcquisitionError::Cancelled);
        assert!(err.is_cancellation());
        assert!(!err.is_network_error());
    }

    #[test]
    fn acquisition_unavailable_is_network_and_transient() {
        let err = MemorizerError::from(AcquisitionError::Unavailable("offline".into()));
        assert!(err.is_network_error());
        assert!(err.is_transient());
        assert!(!err.is_cancellation());
    }

    #[test]
    fn media_load_is_decode_side() {
        let err = MemorizerError::MediaLoad("bad stream".into());
        assert!(!err.is_network_error());
        assert!(err.is_transient());
    }
}
