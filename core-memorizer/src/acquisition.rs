//! # Resource Acquisition
//!
//! Requests deferred-download packs ahead of playback and pins them on disk
//! for the lifetime of the session that needs them.
//!
//! One acquisition is outstanding per coordinator at a time: superseding a
//! selection cancels the in-flight request through its `CancellationToken`
//! before a new one starts. Cancellation is cooperative and silent; it is
//! never reported to the user as a failure.
//!
//! The returned [`ResourceHandle`] is the access lifetime: the pack stays
//! resident until the handle is released, and the handle releases itself on
//! drop so a superseded or failed session can never leak pack residency.

use crate::error::AcquisitionError;
use bridge_traits::{FetchPriority, ResourcePackProvider};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Exclusive access to a resident resource pack.
///
/// Held by the coordinator's current session and released exactly once, when
/// the session ends, fails, or is superseded. An empty handle (no tag) is
/// returned for chapters that stream only.
pub struct ResourceHandle {
    pinned: Option<(String, Arc<dyn ResourcePackProvider>)>,
}

impl ResourceHandle {
    /// Handle for sources that need no pack; releasing is a no-op.
    pub fn empty() -> Self {
        Self { pinned: None }
    }

    fn pinned(tag: String, provider: Arc<dyn ResourcePackProvider>) -> Self {
        Self {
            pinned: Some((tag, provider)),
        }
    }

    /// Tag of the pinned pack, if any.
    pub fn tag(&self) -> Option<&str> {
        self.pinned.as_ref().map(|(tag, _)| tag.as_str())
    }

    /// Release the pack pin. Consumes the handle, so a second release cannot
    /// be expressed.
    pub fn release(mut self) {
        self.release_pin();
    }

    fn release_pin(&mut self) {
        if let Some((tag, provider)) = self.pinned.take() {
            debug!(tag = %tag, "releasing resource pack");
            provider.end_access(&tag);
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release_pin();
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("tag", &self.tag())
            .finish()
    }
}

/// Asynchronous, cancellable pack acquisition.
pub struct ResourceAcquisition {
    provider: Arc<dyn ResourcePackProvider>,
}

impl ResourceAcquisition {
    pub fn new(provider: Arc<dyn ResourcePackProvider>) -> Self {
        Self { provider }
    }

    /// Acquire the pack behind `tag`, racing the platform fetch against the
    /// session's cancellation token.
    ///
    /// - `None` tag short-circuits to an empty handle; the caller proceeds
    ///   straight to streaming.
    /// - Cancellation (before, during, or immediately after the fetch)
    ///   returns [`AcquisitionError::Cancelled`] with any partially acquired
    ///   pin already released.
    /// - A platform failure maps to [`AcquisitionError::Unavailable`].
    pub async fn acquire(
        &self,
        tag: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ResourceHandle, AcquisitionError> {
        let Some(tag) = tag else {
            return Ok(ResourceHandle::empty());
        };
        if cancel.is_cancelled() {
            return Err(AcquisitionError::Cancelled);
        }

        debug!(tag = %tag, "requesting resource pack");
        tokio::select! {
            _ = cancel.cancelled() => Err(AcquisitionError::Cancelled),
            result = self.provider.begin_access(tag, FetchPriority::High) => match result {
                Ok(()) => {
                    let handle =
                        ResourceHandle::pinned(tag.to_string(), Arc::clone(&self.provider));
                    if cancel.is_cancelled() {
                        // Superseded while the fetch finished; the handle's
                        // drop unpins the pack before we report cancellation.
                        return Err(AcquisitionError::Cancelled);
                    }
                    Ok(handle)
                }
                Err(e) => Err(AcquisitionError::Unavailable(e.to_string())),
            },
        }
    }
}

impl fmt::Debug for ResourceAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceAcquisition").finish_non_exhaustive()
    }
}
