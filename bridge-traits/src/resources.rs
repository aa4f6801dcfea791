//! Deferred-download resource pack bridge.
//!
//! Some platforms ship bundled content that is fetched on first use rather
//! than at install time (on-demand resources on iOS, asset packs on Android).
//! [`ResourcePackProvider`] abstracts that mechanism: the core asks for a
//! pack by tag before a local file behind it becomes readable, and signals
//! when it no longer needs the pack resident so the platform may evict it.

use crate::error::Result;

/// Download priority hint forwarded to the platform fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPriority {
    /// Background fetch; the platform schedules it at its convenience.
    Default,
    /// User is waiting on this content; fetch immediately.
    High,
}

/// Trait for platform deferred-download pack providers.
///
/// Access is a strict begin/end pair per tag. While access is held the files
/// behind the tag are guaranteed resident on disk; after `end_access` the
/// platform is free to evict them.
#[async_trait::async_trait]
pub trait ResourcePackProvider: Send + Sync {
    /// Fetch the pack identified by `tag` (if not already resident) and pin
    /// it on disk until the matching [`end_access`] call.
    ///
    /// Implementations should abort an in-flight fetch when the returned
    /// future is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when the pack cannot be fetched (network or storage
    /// failure) or the tag is unknown to the platform.
    ///
    /// [`end_access`]: ResourcePackProvider::end_access
    async fn begin_access(&self, tag: &str, priority: FetchPriority) -> Result<()>;

    /// Unpin the pack identified by `tag`. Must be callable from synchronous
    /// teardown paths, so this is not async.
    fn end_access(&self, tag: &str);
}

/// Provider for platforms without a deferred-download feature.
///
/// Every request succeeds immediately and `end_access` is a no-op, which
/// preserves the acquisition interface while making all tagged content
/// behave as if it were already installed.
#[derive(Debug, Clone, Default)]
pub struct NoopResourcePacks;

#[async_trait::async_trait]
impl ResourcePackProvider for NoopResourcePacks {
    async fn begin_access(&self, _tag: &str, _priority: FetchPriority) -> Result<()> {
        Ok(())
    }

    fn end_access(&self, _tag: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_provider_always_succeeds() {
        let packs = NoopResourcePacks;
        packs
            .begin_access("s001", FetchPriority::High)
            .await
            .unwrap();
        packs.end_access("s001");
    }
}
