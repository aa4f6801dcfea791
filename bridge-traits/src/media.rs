//! Media backend bridge trait and supporting audio source types.
//!
//! The playback core never touches a platform audio engine directly. Hosts
//! implement [`MediaBackend`] over whatever their platform provides (AVPlayer,
//! ExoPlayer, a symphonia pipeline on desktop) and the core drives it through
//! this async surface. The backend owns every native decode/session resource;
//! none of them are exposed past this boundary.

use crate::error::Result;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Playable audio source handed to the media backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Local file accessible to the host runtime (installed pack content or a
    /// bundled sample).
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream fetched by the host.
    RemoteStream { url: String },
}

impl AudioSource {
    /// Returns `true` if the source requires network access to play.
    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }

    /// Human-readable description used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            AudioSource::LocalFile { path } => format!("file:{}", path.display()),
            AudioSource::RemoteStream { url } => url.clone(),
        }
    }
}

/// Unique identifier for media sessions provisioned through a backend.
///
/// The core mints an id per [`MediaBackend::load`] call and keys every
/// subsequent control call with it, so a load that was superseded mid-flight
/// can still be unloaded without touching its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaSessionId(Uuid);

impl MediaSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MediaSessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for platform audio engine adapters.
///
/// At most one session is ever *playing*, but during a selection change two
/// sessions may exist transiently: the superseded one, which the core will
/// still `unload` exactly once, and its replacement. Implementations keep a
/// small id → native-resource map and must answer calls for unknown ids with
/// an error rather than panicking.
///
/// Position is *pulled* by the core on a fixed cadence rather than pushed per
/// sample; end of media must be reported through [`wait_for_completion`],
/// not inferred from position reaching the probed duration.
///
/// [`wait_for_completion`]: MediaBackend::wait_for_completion
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open and probe the source under the given session id. Returns the
    /// discovered stream duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be fetched, opened, or decoded.
    async fn load(&self, session: MediaSessionId, source: &AudioSource) -> Result<Duration>;

    /// Establish the platform audio session (category, mixing/ducking
    /// behavior). Called once per play request, before [`play`].
    ///
    /// The default implementation is a no-op for platforms without a session
    /// concept.
    ///
    /// [`play`]: MediaBackend::play
    async fn configure_session(&self) -> Result<()> {
        Ok(())
    }

    /// Begin or resume playback of the session.
    async fn play(&self, session: MediaSessionId) -> Result<()>;

    /// Pause playback, preserving position.
    async fn pause(&self, session: MediaSessionId) -> Result<()>;

    /// Seek to an absolute position within the session's stream.
    ///
    /// Must not return until the seek has settled: a following
    /// [`position`] call reports the new position, never a stale pre-seek
    /// sample. The core relies on this to keep observed positions ordered.
    ///
    /// [`position`]: MediaBackend::position
    async fn seek(&self, session: MediaSessionId, position: Duration) -> Result<()>;

    /// Current playback position of the session.
    async fn position(&self, session: MediaSessionId) -> Result<Duration>;

    /// Resolves when the session's stream plays to its end.
    ///
    /// Must be cancel-safe: the core drops this future when the session is
    /// superseded and may call it again after a loop redirect.
    async fn wait_for_completion(&self, session: MediaSessionId) -> Result<()>;

    /// Release the session and every native resource behind it.
    async fn unload(&self, session: MediaSessionId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_source_classification() {
        let local = AudioSource::LocalFile {
            path: "/packs/s001.mp3".into(),
        };
        assert!(!local.is_remote());
        assert!(local.describe().starts_with("file:"));

        let remote = AudioSource::RemoteStream {
            url: "https://example.com/001.mp3".to_string(),
        };
        assert!(remote.is_remote());
        assert_eq!(remote.describe(), "https://example.com/001.mp3");
    }

    #[test]
    fn session_id_is_unique() {
        let a = MediaSessionId::new();
        let b = MediaSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, MediaSessionId::from_uuid(*a.as_uuid()));
    }
}
