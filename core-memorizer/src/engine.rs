//! # Playback Engine
//!
//! Owns the audio session state: the clock (position, duration, playing) and
//! the binding to one of two interchangeable backends.
//!
//! - **Media binding**: a real source was probed and adopted under a
//!   [`MediaSessionId`]; position is sampled by the coordinator's driver
//!   task, end of media arrives through the backend's completion future.
//! - **Simulated binding**: no playable source exists; a fixed-step clock
//!   (600 s duration) keeps the transport interactive so the UI stays
//!   demo-able and usable after failures.
//!
//! The engine never probes a source itself: loads run in the coordinator's
//! cancellable resolution task and only a still-current result is adopted
//! here. Rebinding always unloads the previously adopted session first, so
//! stale native resources cannot outlive their session. Every clock mutation
//! clamps position into `[0, duration]`.

use crate::error::Result;
use bridge_traits::{MediaBackend, MediaSessionId};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No source bound; simulated clock active.
    Unloaded,
    /// A resolution/load is in flight for this engine.
    Loading,
    /// Transport controls are live (media or simulated).
    Ready,
    /// The last load failed; simulated clock took over.
    Failed,
}

/// Playback clock in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    position: f64,
    duration: f64,
    playing: bool,
}

impl PlaybackClock {
    fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration,
            playing: false,
        }
    }

    /// Current position in seconds; always within `[0, duration]`.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Stream duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns `true` while the transport is running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_position(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.duration);
    }
}

/// The audio session owner: one backend binding plus the clock.
pub struct PlaybackEngine {
    backend: Arc<dyn MediaBackend>,
    session: Option<MediaSessionId>,
    state: EngineState,
    clock: PlaybackClock,
    simulated_duration: f64,
}

impl PlaybackEngine {
    /// Engine starting out on the simulated clock.
    pub fn new_simulated(backend: Arc<dyn MediaBackend>, simulated_duration: f64) -> Self {
        Self {
            backend,
            session: None,
            state: EngineState::Unloaded,
            clock: PlaybackClock::new(simulated_duration),
            simulated_duration,
        }
    }

    /// Copy of the current clock.
    pub fn clock(&self) -> PlaybackClock {
        self.clock
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns `true` when a real media session is bound.
    pub fn is_media(&self) -> bool {
        self.session.is_some()
    }

    /// Identifier of the bound media session, if any.
    pub fn media_session(&self) -> Option<MediaSessionId> {
        self.session
    }

    /// Mark a resolution as in flight. The simulated clock stays interactive
    /// underneath it.
    pub fn mark_loading(&mut self) {
        self.state = EngineState::Loading;
    }

    /// Adopt a probed media session, replacing any previous binding.
    ///
    /// The caller must have unloaded the previous binding already (via
    /// [`reset_simulated`](Self::reset_simulated)); this only installs the
    /// new one and rebases the clock on the probed duration.
    pub fn adopt_media(&mut self, session: MediaSessionId, duration_secs: f64) {
        self.session = Some(session);
        self.state = EngineState::Ready;
        self.clock = PlaybackClock::new(duration_secs);
    }

    /// Record a failed load: simulated clock with default duration, state
    /// `Failed` so the UI can offer a retry.
    pub fn mark_failed(&mut self) {
        self.session = None;
        self.state = EngineState::Failed;
        self.clock = PlaybackClock::new(self.simulated_duration);
    }

    /// Drop any bound media session and reinstall the simulated clock with
    /// default duration, position 0, not playing.
    pub async fn reset_simulated(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = self.backend.unload(session).await {
                warn!(error = %e, "media backend unload failed");
            }
        }
        self.state = EngineState::Unloaded;
        self.clock = PlaybackClock::new(self.simulated_duration);
    }

    /// Begin or resume playback.
    pub async fn play(&mut self) -> Result<()> {
        if self.clock.playing {
            return Ok(());
        }
        if let Some(session) = self.session {
            // Session category (mixing/ducking) is established once per play.
            self.backend.configure_session().await?;
            self.backend.play(session).await?;
        }
        self.clock.playing = true;
        Ok(())
    }

    /// Pause playback, preserving position.
    pub async fn pause(&mut self) -> Result<()> {
        if !self.clock.playing {
            return Ok(());
        }
        self.clock.playing = false;
        if let Some(session) = self.session {
            self.backend.pause(session).await?;
        }
        Ok(())
    }

    /// Seek to an absolute position, clamped into `[0, duration]`.
    ///
    /// A seek landing while the engine is playing resumes playback after the
    /// backend settles; it never silently stops the transport.
    pub async fn seek(&mut self, position: f64) -> Result<()> {
        self.clock.set_position(position);
        if let Some(session) = self.session {
            self.backend
                .seek(session, Duration::from_secs_f64(self.clock.position))
                .await?;
            if self.clock.playing {
                self.backend.play(session).await?;
            }
        }
        Ok(())
    }

    /// Pin the clock at `position` and stop the transport.
    pub async fn stop_at(&mut self, position: f64) -> Result<()> {
        self.clock.set_position(position);
        self.clock.playing = false;
        if let Some(session) = self.session {
            self.backend.pause(session).await?;
        }
        Ok(())
    }

    /// Apply an observed or projected position without touching the backend.
    pub fn advance_to(&mut self, position: f64) {
        self.clock.set_position(position);
    }

    /// Sample the current position in seconds: the backend's for a media
    /// binding, the clock's own for the simulated one.
    pub async fn sample_position(&self) -> Result<f64> {
        let Some(session) = self.session else {
            return Ok(self.clock.position);
        };
        let position = self.backend.position(session).await?;
        Ok(position.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::AudioSource;
    use std::sync::Mutex;

    struct RecordingBackend {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl MediaBackend for RecordingBackend {
        async fn load(
            &self,
            _session: MediaSessionId,
            _source: &AudioSource,
        ) -> bridge_traits::error::Result<Duration> {
            self.record("load");
            Ok(Duration::from_secs(120))
        }

        async fn play(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            self.record("play");
            Ok(())
        }

        async fn pause(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            self.record("pause");
            Ok(())
        }

        async fn seek(
            &self,
            _session: MediaSessionId,
            _position: Duration,
        ) -> bridge_traits::error::Result<()> {
            self.record("seek");
            Ok(())
        }

        async fn position(&self, _session: MediaSessionId) -> bridge_traits::error::Result<Duration> {
            Ok(Duration::from_secs(1))
        }

        async fn wait_for_completion(
            &self,
            _session: MediaSessionId,
        ) -> bridge_traits::error::Result<()> {
            futures::future::pending::<()>().await;
            Ok(())
        }

        async fn unload(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            self.record("unload");
            Ok(())
        }
    }

    fn media_engine(backend: Arc<RecordingBackend>) -> PlaybackEngine {
        let mut engine = PlaybackEngine::new_simulated(backend, 600.0);
        engine.adopt_media(MediaSessionId::new(), 120.0);
        engine
    }

    #[tokio::test]
    async fn simulated_engine_has_default_clock() {
        let engine = PlaybackEngine::new_simulated(Arc::new(RecordingBackend::new()), 600.0);
        let clock = engine.clock();
        assert_eq!(clock.duration(), 600.0);
        assert_eq!(clock.position(), 0.0);
        assert!(!clock.is_playing());
        assert!(!engine.is_media());
        assert_eq!(engine.state(), EngineState::Unloaded);
    }

    #[tokio::test]
    async fn seek_clamps_into_clock_bounds() {
        let mut engine = PlaybackEngine::new_simulated(Arc::new(RecordingBackend::new()), 600.0);

        engine.seek(-5.0).await.unwrap();
        assert_eq!(engine.clock().position(), 0.0);

        engine.seek(10_000.0).await.unwrap();
        assert_eq!(engine.clock().position(), 600.0);

        engine.seek(42.5).await.unwrap();
        assert_eq!(engine.clock().position(), 42.5);
    }

    #[tokio::test]
    async fn adopting_media_rebases_the_clock() {
        let engine = media_engine(Arc::new(RecordingBackend::new()));
        assert!(engine.is_media());
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.clock().duration(), 120.0);
        assert_eq!(engine.clock().position(), 0.0);
        assert!(!engine.clock().is_playing());
    }

    #[tokio::test]
    async fn mark_failed_falls_back_to_simulated_clock() {
        let mut engine = PlaybackEngine::new_simulated(Arc::new(RecordingBackend::new()), 600.0);
        engine.mark_loading();
        assert_eq!(engine.state(), EngineState::Loading);

        engine.mark_failed();
        assert_eq!(engine.state(), EngineState::Failed);
        assert!(!engine.is_media());
        assert_eq!(engine.clock().duration(), 600.0);
    }

    #[tokio::test]
    async fn reset_unloads_the_adopted_session() {
        let backend = Arc::new(RecordingBackend::new());
        let mut engine = media_engine(backend.clone());

        engine.reset_simulated().await;

        assert_eq!(backend.calls(), vec!["unload"]);
        assert!(!engine.is_media());
        assert_eq!(engine.clock().duration(), 600.0);
    }

    #[tokio::test]
    async fn seek_while_playing_resumes_playback() {
        let backend = Arc::new(RecordingBackend::new());
        let mut engine = media_engine(backend.clone());

        engine.play().await.unwrap();
        engine.seek(30.0).await.unwrap();

        assert_eq!(backend.calls(), vec!["play", "seek", "play"]);
        assert!(engine.clock().is_playing());
        assert_eq!(engine.clock().position(), 30.0);
    }

    #[tokio::test]
    async fn seek_while_paused_stays_paused() {
        let backend = Arc::new(RecordingBackend::new());
        let mut engine = media_engine(backend.clone());

        engine.seek(30.0).await.unwrap();

        assert_eq!(backend.calls(), vec!["seek"]);
        assert!(!engine.clock().is_playing());
    }

    #[tokio::test]
    async fn stop_at_pins_and_pauses() {
        let backend = Arc::new(RecordingBackend::new());
        let mut engine = media_engine(backend.clone());

        engine.play().await.unwrap();
        engine.stop_at(120.0).await.unwrap();

        assert!(!engine.clock().is_playing());
        assert_eq!(engine.clock().position(), 120.0);
        assert!(backend.calls().contains(&"pause"));
    }

    #[tokio::test]
    async fn play_is_idempotent_while_playing() {
        let backend = Arc::new(RecordingBackend::new());
        let mut engine = media_engine(backend.clone());

        engine.play().await.unwrap();
        engine.play().await.unwrap();

        assert_eq!(backend.calls(), vec!["play"]);
    }
}
