//! # Selection Coordinator
//!
//! The top-level state machine behind the memorizer screen. It reacts to
//! chapter/reciter selection changes, drives pack acquisition, rebinds the
//! playback engine, and exposes the transport API the UI layer consumes.
//!
//! ## Session lifecycle
//!
//! ```text
//!        select_surah(Some)            resolve → acquire → load
//! Idle ─────────────────────> Resolving ─────────────────────> Bound
//!   ^                            │                               │
//!   │ select_surah(None)         │ failure                       │ supersede
//!   └────────────────────────────┴─> BindingFailed <─────────────┘
//!                                     (simulated clock stays usable)
//! ```
//!
//! Exactly one resolution is in flight per coordinator. Superseding a
//! selection synchronously cancels the previous session's token, releases
//! its resource handle, and halts the transport before any new async work
//! begins; the superseded resolution is fenced out by a generation check at
//! every resumption point, so its late completion has no observable effect.
//!
//! All mutable state lives behind one async mutex: the coordinator is the
//! single logical owner and every operation (user call, driver tick,
//! completion signal, resolution finish) serializes through it.
//!
//! Failures never escape to the UI as errors. They are translated into the
//! [`SampleAvailability`] observable plus typed events, and the engine falls
//! back to the simulated clock so transport controls keep working.

use crate::acquisition::{ResourceAcquisition, ResourceHandle};
use crate::catalog::{ReciterCatalog, ReciterId, SourceDescriptor};
use crate::config::MemorizerConfig;
use crate::engine::PlaybackEngine;
use crate::error::{AcquisitionError, MemorizerError, Result};
use crate::loop_region::{LoopDecision, LoopRegion};
use bridge_traits::{
    AudioSource, BridgeError, MediaBackend, MediaSessionId, ResourcePackProvider, SettingsStore,
};
use core_runtime::events::{
    CoreEvent, EventBus, PlaybackEvent, ResourceEvent, SampleAvailability, SessionEvent,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Preferences key holding the user's default reciter id.
pub const DEFAULT_RECITER_KEY: &str = "memorizer.default_reciter";

/// Point-in-time copy of everything the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorizerSnapshot {
    pub selected_surah: Option<u16>,
    pub selected_reciter: ReciterId,
    pub is_playing: bool,
    pub is_looping: bool,
    pub duration_secs: f64,
    pub position_secs: f64,
    pub loop_start_secs: f64,
    pub loop_end_secs: f64,
    pub availability: SampleAvailability,
}

struct MemorizerInner {
    selected_surah: Option<u16>,
    reciter_id: ReciterId,
    availability: SampleAvailability,
    engine: PlaybackEngine,
    loop_region: LoopRegion,
    is_looping: bool,
    /// Fences stale async completions: bumped on every teardown.
    generation: u64,
    session_cancel: CancellationToken,
    playback_cancel: Option<CancellationToken>,
    handle: Option<ResourceHandle>,
}

/// The selection coordinator. Cheap to clone; clones share one state.
#[derive(Clone)]
pub struct Memorizer {
    state: Arc<Mutex<MemorizerInner>>,
    catalog: Arc<ReciterCatalog>,
    acquisition: Arc<ResourceAcquisition>,
    backend: Arc<dyn MediaBackend>,
    settings: Arc<dyn SettingsStore>,
    events: EventBus,
    config: MemorizerConfig,
}

impl Memorizer {
    /// Create a coordinator in the `Idle` state.
    ///
    /// The default reciter preference is read from `settings` and validated
    /// against the catalog; an absent or unknown preference falls back to
    /// the catalog's first reciter.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or an empty catalog.
    pub async fn new(
        config: MemorizerConfig,
        catalog: Arc<ReciterCatalog>,
        packs: Arc<dyn ResourcePackProvider>,
        backend: Arc<dyn MediaBackend>,
        settings: Arc<dyn SettingsStore>,
        events: EventBus,
    ) -> Result<Self> {
        config.validate().map_err(MemorizerError::Internal)?;
        let fallback = catalog
            .default_reciter()
            .ok_or_else(|| MemorizerError::Internal("reciter catalog is empty".into()))?
            .id
            .clone();

        let reciter_id = match settings.get_string(DEFAULT_RECITER_KEY).await {
            Ok(Some(stored)) => {
                let stored = ReciterId::new(stored);
                if catalog.reciter(&stored).is_some() {
                    stored
                } else {
                    warn!(reciter_id = %stored, "stored default reciter not in catalog");
                    fallback
                }
            }
            Ok(None) => fallback,
            Err(e) => {
                warn!(error = %e, "reading default reciter failed");
                fallback
            }
        };

        let engine = PlaybackEngine::new_simulated(backend.clone(), config.simulated_duration_secs);
        let loop_region = default_loop_region(&config, config.simulated_duration_secs);

        let inner = MemorizerInner {
            selected_surah: None,
            reciter_id,
            availability: SampleAvailability::None,
            engine,
            loop_region,
            is_looping: false,
            generation: 0,
            session_cancel: CancellationToken::new(),
            playback_cancel: None,
            handle: None,
        };

        Ok(Self {
            state: Arc::new(Mutex::new(inner)),
            catalog,
            acquisition: Arc::new(ResourceAcquisition::new(packs)),
            backend,
            settings,
            events,
            config,
        })
    }

    /// The event bus this coordinator publishes to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to the coordinator's events.
    pub fn subscribe(&self) -> core_runtime::events::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Copy of the full observable state.
    pub async fn snapshot(&self) -> MemorizerSnapshot {
        let inner = self.state.lock().await;
        let clock = inner.engine.clock();
        MemorizerSnapshot {
            selected_surah: inner.selected_surah,
            selected_reciter: inner.reciter_id.clone(),
            is_playing: clock.is_playing(),
            is_looping: inner.is_looping,
            duration_secs: clock.duration(),
            position_secs: clock.position(),
            loop_start_secs: inner.loop_region.start(),
            loop_end_secs: inner.loop_region.end(),
            availability: inner.availability,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a chapter (or clear the selection with `None`).
    ///
    /// Reselecting the current chapter restarts resolution, which doubles as
    /// the retry path after a failure.
    #[instrument(skip(self))]
    pub async fn select_surah(&self, surah_id: Option<u16>) {
        let mut inner = self.state.lock().await;
        inner.selected_surah = surah_id;
        self.emit(CoreEvent::Session(SessionEvent::SelectionChanged {
            surah_id,
            reciter_id: inner.reciter_id.to_string(),
        }));

        match surah_id {
            Some(surah_id) => self.restart_resolution(&mut inner, surah_id).await,
            None => {
                self.teardown_session(&mut inner).await;
                self.install_simulated_defaults(&mut inner, SampleAvailability::None)
                    .await;
                info!("selection cleared");
            }
        }
    }

    /// Switch reciters. With a chapter selected this supersedes the current
    /// session and resolves the same chapter under the new reciter; the
    /// preference is written back to settings either way.
    #[instrument(skip(self))]
    pub async fn select_reciter(&self, reciter_id: ReciterId) {
        let mut inner = self.state.lock().await;
        if inner.reciter_id == reciter_id {
            return;
        }
        if self.catalog.reciter(&reciter_id).is_none() {
            warn!("unknown reciter ignored");
            return;
        }
        inner.reciter_id = reciter_id.clone();
        self.emit(CoreEvent::Session(SessionEvent::SelectionChanged {
            surah_id: inner.selected_surah,
            reciter_id: reciter_id.to_string(),
        }));

        let settings = Arc::clone(&self.settings);
        tokio::spawn(async move {
            if let Err(e) = settings
                .set_string(DEFAULT_RECITER_KEY, reciter_id.as_str())
                .await
            {
                warn!(error = %e, "persisting default reciter failed");
            }
        });

        if let Some(surah_id) = inner.selected_surah {
            self.restart_resolution(&mut inner, surah_id).await;
        }
    }

    /// Re-enter resolution for the current inputs after a failure.
    pub async fn retry(&self) {
        let mut inner = self.state.lock().await;
        let Some(surah_id) = inner.selected_surah else {
            return;
        };
        info!(surah_id, "retrying sample resolution");
        self.restart_resolution(&mut inner, surah_id).await;
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Begin or resume playback. Valid in every state; with no bound source
    /// the simulated clock runs.
    pub async fn play(&self) {
        let mut inner = self.state.lock().await;
        if inner.engine.clock().is_playing() {
            return;
        }
        match inner.engine.play().await {
            Ok(()) => {
                let token = inner.session_cancel.child_token();
                inner.playback_cancel = Some(token.clone());
                let generation = inner.generation;
                let media = inner.engine.is_media();
                self.emit(CoreEvent::Playback(PlaybackEvent::Started {
                    position_secs: inner.engine.clock().position(),
                }));
                self.spawn_driver(generation, token, media);
            }
            Err(e) => self.report_transport_error(e),
        }
    }

    /// Pause playback, preserving position.
    pub async fn pause(&self) {
        let mut inner = self.state.lock().await;
        if !inner.engine.clock().is_playing() {
            return;
        }
        if let Some(token) = inner.playback_cancel.take() {
            token.cancel();
        }
        match inner.engine.pause().await {
            Ok(()) => self.emit(CoreEvent::Playback(PlaybackEvent::Paused {
                position_secs: inner.engine.clock().position(),
            })),
            Err(e) => self.report_transport_error(e),
        }
    }

    /// Toggle between play and pause.
    pub async fn toggle_play(&self) {
        let playing = { self.state.lock().await.engine.clock().is_playing() };
        if playing {
            self.pause().await;
        } else {
            self.play().await;
        }
    }

    /// Seek to an absolute position in seconds, clamped into the clock
    /// bounds. A seek while playing resumes playback after it settles.
    pub async fn seek(&self, position_secs: f64) {
        let mut inner = self.state.lock().await;
        match inner.engine.seek(position_secs).await {
            Ok(()) => {
                let clock = inner.engine.clock();
                self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                    position_secs: clock.position(),
                    duration_secs: clock.duration(),
                }));
            }
            Err(e) => self.report_transport_error(e),
        }
    }

    /// Update the loop bounds; either marker may be omitted. If the clamped
    /// region no longer contains the playhead, playback is repositioned to
    /// the loop start.
    pub async fn set_loop(&self, start_secs: Option<f64>, end_secs: Option<f64>) {
        let mut inner = self.state.lock().await;
        let duration = inner.engine.clock().duration();
        inner
            .loop_region
            .apply(start_secs, end_secs, duration, self.config.min_loop_span_secs);
        self.emit(CoreEvent::Playback(PlaybackEvent::LoopChanged {
            start_secs: inner.loop_region.start(),
            end_secs: inner.loop_region.end(),
        }));

        let position = inner.engine.clock().position();
        if !inner.loop_region.contains(position) {
            let target = inner.loop_region.start();
            match inner.engine.seek(target).await {
                Ok(()) => self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                    position_secs: target,
                    duration_secs: duration,
                })),
                Err(e) => self.report_transport_error(e),
            }
        }
    }

    /// Enable or disable A↔B looping.
    pub async fn set_looping(&self, looping: bool) {
        let mut inner = self.state.lock().await;
        inner.is_looping = looping;
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Tear down the current session and launch one cancellable resolution
    /// for `surah_id` under the active reciter.
    async fn restart_resolution(&self, inner: &mut MemorizerInner, surah_id: u16) {
        self.teardown_session(inner).await;
        self.install_simulated_defaults(inner, SampleAvailability::Loading)
            .await;
        inner.engine.mark_loading();

        let generation = inner.generation;
        let cancel = inner.session_cancel.clone();
        let reciter_id = inner.reciter_id.clone();
        let mem = self.clone();
        tokio::spawn(async move {
            mem.resolve_and_bind(generation, cancel, surah_id, reciter_id)
                .await;
        });
    }

    /// The single unit of async work per session: resolve a source, acquire
    /// its pack if tagged, probe it, and hand the result to a fenced finish.
    #[instrument(skip(self, cancel))]
    async fn resolve_and_bind(
        self,
        generation: u64,
        cancel: CancellationToken,
        surah_id: u16,
        reciter_id: ReciterId,
    ) {
        let tag = self.catalog.on_demand_tag(surah_id, &reciter_id);
        if let Some(tag) = &tag {
            self.emit(CoreEvent::Resource(ResourceEvent::PackRequested {
                tag: tag.clone(),
            }));
        }

        let handle = match self.acquisition.acquire(tag.as_deref(), &cancel).await {
            Ok(handle) => {
                if let Some(tag) = handle.tag() {
                    self.emit(CoreEvent::Resource(ResourceEvent::PackReady {
                        tag: tag.to_string(),
                    }));
                }
                handle
            }
            Err(AcquisitionError::Cancelled) => {
                debug!("resolution superseded during acquisition");
                return;
            }
            Err(e) => {
                if let Some(tag) = tag {
                    self.emit(CoreEvent::Resource(ResourceEvent::PackFailed {
                        tag,
                        message: e.to_string(),
                    }));
                }
                self.finish_failed(generation, MemorizerError::from(e)).await;
                return;
            }
        };
        if cancel.is_cancelled() {
            // The handle's drop unpins the pack.
            debug!("resolution superseded after acquisition");
            return;
        }

        let source = self.catalog.resolve_source(surah_id, &reciter_id);
        let audio = match (&tag, source) {
            // A tagged chapter must resolve to its local pack content.
            (Some(_), SourceDescriptor::Local(path)) => AudioSource::LocalFile { path },
            (Some(tag), _) => {
                self.finish_failed(
                    generation,
                    MemorizerError::SampleMissing {
                        tag: tag.clone(),
                        surah_id,
                    },
                )
                .await;
                return;
            }
            (None, source) => match source.into_audio_source() {
                Some(audio) => audio,
                None => {
                    self.finish_unavailable(generation).await;
                    return;
                }
            },
        };

        let session = MediaSessionId::new();
        match self.backend.load(session, &audio).await {
            Ok(duration) => {
                self.finish_bound(generation, cancel, session, duration.as_secs_f64(), handle)
                    .await;
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    debug!("resolution superseded during load");
                    return;
                }
                let err = match e {
                    BridgeError::Network(_) => MemorizerError::Bridge(e),
                    other => MemorizerError::MediaLoad(other.to_string()),
                };
                self.finish_failed(generation, err).await;
            }
        }
    }

    /// Install a successfully probed session, unless it went stale while
    /// loading, in which case the orphaned backend session is unloaded and
    /// the pack pin released with no other observable effect.
    async fn finish_bound(
        &self,
        generation: u64,
        cancel: CancellationToken,
        session: MediaSessionId,
        duration_secs: f64,
        handle: ResourceHandle,
    ) {
        let mut inner = self.state.lock().await;
        if inner.generation != generation || cancel.is_cancelled() {
            drop(inner);
            debug!("stale bind discarded");
            if let Err(e) = self.backend.unload(session).await {
                warn!(error = %e, "unloading orphaned session failed");
            }
            drop(handle);
            return;
        }

        inner.engine.adopt_media(session, duration_secs);
        inner.handle = Some(handle);
        inner.loop_region = default_loop_region(&self.config, duration_secs);
        self.set_availability(&mut inner, SampleAvailability::Ready);
        self.emit(CoreEvent::Session(SessionEvent::Bound {
            duration_secs,
            simulated: false,
        }));
        self.emit(CoreEvent::Playback(PlaybackEvent::LoopChanged {
            start_secs: inner.loop_region.start(),
            end_secs: inner.loop_region.end(),
        }));
        self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_secs: 0.0,
            duration_secs,
        }));

        let token = inner.session_cancel.child_token();
        self.spawn_completion_watcher(generation, token, session);
        info!(duration_secs, "playback session bound");
    }

    async fn finish_failed(&self, generation: u64, err: MemorizerError) {
        let mut inner = self.state.lock().await;
        if inner.generation != generation {
            debug!("stale failure discarded");
            return;
        }
        warn!(error = %err, "session binding failed");
        inner.engine.mark_failed();
        inner.loop_region = default_loop_region(&self.config, self.config.simulated_duration_secs);
        self.set_availability(&mut inner, SampleAvailability::Failed);
        self.emit(CoreEvent::Session(SessionEvent::BindingFailed {
            message: err.to_string(),
            recoverable: err.is_transient(),
        }));
        self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_secs: 0.0,
            duration_secs: self.config.simulated_duration_secs,
        }));
    }

    async fn finish_unavailable(&self, generation: u64) {
        let mut inner = self.state.lock().await;
        if inner.generation != generation {
            return;
        }
        inner.engine.reset_simulated().await;
        self.set_availability(&mut inner, SampleAvailability::None);
        info!("no sample offered for selection");
    }

    // ========================================================================
    // Session teardown
    // ========================================================================

    /// Synchronously invalidate the current session: cancel its token (which
    /// stops drivers, watchers, and any in-flight resolution), release the
    /// pack handle, halt the transport, and bump the generation fence.
    async fn teardown_session(&self, inner: &mut MemorizerInner) {
        inner.session_cancel.cancel();
        inner.session_cancel = CancellationToken::new();
        inner.playback_cancel = None;
        inner.generation = inner.generation.wrapping_add(1);

        if let Some(handle) = inner.handle.take() {
            self.release_handle(handle);
        }
        if let Err(e) = inner.engine.pause().await {
            warn!(error = %e, "halting transport during teardown failed");
        }
    }

    /// Reinstall simulated defaults: 600 s duration, position 0, loop
    /// region `(0, 30)`, and the given availability.
    async fn install_simulated_defaults(
        &self,
        inner: &mut MemorizerInner,
        availability: SampleAvailability,
    ) {
        inner.engine.reset_simulated().await;
        inner.loop_region = default_loop_region(&self.config, self.config.simulated_duration_secs);
        self.set_availability(inner, availability);
        self.emit(CoreEvent::Playback(PlaybackEvent::LoopChanged {
            start_secs: inner.loop_region.start(),
            end_secs: inner.loop_region.end(),
        }));
        self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_secs: 0.0,
            duration_secs: self.config.simulated_duration_secs,
        }));
    }

    fn release_handle(&self, handle: ResourceHandle) {
        if let Some(tag) = handle.tag().map(str::to_string) {
            handle.release();
            self.emit(CoreEvent::Resource(ResourceEvent::PackReleased { tag }));
        }
    }

    // ========================================================================
    // Clock driving
    // ========================================================================

    /// Spawn the position driver for the current playback run. Media
    /// bindings are sampled every `media_poll_interval`; the simulated clock
    /// steps every `simulated_tick_interval`.
    fn spawn_driver(&self, generation: u64, token: CancellationToken, media: bool) {
        let period = if media {
            self.config.media_poll_interval
        } else {
            self.config.simulated_tick_interval
        };
        let mem = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval fires immediately; the first step lands one period in
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !mem.advance(generation).await {
                    break;
                }
            }
        });
    }

    /// One driver tick. Returns `false` when the driver should stop (stale
    /// generation, paused, or pinned by a loop decision).
    async fn advance(&self, generation: u64) -> bool {
        let mut inner = self.state.lock().await;
        if inner.generation != generation {
            return false;
        }
        let clock = inner.engine.clock();
        if !clock.is_playing() {
            return false;
        }

        let prev = clock.position();
        let next = if inner.engine.is_media() {
            match inner.engine.sample_position().await {
                Ok(position) => position,
                Err(e) => {
                    debug!(error = %e, "position sample failed");
                    return true;
                }
            }
        } else {
            prev + self.config.simulated_step_secs()
        };

        let duration = clock.duration();
        match inner
            .loop_region
            .decide(prev, next, inner.is_looping, duration)
        {
            LoopDecision::Continue => {
                inner.engine.advance_to(next);
                self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                    position_secs: inner.engine.clock().position(),
                    duration_secs: duration,
                }));
                true
            }
            LoopDecision::Redirect { target } => {
                match inner.engine.seek(target).await {
                    Ok(()) => {
                        self.emit(CoreEvent::Playback(PlaybackEvent::Looped { to_secs: target }));
                        self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                            position_secs: target,
                            duration_secs: duration,
                        }));
                    }
                    Err(e) => self.report_transport_error(e),
                }
                true
            }
            LoopDecision::StopAt { position } => {
                if let Some(token) = inner.playback_cancel.take() {
                    token.cancel();
                }
                if let Err(e) = inner.engine.stop_at(position).await {
                    self.report_transport_error(e);
                }
                if position >= duration {
                    self.emit(CoreEvent::Playback(PlaybackEvent::Completed {
                        duration_secs: duration,
                    }));
                } else {
                    self.emit(CoreEvent::Playback(PlaybackEvent::Paused {
                        position_secs: position,
                    }));
                }
                self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                    position_secs: position,
                    duration_secs: duration,
                }));
                false
            }
        }
    }

    /// Watch the media backend's dedicated end-of-media signal for one
    /// session. Fenced by generation like every other completion.
    fn spawn_completion_watcher(
        &self,
        generation: u64,
        token: CancellationToken,
        session: MediaSessionId,
    ) {
        let mem = self.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = backend.wait_for_completion(session) => {
                    if result.is_ok() {
                        mem.on_media_completed(generation).await;
                    }
                }
            }
        });
    }

    /// End of media: while looping, restart from the loop start and re-arm
    /// the watcher; otherwise pin at the true duration and stop.
    async fn on_media_completed(&self, generation: u64) {
        let mut inner = self.state.lock().await;
        if inner.generation != generation {
            return;
        }
        let duration = inner.engine.clock().duration();
        if inner.is_looping {
            let target = inner.loop_region.start();
            match inner.engine.seek(target).await {
                Ok(()) => {
                    self.emit(CoreEvent::Playback(PlaybackEvent::Looped { to_secs: target }));
                    self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                        position_secs: target,
                        duration_secs: duration,
                    }));
                }
                Err(e) => self.report_transport_error(e),
            }
            if let Some(session) = inner.engine.media_session() {
                let token = inner.session_cancel.child_token();
                self.spawn_completion_watcher(generation, token, session);
            }
        } else {
            if let Some(token) = inner.playback_cancel.take() {
                token.cancel();
            }
            if let Err(e) = inner.engine.stop_at(duration).await {
                self.report_transport_error(e);
            }
            self.emit(CoreEvent::Playback(PlaybackEvent::Completed {
                duration_secs: duration,
            }));
            self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                position_secs: duration,
                duration_secs: duration,
            }));
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn set_availability(&self, inner: &mut MemorizerInner, availability: SampleAvailability) {
        if inner.availability != availability {
            inner.availability = availability;
            self.emit(CoreEvent::Session(SessionEvent::AvailabilityChanged {
                availability,
            }));
        }
    }

    fn report_transport_error(&self, err: MemorizerError) {
        warn!(error = %err, "transport operation failed");
        self.emit(CoreEvent::Playback(PlaybackEvent::Error {
            message: err.to_string(),
            recoverable: err.is_transient(),
        }));
    }

    fn emit(&self, event: CoreEvent) {
        self.events.emit(event).ok();
    }
}

fn default_loop_region(config: &MemorizerConfig, duration: f64) -> LoopRegion {
    LoopRegion::reset(
        duration,
        config.default_loop_end_secs,
        config.min_loop_span_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{EmptySampleStore, NoopResourcePacks};
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Settings {}

        #[async_trait::async_trait]
        impl SettingsStore for Settings {
            async fn set_string(&self, key: &str, value: &str) -> bridge_traits::error::Result<()>;
            async fn get_string(&self, key: &str) -> bridge_traits::error::Result<Option<String>>;
            async fn set_bool(&self, key: &str, value: bool) -> bridge_traits::error::Result<()>;
            async fn get_bool(&self, key: &str) -> bridge_traits::error::Result<Option<bool>>;
            async fn set_f64(&self, key: &str, value: f64) -> bridge_traits::error::Result<()>;
            async fn get_f64(&self, key: &str) -> bridge_traits::error::Result<Option<f64>>;
            async fn delete(&self, key: &str) -> bridge_traits::error::Result<()>;
            async fn has_key(&self, key: &str) -> bridge_traits::error::Result<bool>;
        }
    }

    struct NullBackend;

    #[async_trait::async_trait]
    impl MediaBackend for NullBackend {
        async fn load(
            &self,
            _session: MediaSessionId,
            _source: &AudioSource,
        ) -> bridge_traits::error::Result<Duration> {
            Ok(Duration::from_secs(120))
        }

        async fn play(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        async fn pause(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        async fn seek(
            &self,
            _session: MediaSessionId,
            _position: Duration,
        ) -> bridge_traits::error::Result<()> {
            Ok(())
        }

        async fn position(&self, _session: MediaSessionId) -> bridge_traits::error::Result<Duration> {
            Ok(Duration::from_secs(0))
        }

        async fn wait_for_completion(
            &self,
            _session: MediaSessionId,
        ) -> bridge_traits::error::Result<()> {
            futures::future::pending::<()>().await;
            Ok(())
        }

        async fn unload(&self, _session: MediaSessionId) -> bridge_traits::error::Result<()> {
            Ok(())
        }
    }

    async fn memorizer_with_settings(settings: MockSettings) -> Memorizer {
        let config = MemorizerConfig::default();
        let catalog = Arc::new(ReciterCatalog::with_default_reciters(
            Arc::new(EmptySampleStore),
            &config,
        ));
        Memorizer::new(
            config,
            catalog,
            Arc::new(NoopResourcePacks),
            Arc::new(NullBackend),
            Arc::new(settings),
            EventBus::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn idle_snapshot_has_simulated_defaults() {
        let mut settings = MockSettings::new();
        settings.expect_get_string().returning(|_| Ok(None));

        let mem = memorizer_with_settings(settings).await;
        let snapshot = mem.snapshot().await;

        assert_eq!(snapshot.selected_surah, None);
        assert_eq!(snapshot.selected_reciter, ReciterId::new("saad-al-ghamdi"));
        assert!(!snapshot.is_playing);
        assert!(!snapshot.is_looping);
        assert_eq!(snapshot.duration_secs, 600.0);
        assert_eq!(snapshot.position_secs, 0.0);
        assert_eq!(snapshot.loop_start_secs, 0.0);
        assert_eq!(snapshot.loop_end_secs, 30.0);
        assert_eq!(snapshot.availability, SampleAvailability::None);
    }

    #[tokio::test]
    async fn stored_reciter_preference_is_applied() {
        let mut settings = MockSettings::new();
        settings
            .expect_get_string()
            .returning(|_| Ok(Some("mishary-rashid".to_string())));

        let mem = memorizer_with_settings(settings).await;
        assert_eq!(
            mem.snapshot().await.selected_reciter,
            ReciterId::new("mishary-rashid")
        );
    }

    #[tokio::test]
    async fn unknown_stored_reciter_falls_back_to_catalog_default() {
        let mut settings = MockSettings::new();
        settings
            .expect_get_string()
            .returning(|_| Ok(Some("who-is-this".to_string())));

        let mem = memorizer_with_settings(settings).await;
        assert_eq!(
            mem.snapshot().await.selected_reciter,
            ReciterId::new("saad-al-ghamdi")
        );
    }

    #[tokio::test]
    async fn switching_reciter_persists_the_preference() {
        let mut settings = MockSettings::new();
        settings.expect_get_string().returning(|_| Ok(None));
        settings
            .expect_set_string()
            .withf(|key, value| key == DEFAULT_RECITER_KEY && value == "mishary-rashid")
            .times(1)
            .returning(|_, _| Ok(()));

        let mem = memorizer_with_settings(settings).await;
        mem.select_reciter(ReciterId::new("mishary-rashid")).await;

        // The write-back runs on a spawned task.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            mem.snapshot().await.selected_reciter,
            ReciterId::new("mishary-rashid")
        );
    }

    #[tokio::test]
    async fn unknown_reciter_selection_is_ignored() {
        let mut settings = MockSettings::new();
        settings.expect_get_string().returning(|_| Ok(None));

        let mem = memorizer_with_settings(settings).await;
        mem.select_reciter(ReciterId::new("who-is-this")).await;

        assert_eq!(
            mem.snapshot().await.selected_reciter,
            ReciterId::new("saad-al-ghamdi")
        );
    }
}
