//! # Recitation Memorizer Core
//!
//! The playback and loop-region state machine behind the memorizer screen.
//!
//! ## Overview
//!
//! This crate owns everything between "the user tapped a chapter" and "the UI
//! shows a moving playhead":
//!
//! - [`catalog`] resolves a reciter + chapter pair to an audio source
//!   (installed local sample, remote stream, or nothing).
//! - [`acquisition`] fetches and pins deferred-download content packs before
//!   a tagged local sample becomes readable.
//! - [`engine`] drives the actual audio session through the host's
//!   [`MediaBackend`](bridge_traits::MediaBackend), falling back to a
//!   fixed-step simulated clock when no source is playable.
//! - [`loop_region`] holds the A↔B bounds and decides when playback must be
//!   redirected or pinned.
//! - [`coordinator`] ties it together: one cancellable resolution per
//!   selection, generation-fenced completion, and the public transport API
//!   the UI consumes.
//!
//! ## Usage
//!
//! ```no_run
//! use bridge_traits::{EmptySampleStore, NoopResourcePacks};
//! use core_memorizer::{Memorizer, MemorizerConfig, ReciterCatalog};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     backend: Arc<dyn bridge_traits::MediaBackend>,
//! #     settings: Arc<dyn bridge_traits::SettingsStore>,
//! # ) -> core_memorizer::Result<()> {
//! let config = MemorizerConfig::default();
//! let catalog = Arc::new(ReciterCatalog::with_default_reciters(
//!     Arc::new(EmptySampleStore),
//!     &config,
//! ));
//! let events = EventBus::default();
//!
//! let memorizer = Memorizer::new(
//!     config,
//!     catalog,
//!     Arc::new(NoopResourcePacks),
//!     backend,
//!     settings,
//!     events,
//! )
//! .await?;
//!
//! memorizer.select_surah(Some(1)).await;
//! memorizer.set_loop(Some(0.0), Some(15.0)).await;
//! memorizer.set_looping(true).await;
//! memorizer.play().await;
//! # Ok(())
//! # }
//! ```

pub mod acquisition;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod loop_region;

pub use acquisition::{ResourceAcquisition, ResourceHandle};
pub use catalog::{Reciter, ReciterCatalog, ReciterId, SourceDescriptor};
pub use config::MemorizerConfig;
pub use coordinator::{Memorizer, MemorizerSnapshot};
pub use engine::{EngineState, PlaybackClock, PlaybackEngine};
pub use error::{AcquisitionError, MemorizerError, Result};
pub use loop_region::{LoopDecision, LoopRegion};
