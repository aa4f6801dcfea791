//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be provided differently per platform (iOS,
//! Android, desktop test harness).
//!
//! ## Traits
//!
//! ### Audio
//! - [`MediaBackend`](media::MediaBackend) - Native audio engine adapter:
//!   load/probe, transport control, position sampling, end-of-media signal
//!
//! ### Content
//! - [`ResourcePackProvider`](resources::ResourcePackProvider) - Deferred-download
//!   content packs addressed by tag, with begin/end access lifecycle
//! - [`SampleStore`](storage::SampleStore) - Lookup of locally installed or
//!   bundled recitation sample files
//!
//! ### Preferences
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native errors into `BridgeError` with
//! actionable messages and context (tag names, file paths, URLs).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared freely across async tasks behind `Arc<dyn ...>`.

pub mod error;
pub mod media;
pub mod resources;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use media::{AudioSource, MediaBackend, MediaSessionId};
pub use resources::{FetchPriority, NoopResourcePacks, ResourcePackProvider};
pub use storage::{EmptySampleStore, SampleStore, SettingsStore};
