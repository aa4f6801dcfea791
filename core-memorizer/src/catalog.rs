//! # Reciter Catalog
//!
//! Resolves a reciter + chapter pair to an audio source descriptor and knows
//! which chapters ship as deferred-download packs.
//!
//! ## Resolution order
//!
//! 1. A locally installed or bundled sample for this exact reciter+chapter
//!    (answered by the host's [`SampleStore`]).
//! 2. A remote streaming URL built from the reciter's base path and the
//!    zero-padded chapter index (`…/saad_al_ghamdi/001.mp3`).
//!
//! Chapters outside the supported range and unknown reciters resolve to
//! [`SourceDescriptor::Unavailable`]: "not offered", which the coordinator
//! keeps distinct from "tried and failed".
//!
//! The catalog holds no mutable state; every method is a pure lookup safe to
//! call from any task.

use crate::config::MemorizerConfig;
use bridge_traits::{AudioSource, SampleStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque reciter identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReciterId(String);

impl ReciterId {
    /// Construct an identifier from a stable slug.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReciterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReciterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A reciter whose recitations are offered as playback sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reciter {
    /// Stable identifier (also the key used by [`SampleStore`]).
    pub id: ReciterId,
    /// Latin display name.
    pub name: String,
    /// Arabic display name.
    pub arabic_name: String,
    /// Streaming base path; always ends with `/`.
    pub base_url: String,
    /// Prefix of this reciter's deferred-download pack tags (`s` → `s001`).
    pub tag_prefix: String,
}

/// Resolved audio source for a reciter + chapter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// Installed or bundled local sample.
    Local(PathBuf),
    /// Remote streaming URL.
    Remote(String),
    /// Nothing is offered for this pair.
    Unavailable,
}

impl SourceDescriptor {
    /// Convert into a backend-loadable source; `None` for `Unavailable`.
    pub fn into_audio_source(self) -> Option<AudioSource> {
        match self {
            SourceDescriptor::Local(path) => Some(AudioSource::LocalFile { path }),
            SourceDescriptor::Remote(url) => Some(AudioSource::RemoteStream { url }),
            SourceDescriptor::Unavailable => None,
        }
    }
}

/// Catalog of offered reciters plus local-sample resolution.
pub struct ReciterCatalog {
    reciters: Vec<Reciter>,
    samples: Arc<dyn SampleStore>,
    surah_count: u16,
    offline_pack_limit: u16,
}

impl ReciterCatalog {
    /// Build a catalog from an explicit reciter list.
    pub fn new(
        reciters: Vec<Reciter>,
        samples: Arc<dyn SampleStore>,
        config: &MemorizerConfig,
    ) -> Self {
        Self {
            reciters,
            samples,
            surah_count: config.surah_count,
            offline_pack_limit: config.offline_pack_limit,
        }
    }

    /// Build a catalog with the two built-in reciters.
    pub fn with_default_reciters(samples: Arc<dyn SampleStore>, config: &MemorizerConfig) -> Self {
        Self::new(default_reciters(), samples, config)
    }

    /// All offered reciters, in display order.
    pub fn reciters(&self) -> &[Reciter] {
        &self.reciters
    }

    /// Look up a reciter by id.
    pub fn reciter(&self, id: &ReciterId) -> Option<&Reciter> {
        self.reciters.iter().find(|r| &r.id == id)
    }

    /// The reciter used when no preference is stored.
    pub fn default_reciter(&self) -> Option<&Reciter> {
        self.reciters.first()
    }

    /// Returns `true` for chapter ids inside the supported 1-based range.
    pub fn supports_surah(&self, surah_id: u16) -> bool {
        (1..=self.surah_count).contains(&surah_id)
    }

    /// Resolve the playback source for a reciter + chapter pair.
    ///
    /// Prefers an installed local sample over streaming; out-of-range
    /// chapters and unknown reciters are `Unavailable`.
    pub fn resolve_source(&self, surah_id: u16, reciter_id: &ReciterId) -> SourceDescriptor {
        if !self.supports_surah(surah_id) {
            return SourceDescriptor::Unavailable;
        }
        let Some(reciter) = self.reciter(reciter_id) else {
            return SourceDescriptor::Unavailable;
        };

        if let Some(path) = self.samples.installed_sample(reciter.id.as_str(), surah_id) {
            return SourceDescriptor::Local(path);
        }

        SourceDescriptor::Remote(streaming_url(reciter, surah_id))
    }

    /// Deferred-download pack tag for this pair, or `None` when the chapter
    /// streams only.
    ///
    /// Only the leading chapters ship as packs; the tag format is the
    /// reciter prefix plus the zero-padded chapter index (`s001`, `m003`).
    pub fn on_demand_tag(&self, surah_id: u16, reciter_id: &ReciterId) -> Option<String> {
        if !self.supports_surah(surah_id) || surah_id > self.offline_pack_limit {
            return None;
        }
        let reciter = self.reciter(reciter_id)?;
        Some(format!("{}{:03}", reciter.tag_prefix, surah_id))
    }
}

impl fmt::Debug for ReciterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReciterCatalog")
            .field("reciters", &self.reciters.len())
            .field("surah_count", &self.surah_count)
            .field("offline_pack_limit", &self.offline_pack_limit)
            .finish()
    }
}

fn streaming_url(reciter: &Reciter, surah_id: u16) -> String {
    format!("{}{:03}.mp3", reciter.base_url, surah_id)
}

/// The two reciters bundled with the product.
fn default_reciters() -> Vec<Reciter> {
    vec![
        Reciter {
            id: ReciterId::new("saad-al-ghamdi"),
            name: "Saad Al-Ghamdi".to_string(),
            arabic_name: "سعد الغامدي".to_string(),
            base_url: "https://download.quranicaudio.com/quran/saad_al_ghamdi/".to_string(),
            tag_prefix: "s".to_string(),
        },
        Reciter {
            id: ReciterId::new("mishary-rashid"),
            name: "Mishary Rashid Alafasy".to_string(),
            arabic_name: "مشاري راشد العفاسي".to_string(),
            base_url: "https://download.quranicaudio.com/quran/mishaari_raashid_al_3afaasee/"
                .to_string(),
            tag_prefix: "m".to_string(),
        },
    ]
}
