//! # Event Bus System
//!
//! Event-driven surface between the playback core and the UI layer, built on
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The core never calls back into the UI. Instead the coordinator and its
//! components publish typed [`CoreEvent`]s here and the UI layer subscribes,
//! reacting to availability changes, transport state, and position updates.
//!
//! ```text
//! ┌──────────────┐    emit     ┌──────────┐
//! │ Coordinator  ├────────────>│          │
//! └──────────────┘             │ EventBus │   subscribe   ┌────────────┐
//! ┌──────────────┐    emit     │(broadcast├──────────────>│ UI layer   │
//! │ Acquisition  ├────────────>│ channel) │               └────────────┘
//! └──────────────┘             └──────────┘
//! ```
//!
//! Position updates are published at the engine's sampling cadence (250 ms
//! for media playback, 50 ms for the simulated clock), which bounds how often
//! subscribers re-render.
//!
//! ## Error Handling
//!
//! `broadcast` receivers can observe two errors:
//! - `RecvError::Lagged(n)`: the subscriber missed `n` events; non-fatal,
//!   the next `recv` resumes with current events.
//! - `RecvError::Closed`: every sender is gone; treat as shutdown.
//!
//! Publishers use `emit(...).ok()`; an event with no subscribers is not an
//! error condition for the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Sized for bursts of position updates plus session churn; subscribers that
/// fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Shared state vocabulary
// ============================================================================

/// Lifecycle state of the resolved audio sample for the current selection.
///
/// `None` means no sample is offered (nothing selected, or the selection is
/// outside the supported range); `Failed` means a sample was offered but
/// resolving it failed. The distinction matters to the UI: one renders a
/// neutral message, the other a retry affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleAvailability {
    #[default]
    None,
    Loading,
    Ready,
    Failed,
}

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Selection/session lifecycle events
    Session(SessionEvent),
    /// Transport and position events
    Playback(PlaybackEvent),
    /// Deferred-download pack events
    Resource(ResourceEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Resource(e) => e.description(),
        }
    }
}

/// Events describing the coordinator's session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// The user picked a chapter and/or reciter; a new session begins.
    SelectionChanged {
        /// Selected chapter, or `None` after deselection.
        surah_id: Option<u16>,
        /// Identifier of the active reciter.
        reciter_id: String,
    },
    /// The resolved-sample lifecycle state moved.
    AvailabilityChanged {
        /// New availability state.
        availability: SampleAvailability,
    },
    /// A source finished binding and transport controls are live.
    Bound {
        /// Discovered duration in seconds (600 for the simulated clock).
        duration_secs: f64,
        /// `true` when no real source bound and the simulated clock is active.
        simulated: bool,
    },
    /// Resolution or load failed; the simulated clock took over.
    BindingFailed {
        /// Human-readable reason (network vs decode).
        message: String,
        /// Whether reselecting/retrying could succeed.
        recoverable: bool,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::SelectionChanged { .. } => "Selection changed",
            SessionEvent::AvailabilityChanged { .. } => "Sample availability changed",
            SessionEvent::Bound { .. } => "Playback session bound",
            SessionEvent::BindingFailed { .. } => "Playback session binding failed",
        }
    }
}

/// Events describing transport state and playback position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Playback started or resumed.
    Started {
        /// Position at start, in seconds.
        position_secs: f64,
    },
    /// Playback paused (user action or loop-end pin).
    Paused {
        /// Position when paused, in seconds.
        position_secs: f64,
    },
    /// Playback position advanced or was repositioned.
    PositionChanged {
        /// Current position in seconds.
        position_secs: f64,
        /// Track duration in seconds.
        duration_secs: f64,
    },
    /// Playback wrapped from the loop end back to the loop start.
    Looped {
        /// Loop start the clock was redirected to, in seconds.
        to_secs: f64,
    },
    /// The loop region bounds changed.
    LoopChanged {
        /// Loop start in seconds.
        start_secs: f64,
        /// Loop end in seconds.
        end_secs: f64,
    },
    /// The loaded source played to its true end.
    Completed {
        /// Track duration the position is pinned at, in seconds.
        duration_secs: f64,
    },
    /// A transport operation failed.
    Error {
        /// Human-readable error message.
        message: String,
        /// Whether the operation can be retried.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::Looped { .. } => "Playback looped",
            PlaybackEvent::LoopChanged { .. } => "Loop region changed",
            PlaybackEvent::Completed { .. } => "Playback completed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

/// Events describing deferred-download pack acquisition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ResourceEvent {
    /// A pack fetch was requested.
    PackRequested {
        /// Pack tag (e.g. `s001`).
        tag: String,
    },
    /// The pack is resident and pinned on disk.
    PackReady {
        /// Pack tag.
        tag: String,
    },
    /// The pack could not be fetched.
    PackFailed {
        /// Pack tag.
        tag: String,
        /// Human-readable failure reason.
        message: String,
    },
    /// The pack pin was released; the platform may evict it.
    PackReleased {
        /// Pack tag.
        tag: String,
    },
}

impl ResourceEvent {
    fn description(&self) -> &str {
        match self {
            ResourceEvent::PackRequested { .. } => "Resource pack requested",
            ResourceEvent::PackReady { .. } => "Resource pack ready",
            ResourceEvent::PackFailed { .. } => "Resource pack failed",
            ResourceEvent::PackReleased { .. } => "Resource pack released",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned per subscriber)
/// - Lagging detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_subscription_counts() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn emission_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Session(SessionEvent::AvailabilityChanged {
            availability: SampleAvailability::Loading,
        });
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_secs: 12.5,
            duration_secs: 600.0,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn lagged_subscriber_is_reported() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                position_secs: i as f64,
                duration_secs: 600.0,
            }))
            .ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn event_serialization_round_trip() {
        let event = CoreEvent::Resource(ResourceEvent::PackFailed {
            tag: "s003".to_string(),
            message: "network unreachable".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("s003"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn availability_defaults_to_none() {
        assert_eq!(SampleAvailability::default(), SampleAvailability::None);
    }

    #[test]
    fn event_description() {
        let event = CoreEvent::Session(SessionEvent::Bound {
            duration_secs: 600.0,
            simulated: true,
        });
        assert_eq!(event.description(), "Playback session bound");
    }
}
