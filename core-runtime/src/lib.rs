//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the recitation memorizer core:
//! - Event bus for push-updating the UI layer
//! - Logging and tracing initialization
//!
//! ## Overview
//!
//! This crate holds the runtime utilities the other core crates depend on.
//! It establishes the event broadcasting mechanism the UI observes and the
//! `tracing` conventions used throughout the workspace.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{
    CoreEvent, EventBus, PlaybackEvent, ResourceEvent, SampleAvailability, SessionEvent,
};
