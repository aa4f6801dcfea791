//! Workspace aggregator crate.
//!
//! Host applications can depend on `rmc-workspace` alone and reach every
//! workspace crate through the re-exports below instead of wiring each
//! member crate individually.

pub use bridge_traits;
pub use core_memorizer;
pub use core_runtime;
