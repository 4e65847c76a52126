//! Single-writer async loader and event stream APIs.

/// Event stream types emitted by the loader.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
