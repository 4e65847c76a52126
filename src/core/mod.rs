//! Synchronous collection state machine.

/// Accumulated items, paging cursor, and in-flight tracking.
pub mod state;
