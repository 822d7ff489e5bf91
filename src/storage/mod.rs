//! Storage for the deduplication state.
//!
//! The watcher persists one artifact: the set of listing ids it has
//! already processed, as a JSON array of strings. The file is rewritten
//! after every cycle so that a crash loses at most the increment of the
//! cycle in flight (at-least-once delivery).

pub mod seen;

// Re-export for convenience
pub use seen::{SeenSet, SeenStore};
