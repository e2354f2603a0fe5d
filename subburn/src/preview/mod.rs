//! Live preview: re-render the subtitle overlay whenever playback time or the document changes.

/// Clock-driven tick logic.
pub mod driver;
/// Background thread scheduling ticks while playing.
pub mod ticker;
