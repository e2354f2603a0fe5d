//! Text measurement and line breaking.

/// Parley-backed shaping and measurement.
pub mod text;
/// Greedy word wrapping over an abstract measurer.
pub mod wrap;
