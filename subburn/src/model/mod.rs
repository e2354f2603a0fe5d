/// Color parsing and conversion.
pub mod color;
/// Persisted `{language, style, segments}` document.
pub mod document;
/// Track editing operations.
pub mod edit;
/// Read-only preset style registry.
pub mod presets;
/// Segment and word timing.
pub mod segment;
/// Style descriptor.
pub mod style;
/// Ordered segment track and active-segment lookup.
pub mod track;
