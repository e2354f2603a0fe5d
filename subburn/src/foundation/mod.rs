/// Frame, rate, canvas and pixel primitives.
pub mod core;
/// Error taxonomy shared across the crate.
pub mod error;
pub(crate) mod math;
