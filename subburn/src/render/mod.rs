//! Frame composition: what text is visible, where it goes, and how it is rasterized.

/// CPU rasterizer drawing a subtitle overlay onto a frame.
pub mod compositor;
/// Premultiplied RGBA frame buffers.
pub mod frame;
/// Resolution-independent layout of one subtitle frame.
pub mod plan;
/// Progressive text reveal per display mode.
pub mod reveal;
