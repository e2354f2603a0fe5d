//! Subburn renders styled, animated subtitles onto video frames and burns them into exported
//! video files.
//!
//! The engine is organized around a [`Track`] of timed [`Segment`]s and one shared [`Style`]:
//!
//! - Resolve the active segment for a playback time ([`Track::active_at`], [`SegmentCursor`])
//! - Composite it onto a frame with the [`Compositor`]
//! - Drive live re-rendering from a media clock ([`PreviewDriver`], [`PreviewTicker`])
//! - Export a burned-in video through an [`ExportPipeline`] that falls back between strategies
//! - Read and write SRT/WebVTT, and generate ASS, plain text and JSON ([`format`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Video export strategies and the fallback pipeline.
pub mod export;
pub mod format;
pub mod layout;
/// Segments, tracks, styles, presets and editing.
pub mod model;
pub mod preview;
pub mod render;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, REFERENCE_HEIGHT, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ErrorCategory, ResourceKind, SubburnError, SubburnResult};

pub use crate::export::capture::{FrameCaptureExporter, sample_times};
pub use crate::export::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts};
pub use crate::export::filter::LocalFilterExporter;
pub use crate::export::remote::RemoteExporter;
pub use crate::export::settings::ExportSettings;
pub use crate::export::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::export::source::SourceMedia;
pub use crate::export::{
    CancelToken, ExportArtifact, ExportControl, ExportError, ExportJob, ExportPipeline,
    ExportProgress, Exporter,
};
pub use crate::format::SubtitleFormat;
pub use crate::layout::text::TextLayoutEngine;
pub use crate::model::color::Color;
pub use crate::model::document::Document;
pub use crate::model::edit::SplitAt;
pub use crate::model::presets::{Preset, preset, presets};
pub use crate::model::segment::{Segment, SegmentId, WordTiming};
pub use crate::model::style::{Animation, DisplayMode, FontWeight, Position, Style, TextAlign};
pub use crate::model::track::{SegmentCursor, Track};
pub use crate::preview::driver::{MediaClock, PreviewDriver, TickReport};
pub use crate::preview::ticker::{PreviewCommand, PreviewTicker};
pub use crate::render::compositor::{Compositor, RenderOutcome};
pub use crate::render::frame::FrameRGBA;
