//! Core library for the linked percentile step animation.
//!
//! Five nodes sit in a fixed chain. Each one draws a tick mark and two arcs
//! whose fill follows a [`StepState`]. A [`ChainWalker`] steps the nodes one
//! at a time, head to tail and back, and a [`Renderer`] turns that into
//! frames for a [`FrameSink`] such as [`GifSink`] or [`TerminalPreview`].

pub mod chain;
pub mod config;
pub mod error;
pub mod preview;
pub mod raster;
pub mod record;
pub mod render;
pub mod step;
pub mod surface;
pub mod timeline;
pub mod walker;

pub use chain::{Chain, ChainNode, Direction, SlotLayout, Traversal, NODE_COUNT};
pub use config::{AnimationConfig, OutputConfig, StyleConfig};
pub use error::{Result, StepGifError};
pub use preview::TerminalPreview;
pub use raster::RasterSurface;
pub use record::{FrameSink, GifSink, InMemorySink, RecordingSettings};
pub use render::Renderer;
pub use step::{StepState, STEP_SIZE};
pub use surface::DrawingSurface;
pub use timeline::FrameClock;
pub use walker::{ChainWalker, TickOutcome};
