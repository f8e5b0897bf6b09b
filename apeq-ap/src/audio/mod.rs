//! Audio subsystem: decode, gain cascade, output, renderer

pub mod decoder;
pub mod equalizer;
pub mod output;
pub mod renderer;

pub use equalizer::{apply_gains, EqualizerSettings, UNITY_GAIN};
pub use renderer::{Renderer, RendererSignal, StreamRenderer};
