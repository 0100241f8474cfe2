// THEORY:
// This file is the main entry point for the `sevseg_reader` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (the capture loop of
// an embedding application).
//
// The primary goal is to export the `DisplayPipeline` and its associated
// data structures (`PipelineConfig`, `FrameReport`, `PipelineError`) as the
// clean, high-level interface for the whole recognition engine. The stage
// internals live in `core_modules`; the `overlay` helpers are re-exported
// for rendering collaborators that want ready-made annotation drawing.

pub mod core_modules;
pub mod pipeline;

pub use core_modules::overlay;
pub use core_modules::region::Region;
pub use pipeline::{DisplayPipeline, FrameReport, PipelineConfig, PipelineError};
