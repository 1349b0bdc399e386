//! Frame-processing stages and the kernels they wrap.
//!
//! The kernels in [`flip`] are plain functions over [`frameflow_frame::Frame`]
//! and can be called without going through a stage; [`FlipStage`] adds the
//! mode/in-place selection used by pipeline wiring.

pub mod flip;
pub mod stage;

pub use stage::{FlipMode, FlipStage};
