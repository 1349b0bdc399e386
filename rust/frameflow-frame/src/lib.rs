//! Typed acquisition frames: a pixel-type tag plus an N-dimensional shape
//! over a shared [`frameflow_bytes::FrameBuffer`].

pub mod frame;
pub mod pixel_type;

pub use frame::Frame;
pub use pixel_type::PixelType;
