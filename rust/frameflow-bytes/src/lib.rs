//! Shared, aligned byte buffers backing acquisition frames.

pub mod buffer;

pub use buffer::{BUFFER_ALIGNMENT, FrameBuffer, MemoryAllocation, MemoryRegion, Ownership};
