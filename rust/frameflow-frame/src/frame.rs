//! The frame descriptor shared between acquisition and processing stages.

use std::collections::BTreeMap;

use frameflow_bytes::FrameBuffer;
use frameflow_common::{Result, error::Error, verify_arg};

use crate::pixel_type::PixelType;

/// A typed N-dimensional frame over a shared [`FrameBuffer`].
///
/// `Frame` pairs acquisition metadata (pixel type, shape, frame number,
/// timestamp, free-form header entries) with an optional shared reference to
/// the pixel data. `Clone` is the cheap assignment of the pipeline: metadata
/// is copied by value, the buffer is shared, so a write through one holder is
/// visible to all. [`Frame::copy`] and [`Frame::copy_header`] are the explicit
/// deep operations for callers needing isolation.
#[derive(Clone)]
pub struct Frame {
    /// Element type of the pixel data.
    pub pixel_type: PixelType,
    /// Dimension sizes, fastest-varying first (`[width, height]` for 2D).
    pub dimensions: Vec<usize>,
    /// Acquisition sequence number; -1 when not assigned.
    pub frame_number: i64,
    /// Acquisition timestamp in seconds.
    pub timestamp: f64,
    /// Number of detector strips concatenated in the buffer.
    pub strip_count: usize,
    /// Free-form metadata attached by upstream stages.
    pub header: BTreeMap<String, String>,
    buffer: Option<FrameBuffer>,
}

impl Frame {
    /// Creates an empty, untyped frame with no buffer.
    pub fn new() -> Frame {
        Frame {
            pixel_type: PixelType::Undef,
            dimensions: Vec::new(),
            frame_number: -1,
            timestamp: 0.0,
            strip_count: 1,
            header: BTreeMap::new(),
            buffer: None,
        }
    }

    /// Creates a frame of the given type and shape over an existing buffer.
    ///
    /// The buffer must be large enough to hold `depth × product(dimensions)`
    /// bytes.
    pub fn with_buffer(
        pixel_type: PixelType,
        dimensions: Vec<usize>,
        buffer: FrameBuffer,
    ) -> Result<Frame> {
        let size = frame_size(pixel_type, &dimensions);
        verify_arg!(dimensions, size.is_some());
        verify_arg!(buffer, buffer.len() >= size.unwrap_or(0));
        let mut frame = Frame::new();
        frame.pixel_type = pixel_type;
        frame.dimensions = dimensions;
        frame.buffer = Some(buffer);
        Ok(frame)
    }

    /// Creates a frame of the given type and shape with a freshly allocated,
    /// zero-initialized buffer.
    pub fn alloc(pixel_type: PixelType, dimensions: Vec<usize>) -> Result<Frame> {
        let size = frame_size(pixel_type, &dimensions)
            .ok_or_else(|| Error::invalid_arg("dimensions", "frame size overflows usize"))?;
        let buffer = FrameBuffer::allocate(size)?;
        Frame::with_buffer(pixel_type, dimensions, buffer)
    }

    /// Byte width of a single element (zero when untyped).
    #[inline]
    pub fn depth(&self) -> usize {
        self.pixel_type.depth()
    }

    /// Whether the element type is signed.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.pixel_type.is_signed()
    }

    /// Total payload size in bytes: `depth × product(dimensions)`.
    ///
    /// Zero for untyped frames, and for shapes whose product overflows
    /// `usize` (constructors reject those up front); callers are expected to
    /// check [`is_empty`](Frame::is_empty) rather than rely on failures.
    pub fn size(&self) -> usize {
        frame_size(self.pixel_type, &self.dimensions).unwrap_or(0)
    }

    /// Returns `true` when the frame carries no pixel data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.as_ref().is_none_or(|b| b.is_empty())
    }

    /// Width (first dimension) of a 2D frame.
    pub fn width(&self) -> Option<usize> {
        self.dimensions.first().copied()
    }

    /// Height (second dimension) of a 2D frame.
    pub fn height(&self) -> Option<usize> {
        self.dimensions.get(1).copied()
    }

    /// Returns the shared buffer, if any.
    pub fn buffer(&self) -> Option<&FrameBuffer> {
        self.buffer.as_ref()
    }

    /// Returns the shared buffer for mutation, if any.
    pub fn buffer_mut(&mut self) -> Option<&mut FrameBuffer> {
        self.buffer.as_mut()
    }

    /// Replaces the buffer reference.
    ///
    /// The previous buffer's share is released; handing back the buffer the
    /// frame already holds is a no-op thanks to shared ownership.
    pub fn set_buffer(&mut self, buffer: Option<FrameBuffer>) {
        self.buffer = buffer;
    }

    /// Releases the buffer reference and resets the frame to its untyped
    /// state: type `Undef`, frame number -1, dimensions cleared.
    pub fn release_buffer(&mut self) {
        self.buffer = None;
        self.pixel_type = PixelType::Undef;
        self.frame_number = -1;
        self.dimensions.clear();
    }

    /// Payload bytes, limited to [`size`](Frame::size). Empty when there is
    /// no buffer.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buffer {
            Some(buffer) => {
                let size = self.size().min(buffer.len());
                &buffer.as_slice()[..size]
            }
            None => &[],
        }
    }

    /// Mutable payload bytes, limited to [`size`](Frame::size).
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let size = frame_size(self.pixel_type, &self.dimensions).unwrap_or(0);
        match &mut self.buffer {
            Some(buffer) => {
                let size = size.min(buffer.len());
                &mut buffer.as_mut_slice()[..size]
            }
            None => &mut [],
        }
    }

    /// Payload interpreted as a slice of `T`.
    ///
    /// The payload size must be a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        bytemuck::cast_slice(self.as_bytes())
    }

    /// Payload interpreted as a mutable slice of `T`.
    #[inline]
    pub fn typed_data_mut<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        bytemuck::cast_slice_mut(self.as_bytes_mut())
    }

    /// Deep copy: metadata duplicated by value, payload copied into a fresh
    /// buffer of [`size`](Frame::size) bytes. A buffer-less frame deep copies
    /// to a buffer-less frame.
    pub fn copy(&self) -> Result<Frame> {
        let mut copied = self.metadata_copy(self.pixel_type);
        if self.buffer.is_some() {
            let bytes = self.as_bytes();
            let mut buffer = FrameBuffer::allocate(self.size())?;
            buffer.as_mut_slice()[..bytes.len()].copy_from_slice(bytes);
            copied.buffer = Some(buffer);
        }
        Ok(copied)
    }

    /// Returns a frame with the same metadata but a fresh, zero-initialized
    /// buffer, sized by the *new* type's depth and the existing dimensions.
    pub fn copy_header(&self, pixel_type: PixelType) -> Result<Frame> {
        let mut copied = self.metadata_copy(pixel_type);
        copied.buffer = Some(FrameBuffer::allocate(copied.size())?);
        Ok(copied)
    }

    fn metadata_copy(&self, pixel_type: PixelType) -> Frame {
        Frame {
            pixel_type,
            dimensions: self.dimensions.clone(),
            frame_number: self.frame_number,
            timestamp: self.timestamp,
            strip_count: self.strip_count,
            header: self.header.clone(),
            buffer: None,
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("type", &self.pixel_type)
            .field("dimensions", &self.dimensions)
            .field("frame_number", &self.frame_number)
            .field("timestamp", &self.timestamp)
            .field("header", &self.header)
            .field("buffer", &self.buffer)
            .finish()
    }
}

fn frame_size(pixel_type: PixelType, dimensions: &[usize]) -> Option<usize> {
    dimensions
        .iter()
        .try_fold(pixel_type.depth(), |size, &dim| size.checked_mul(dim))
}
