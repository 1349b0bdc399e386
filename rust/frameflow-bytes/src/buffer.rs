use std::alloc::Layout;
use std::sync::Arc;

use frameflow_common::{Result, error::Error, verify_arg};

/// Alignment guaranteed for self-allocated frame buffers, in bytes.
///
/// Detector frame rows are handed to SIMD-friendly consumers; 16 bytes is the
/// contract inherited from the acquisition layer.
pub const BUFFER_ALIGNMENT: usize = 16;

/// Kind of memory backing a [`FrameBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The buffer allocated the region itself and frees it when the last
    /// handle drops.
    Owned,
    /// The region belongs to an external mapping (e.g. a driver-provided
    /// frame slot) and is never freed by the buffer.
    Mapped,
}

/// A contiguous block of memory exposed by a [`MemoryRegion`] implementation.
#[derive(Debug, Clone)]
pub struct MemoryAllocation {
    /// Pointer to the start of the region.
    pub ptr: *mut u8,
    /// Length of the region in bytes.
    pub len: usize,
}

/// Trait for types that own memory regions wrapped by mapped [`FrameBuffer`]s.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - The region returned by `memory()` stays valid, and stable in address,
///   for the entire lifetime of the owner.
/// - The region is readable and writable for its full reported length.
pub unsafe trait MemoryRegion {
    /// Returns the owned memory region.
    fn memory(&self) -> MemoryAllocation;
}

/// A shared handle to a contiguous, fixed-size byte region holding one frame.
///
/// Cloning a `FrameBuffer` shares the underlying region; the atomic reference
/// count replaces the original pipeline's manual `ref()`/`unref()` pairing.
/// Self-allocated regions are aligned to [`BUFFER_ALIGNMENT`] and freed exactly
/// once, when the last owned handle drops.
///
/// Contents are shared: a write through any handle is visible to every holder.
/// Keeping at most one mutator active at a time is a caller-level invariant;
/// only the reference count is synchronized, not the data.
#[derive(Clone)]
pub struct FrameBuffer {
    ptr: *mut u8,
    len: usize,
    owner: BufOwner,
}

unsafe impl Send for FrameBuffer {}

unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    /// Allocates a zero-initialized, 16-byte-aligned buffer of `size` bytes.
    ///
    /// Allocation failure is non-fatal and reported as
    /// [`ErrorKind::AllocationFailed`](frameflow_common::error::ErrorKind::AllocationFailed);
    /// no buffer object exists in that case.
    pub fn allocate(size: usize) -> Result<FrameBuffer> {
        let layout = Layout::from_size_align(size.max(1), BUFFER_ALIGNMENT)
            .map_err(|_| Error::invalid_arg("size", "allocation size overflows a layout"))?;
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(Error::allocation_failed(size));
        }
        let region = Arc::new(OwnedRegion { ptr, layout });
        Ok(FrameBuffer {
            ptr,
            len: size,
            owner: BufOwner::Owned(region),
        })
    }

    /// Allocates a buffer containing a copy of the provided slice.
    pub fn copy_from_slice(data: &[u8]) -> Result<FrameBuffer> {
        let mut buf = Self::allocate(data.len())?;
        buf.as_mut_slice().copy_from_slice(data);
        Ok(buf)
    }

    /// Wraps an externally mapped memory region.
    ///
    /// The resulting buffer has [`Ownership::Mapped`]: the region is released
    /// by its owner, never by the buffer.
    ///
    /// The region start must be aligned to [`BUFFER_ALIGNMENT`]; typed views
    /// over frame payloads rely on it. A misaligned region is rejected as
    /// `InvalidArgument`.
    pub fn from_region(region: Arc<dyn MemoryRegion + Send + Sync + 'static>) -> Result<FrameBuffer> {
        let MemoryAllocation { ptr, len } = region.memory();
        verify_arg!(region, is_aligned(ptr, BUFFER_ALIGNMENT));
        Ok(FrameBuffer {
            ptr,
            len,
            owner: BufOwner::Mapped(region),
        })
    }

    /// Returns the length of the buffer in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the kind of memory backing this buffer.
    pub fn ownership(&self) -> Ownership {
        match self.owner {
            BufOwner::Owned(_) => Ownership::Owned,
            BufOwner::Mapped(_) => Ownership::Mapped,
        }
    }

    /// Returns the number of handles currently sharing the region.
    pub fn ref_count(&self) -> usize {
        match &self.owner {
            BufOwner::Owned(region) => Arc::strong_count(region),
            BufOwner::Mapped(region) => Arc::strong_count(region),
        }
    }

    /// Returns a raw pointer to the start of the region.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Returns a mutable raw pointer to the start of the region.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    /// Returns the buffer contents as a byte slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Returns the buffer contents as a mutable byte slice.
    ///
    /// The region is shared among all clones of this handle; the caller must
    /// ensure no other holder accesses the contents for the duration of the
    /// borrow.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// Checks whether the region start is aligned to `alignment`.
    pub fn is_aligned(&self, alignment: usize) -> bool {
        is_aligned(self.ptr, alignment)
    }
}

impl FrameBuffer {
    /// Returns the contents as a slice of `T` values.
    ///
    /// Relies on the caller to ensure the underlying bytes are valid for `T`;
    /// the buffer length must be a multiple of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Returns the contents as a mutable slice of `T` values.
    #[inline]
    pub fn typed_data_mut<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        bytemuck::cast_slice_mut(self.as_mut_slice())
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("owner", &self.ownership())
            .field("refcount", &self.ref_count())
            .field("data", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

#[derive(Clone)]
enum BufOwner {
    Owned(Arc<OwnedRegion>),
    Mapped(Arc<dyn MemoryRegion + Send + Sync + 'static>),
}

/// A self-allocated aligned region, deallocated exactly once on drop.
struct OwnedRegion {
    ptr: *mut u8,
    layout: Layout,
}

unsafe impl Send for OwnedRegion {}

unsafe impl Sync for OwnedRegion {}

impl Drop for OwnedRegion {
    fn drop(&mut self) {
        unsafe { std::alloc::dealloc(self.ptr, self.layout) };
    }
}

#[inline]
fn is_aligned(ptr: *const u8, alignment: usize) -> bool {
    alignment.is_power_of_two() && (ptr as usize) & (alignment - 1) == 0
}
