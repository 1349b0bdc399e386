//! Axis-flip kernels over 2D single-strip frames.
//!
//! Every kernel verifies the flip precondition first and reports a structured
//! error without touching any byte on violation: the input must have exactly
//! two dimensions (`[width, height]`), a single strip, an element depth of
//! 1, 2, 4 or 8 bytes and a buffer large enough for its payload.
//!
//! Element order is reversed with width-correct lanes: the depth tag selects
//! the u8/u16/u32/u64 instantiation of a generic kernel, replacing the
//! pointer-cast dispatch of older acquisition stacks.

use frameflow_common::{Result, error::Error, verify_arg};
use frameflow_frame::Frame;

struct Shape {
    width: usize,
    height: usize,
    depth: usize,
}

impl Shape {
    /// A zero-area frame; every flip is a no-op on it.
    fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn row_bytes(&self) -> usize {
        self.width * self.depth
    }
}

/// Checks that `frame` satisfies the flip precondition.
///
/// Exposed so that stage wrappers can validate before deciding on an
/// in-place or copy path.
pub fn verify_flippable(frame: &Frame) -> Result<()> {
    checked_shape(frame).map(|_| ())
}

fn checked_shape(frame: &Frame) -> Result<Shape> {
    verify_arg!(frame, frame.dimensions.len() == 2);
    verify_arg!(frame, frame.strip_count == 1);
    let depth = frame.depth();
    if !matches!(depth, 1 | 2 | 4 | 8) {
        return Err(Error::unsupported_depth(depth));
    }
    verify_arg!(frame, frame.buffer().is_some_and(|b| b.len() >= frame.size()));
    Ok(Shape {
        width: frame.dimensions[0],
        height: frame.dimensions[1],
        depth,
    })
}

fn checked_pair(src: &Frame, dst: &Frame) -> Result<Shape> {
    let shape = checked_shape(src)?;
    let dst_shape = checked_shape(dst)?;
    verify_arg!(dst, dst.dimensions == src.dimensions);
    verify_arg!(dst, dst_shape.depth == shape.depth);
    // Mapped regions may window the same backing memory at different
    // offsets, so compare the full byte ranges, not just the starts.
    let aliased = match (src.buffer(), dst.buffer()) {
        (Some(a), Some(b)) => {
            let a_start = a.as_ptr() as usize;
            let a_end = a_start + a.len();
            let b_start = b.as_ptr() as usize;
            let b_end = b_start + b.len();
            a_start < b_end && b_start < a_end
        }
        _ => false,
    };
    verify_arg!(dst, !aliased);
    Ok(shape)
}

/// Reverses the row order of `frame` in place.
pub fn flip_y_in_place(frame: &mut Frame) -> Result<()> {
    let shape = checked_shape(frame)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    let row = shape.row_bytes();
    let bytes = frame.as_bytes_mut();
    for i in 0..shape.height / 2 {
        let j = shape.height - 1 - i;
        let (head, tail) = bytes.split_at_mut(j * row);
        head[i * row..(i + 1) * row].swap_with_slice(&mut tail[..row]);
    }
    Ok(())
}

/// Writes row `i` of `src` to row `height - 1 - i` of `dst`.
pub fn flip_y(src: &Frame, dst: &mut Frame) -> Result<()> {
    let shape = checked_pair(src, dst)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    let row = shape.row_bytes();
    let src_rows = src.as_bytes().chunks_exact(row);
    let dst_rows = dst.as_bytes_mut().chunks_exact_mut(row).rev();
    for (src_row, dst_row) in src_rows.zip(dst_rows) {
        dst_row.copy_from_slice(src_row);
    }
    Ok(())
}

/// Reverses the element order within each row of `frame`, in place.
pub fn flip_x_in_place(frame: &mut Frame) -> Result<()> {
    let shape = checked_shape(frame)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    match shape.depth {
        1 => mirror_rows_in_place(frame.typed_data_mut::<u8>(), shape.width),
        2 => mirror_rows_in_place(frame.typed_data_mut::<u16>(), shape.width),
        4 => mirror_rows_in_place(frame.typed_data_mut::<u32>(), shape.width),
        8 => mirror_rows_in_place(frame.typed_data_mut::<u64>(), shape.width),
        depth => return Err(Error::unsupported_depth(depth)),
    }
    Ok(())
}

/// Mirrors each row of `src` into the corresponding row of `dst`.
pub fn flip_x(src: &Frame, dst: &mut Frame) -> Result<()> {
    let shape = checked_pair(src, dst)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    match shape.depth {
        1 => mirror_rows(src.typed_data::<u8>(), dst.typed_data_mut(), shape.width),
        2 => mirror_rows(src.typed_data::<u16>(), dst.typed_data_mut(), shape.width),
        4 => mirror_rows(src.typed_data::<u32>(), dst.typed_data_mut(), shape.width),
        8 => mirror_rows(src.typed_data::<u64>(), dst.typed_data_mut(), shape.width),
        depth => return Err(Error::unsupported_depth(depth)),
    }
    Ok(())
}

/// Reverses the whole `width × height` element sequence of `frame` in place
/// (a 180° rotation).
pub fn flip_all_in_place(frame: &mut Frame) -> Result<()> {
    let shape = checked_shape(frame)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    match shape.depth {
        1 => frame.typed_data_mut::<u8>().reverse(),
        2 => frame.typed_data_mut::<u16>().reverse(),
        4 => frame.typed_data_mut::<u32>().reverse(),
        8 => frame.typed_data_mut::<u64>().reverse(),
        depth => return Err(Error::unsupported_depth(depth)),
    }
    Ok(())
}

/// Writes element `k` of `src` to element `width × height - 1 - k` of `dst`.
pub fn flip_all(src: &Frame, dst: &mut Frame) -> Result<()> {
    let shape = checked_pair(src, dst)?;
    if shape.is_degenerate() {
        return Ok(());
    }
    match shape.depth {
        1 => reverse_into(src.typed_data::<u8>(), dst.typed_data_mut()),
        2 => reverse_into(src.typed_data::<u16>(), dst.typed_data_mut()),
        4 => reverse_into(src.typed_data::<u32>(), dst.typed_data_mut()),
        8 => reverse_into(src.typed_data::<u64>(), dst.typed_data_mut()),
        depth => return Err(Error::unsupported_depth(depth)),
    }
    Ok(())
}

fn mirror_rows_in_place<T>(data: &mut [T], width: usize) {
    for row in data.chunks_exact_mut(width) {
        row.reverse();
    }
}

fn mirror_rows<T: Copy>(src: &[T], dst: &mut [T], width: usize) {
    let src_rows = src.chunks_exact(width);
    let dst_rows = dst.chunks_exact_mut(width);
    for (src_row, dst_row) in src_rows.zip(dst_rows) {
        for (s, d) in src_row.iter().zip(dst_row.iter_mut().rev()) {
            *d = *s;
        }
    }
}

fn reverse_into<T: Copy>(src: &[T], dst: &mut [T]) {
    for (s, d) in src.iter().zip(dst.iter_mut().rev()) {
        *d = *s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameflow_bytes::FrameBuffer;
    use frameflow_common::error::ErrorKind;
    use frameflow_frame::PixelType;

    fn u8_frame(width: usize, height: usize, data: &[u8]) -> Frame {
        let buffer = FrameBuffer::copy_from_slice(data).unwrap();
        Frame::with_buffer(PixelType::UInt8, vec![width, height], buffer).unwrap()
    }

    #[test]
    fn test_flip_y_in_place_4x2() {
        let mut frame = u8_frame(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        flip_y_in_place(&mut frame).unwrap();
        assert_eq!(frame.as_bytes(), &[5, 6, 7, 8, 1, 2, 3, 4]);
    }

    #[test]
    fn test_flip_x_in_place_4x2() {
        let mut frame = u8_frame(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        flip_x_in_place(&mut frame).unwrap();
        assert_eq!(frame.as_bytes(), &[4, 3, 2, 1, 8, 7, 6, 5]);
    }

    #[test]
    fn test_flip_all_in_place_4x2() {
        let mut frame = u8_frame(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        flip_all_in_place(&mut frame).unwrap();
        assert_eq!(frame.as_bytes(), &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_flip_y_odd_height_keeps_middle_row() {
        let mut frame = u8_frame(2, 3, &[1, 2, 3, 4, 5, 6]);
        flip_y_in_place(&mut frame).unwrap();
        assert_eq!(frame.as_bytes(), &[5, 6, 3, 4, 1, 2]);
    }

    #[test]
    fn test_flip_x_odd_width_keeps_middle_column() {
        let mut frame = u8_frame(3, 2, &[1, 2, 3, 4, 5, 6]);
        flip_x_in_place(&mut frame).unwrap();
        assert_eq!(frame.as_bytes(), &[3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_out_of_place_matches_in_place() {
        for (width, height) in [(4usize, 2usize), (5, 3), (1, 7), (8, 1)] {
            let data: Vec<u16> = (0..width * height).map(|_| fastrand::u16(..)).collect();
            let mut src = Frame::alloc(PixelType::UInt16, vec![width, height]).unwrap();
            src.typed_data_mut::<u16>().copy_from_slice(&data);

            type Pair = (
                fn(&mut Frame) -> Result<()>,
                fn(&Frame, &mut Frame) -> Result<()>,
            );
            let kernels: [Pair; 3] = [
                (flip_x_in_place, flip_x),
                (flip_y_in_place, flip_y),
                (flip_all_in_place, flip_all),
            ];
            for (in_place, out_of_place) in kernels {
                let mut dst = src.copy_header(src.pixel_type).unwrap();
                out_of_place(&src, &mut dst).unwrap();

                let mut mutated = src.copy().unwrap();
                in_place(&mut mutated).unwrap();
                assert_eq!(mutated.as_bytes(), dst.as_bytes());
            }
        }
    }

    #[test]
    fn test_double_flip_round_trips() {
        for pixel_type in [
            PixelType::UInt8,
            PixelType::UInt16,
            PixelType::UInt32,
            PixelType::UInt64,
        ] {
            let mut frame = Frame::alloc(pixel_type, vec![5, 4]).unwrap();
            for b in frame.as_bytes_mut() {
                *b = fastrand::u8(..);
            }
            let original = frame.as_bytes().to_vec();

            for kernel in [flip_x_in_place, flip_y_in_place, flip_all_in_place] {
                kernel(&mut frame).unwrap();
                assert_ne!(frame.as_bytes(), &original[..]);
                kernel(&mut frame).unwrap();
                assert_eq!(frame.as_bytes(), &original[..]);
            }
        }
    }

    #[test]
    fn test_x_then_y_equals_all() {
        let mut a = Frame::alloc(PixelType::UInt32, vec![7, 5]).unwrap();
        for v in a.typed_data_mut::<u32>() {
            *v = fastrand::u32(..);
        }
        let mut b = a.copy().unwrap();
        let mut c = a.copy().unwrap();

        flip_x_in_place(&mut a).unwrap();
        flip_y_in_place(&mut a).unwrap();

        flip_y_in_place(&mut b).unwrap();
        flip_x_in_place(&mut b).unwrap();

        flip_all_in_place(&mut c).unwrap();

        assert_eq!(a.as_bytes(), c.as_bytes());
        assert_eq!(b.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_three_dimensions_rejected_untouched() {
        let buffer = FrameBuffer::copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let mut frame = Frame::with_buffer(PixelType::UInt8, vec![2, 2, 2], buffer).unwrap();
        let err = flip_x_in_place(&mut frame).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(frame.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_multi_strip_rejected() {
        let mut frame = u8_frame(4, 2, &[0; 8]);
        frame.strip_count = 2;
        assert!(verify_flippable(&frame).is_err());
    }

    #[test]
    fn test_undef_depth_rejected() {
        let buffer = FrameBuffer::allocate(8).unwrap();
        let mut frame = Frame::with_buffer(PixelType::Undef, vec![4, 2], buffer).unwrap();
        let err = flip_y_in_place(&mut frame).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedElementDepth { depth: 0 }
        ));
    }

    #[test]
    fn test_missing_buffer_rejected() {
        let mut frame = Frame::new();
        frame.pixel_type = PixelType::UInt8;
        frame.dimensions = vec![4, 2];
        assert!(flip_all_in_place(&mut frame).is_err());
    }

    #[test]
    fn test_aliased_out_of_place_rejected() {
        let src = u8_frame(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut dst = src.clone();
        assert!(flip_y(&src, &mut dst).is_err());
    }

    #[test]
    fn test_overlapping_mapped_windows_rejected() {
        use frameflow_bytes::{MemoryAllocation, MemoryRegion};
        use std::sync::Arc;

        #[repr(align(16))]
        struct Backing([u8; 64]);

        struct WindowRegion {
            backing: Arc<Backing>,
            offset: usize,
            len: usize,
        }

        unsafe impl MemoryRegion for WindowRegion {
            fn memory(&self) -> MemoryAllocation {
                MemoryAllocation {
                    ptr: unsafe { self.backing.0.as_ptr().add(self.offset) as *mut u8 },
                    len: self.len,
                }
            }
        }

        let backing = Arc::new(Backing([0u8; 64]));
        let window = |offset| {
            FrameBuffer::from_region(Arc::new(WindowRegion {
                backing: backing.clone(),
                offset,
                len: 32,
            }))
            .unwrap()
        };

        // Windows at offsets 0 and 16 share bytes 16..32 while starting at
        // distinct addresses.
        let src = Frame::with_buffer(PixelType::UInt8, vec![4, 2], window(0)).unwrap();
        let mut dst = Frame::with_buffer(PixelType::UInt8, vec![4, 2], window(16)).unwrap();
        assert!(flip_x(&src, &mut dst).is_err());

        // A disjoint window at offset 32 is a valid destination.
        let mut disjoint = Frame::with_buffer(PixelType::UInt8, vec![4, 2], window(32)).unwrap();
        flip_x(&src, &mut disjoint).unwrap();
    }

    #[test]
    fn test_mismatched_destination_rejected() {
        let src = u8_frame(4, 2, &[0; 8]);
        let mut dst = Frame::alloc(PixelType::UInt8, vec![2, 4]).unwrap();
        assert!(flip_x(&src, &mut dst).is_err());
    }

    #[test]
    fn test_zero_area_is_noop() {
        let mut frame = Frame::alloc(PixelType::UInt16, vec![0, 4]).unwrap();
        flip_x_in_place(&mut frame).unwrap();
        flip_y_in_place(&mut frame).unwrap();
        flip_all_in_place(&mut frame).unwrap();
    }
}
