//! The flip pipeline stage: mode selection over the [`crate::flip`] kernels.

use frameflow_common::Result;
use frameflow_frame::Frame;

use crate::flip;

/// Axis selection for [`FlipStage`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FlipMode {
    /// Pass frames through unchanged (copy mode still duplicates the bytes).
    #[default]
    None,
    /// Reverse element order within each row.
    X,
    /// Reverse the row order.
    Y,
    /// Reverse the whole element sequence (180° rotation).
    Both,
}

/// A stateful operator applying one of the axis-flip kernels to each frame.
///
/// The stage either mutates the input's buffer in place (returning the same
/// frame, buffer identity preserved) or produces a new frame allocated via
/// [`Frame::copy_header`]. Precondition violations leave the input untouched
/// and surface as an error for the caller to decide on.
#[derive(Debug, Default, Clone)]
pub struct FlipStage {
    mode: FlipMode,
    in_place: bool,
}

impl FlipStage {
    /// Creates a stage with mode `None`, producing new output frames.
    pub fn new() -> FlipStage {
        FlipStage::default()
    }

    /// Creates a stage with the given mode and processing flavor.
    pub fn with_mode(mode: FlipMode, in_place: bool) -> FlipStage {
        FlipStage { mode, in_place }
    }

    /// Currently selected flip mode.
    pub fn mode(&self) -> FlipMode {
        self.mode
    }

    /// Selects the flip mode for subsequent frames.
    pub fn set_mode(&mut self, mode: FlipMode) {
        self.mode = mode;
    }

    /// Whether frames are processed destructively in their own buffer.
    pub fn in_place(&self) -> bool {
        self.in_place
    }

    /// Switches between in-place processing and producing new output frames.
    pub fn set_in_place(&mut self, in_place: bool) {
        self.in_place = in_place;
    }

    /// Applies the selected kernel to `input`.
    ///
    /// Frames without pixel data pass through unchanged. Otherwise the flip
    /// precondition (2D, single strip, supported depth) is verified up front;
    /// on violation nothing is mutated and the error is returned.
    pub fn process(&self, mut input: Frame) -> Result<Frame> {
        if input.is_empty() {
            return Ok(input);
        }
        flip::verify_flippable(&input)?;
        if self.in_place {
            match self.mode {
                FlipMode::None => {}
                FlipMode::X => flip::flip_x_in_place(&mut input)?,
                FlipMode::Y => flip::flip_y_in_place(&mut input)?,
                FlipMode::Both => flip::flip_all_in_place(&mut input)?,
            }
            Ok(input)
        } else {
            let mut output = input.copy_header(input.pixel_type)?;
            match self.mode {
                FlipMode::None => output.as_bytes_mut().copy_from_slice(input.as_bytes()),
                FlipMode::X => flip::flip_x(&input, &mut output)?,
                FlipMode::Y => flip::flip_y(&input, &mut output)?,
                FlipMode::Both => flip::flip_all(&input, &mut output)?,
            }
            Ok(output)
        }
    }
}
