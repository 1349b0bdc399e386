/// Element type of a frame's pixels.
///
/// `Undef` marks a frame with no established type yet (e.g. freshly
/// constructed or released); all derived size queries report zero for it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    #[default]
    Undef,
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl PixelType {
    /// Byte width of a single element. Zero for `Undef`.
    pub fn depth(&self) -> usize {
        match self {
            PixelType::Undef => 0,
            PixelType::UInt8 | PixelType::Int8 => 1,
            PixelType::UInt16 | PixelType::Int16 => 2,
            PixelType::UInt32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::UInt64 | PixelType::Int64 | PixelType::Float64 => 8,
        }
    }

    /// Whether the element type is signed. `Undef` reports signed, matching
    /// the acquisition layer's convention for untyped frames.
    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            PixelType::UInt8 | PixelType::UInt16 | PixelType::UInt32 | PixelType::UInt64
        )
    }

}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelType::Undef => "Undef",
            PixelType::UInt8 => "UInt8",
            PixelType::Int8 => "Int8",
            PixelType::UInt16 => "UInt16",
            PixelType::Int16 => "Int16",
            PixelType::UInt32 => "UInt32",
            PixelType::Int32 => "Int32",
            PixelType::UInt64 => "UInt64",
            PixelType::Int64 => "Int64",
            PixelType::Float32 => "Float32",
            PixelType::Float64 => "Float64",
        };
        f.write_str(name)
    }
}
