//! Element types
//!
//! An element is one cell of an array: `channels` values of a single numeric
//! [`Depth`]. The wire tag packs both into an `i32` using the same layout as
//! OpenCV's `CV_MAKETYPE`, so payloads written by image tooling that follows
//! that convention decode unchanged:
//!
//! ```text
//! tag = depth | ((channels - 1) << 3)
//! ```

use std::fmt;

/// Maximum number of channels per element
pub const MAX_CHANNELS: u8 = 4;

const DEPTH_MASK: i32 = 0b111;
const CHANNEL_SHIFT: i32 = 3;

/// Numeric representation of a single channel
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// Unsigned 8-bit
    U8 = 0,
    /// Signed 8-bit
    I8 = 1,
    /// Unsigned 16-bit
    U16 = 2,
    /// Signed 16-bit
    I16 = 3,
    /// Signed 32-bit
    I32 = 4,
    /// IEEE 754 single precision
    F32 = 5,
    /// IEEE 754 double precision
    F64 = 6,
    /// IEEE 754 half precision
    F16 = 7,
}

impl Depth {
    /// Decode a depth code
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::U8),
            1 => Some(Self::I8),
            2 => Some(Self::U16),
            3 => Some(Self::I16),
            4 => Some(Self::I32),
            5 => Some(Self::F32),
            6 => Some(Self::F64),
            7 => Some(Self::F16),
            _ => None,
        }
    }

    /// Size of one channel value in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Short name, e.g. `u8`
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::F16 => "f16",
        }
    }
}

/// Element type: channel count plus per-channel depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    depth: Depth,
    channels: u8,
}

impl ElementType {
    /// Single-channel unsigned 8-bit (grayscale)
    pub const U8C1: Self = Self::make(Depth::U8, 1);
    /// Three-channel unsigned 8-bit (BGR/RGB)
    pub const U8C3: Self = Self::make(Depth::U8, 3);
    /// Four-channel unsigned 8-bit (BGRA/RGBA)
    pub const U8C4: Self = Self::make(Depth::U8, 4);
    /// Single-channel unsigned 16-bit
    pub const U16C1: Self = Self::make(Depth::U16, 1);
    /// Single-channel signed 32-bit
    pub const I32C1: Self = Self::make(Depth::I32, 1);
    /// Single-channel 32-bit float
    pub const F32C1: Self = Self::make(Depth::F32, 1);
    /// Three-channel 32-bit float
    pub const F32C3: Self = Self::make(Depth::F32, 3);
    /// Single-channel 64-bit float
    pub const F64C1: Self = Self::make(Depth::F64, 1);

    const fn make(depth: Depth, channels: u8) -> Self {
        Self { depth, channels }
    }

    /// Create an element type, `None` if `channels` is outside `1..=MAX_CHANNELS`
    pub const fn new(depth: Depth, channels: u8) -> Option<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return None;
        }
        Some(Self::make(depth, channels))
    }

    /// Decode a wire tag
    pub const fn from_tag(tag: i32) -> Option<Self> {
        if tag < 0 {
            return None;
        }
        let channels = (tag >> CHANNEL_SHIFT) + 1;
        if channels > MAX_CHANNELS as i32 {
            return None;
        }
        match Depth::from_code(tag & DEPTH_MASK) {
            Some(depth) => Some(Self::make(depth, channels as u8)),
            None => None,
        }
    }

    /// Wire tag
    pub const fn tag(self) -> i32 {
        (self.depth as i32) | ((self.channels as i32 - 1) << CHANNEL_SHIFT)
    }

    /// Channel depth
    pub const fn depth(self) -> Depth {
        self.depth
    }

    /// Channels per element
    pub const fn channels(self) -> u8 {
        self.channels
    }

    /// Size of one element in bytes
    pub const fn size(self) -> usize {
        self.depth.size() * self.channels as usize
    }

    /// Every supported element type, ordered by tag
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_CHANNELS).flat_map(|channels| {
            (0..=DEPTH_MASK)
                .filter_map(Depth::from_code)
                .map(move |depth| Self::make(depth, channels))
        })
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.depth.name(), self.channels)
    }
}
