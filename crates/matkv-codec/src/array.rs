//! In-memory array value

use crate::element::ElementType;
use crate::error::{CodecError, CodecResult};

/// Dense row-major 2-D array
///
/// `data.len()` must equal `width * height * element.size()`. [`ArrayValue::new`]
/// enforces this, and [`encode`](crate::encode) checks it again since the
/// fields are public.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayValue {
    /// Elements per row
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Element type
    pub element: ElementType,
    /// Raw element bytes
    pub data: Vec<u8>,
}

impl ArrayValue {
    /// Create an array from an existing buffer
    pub fn new(width: u32, height: u32, element: ElementType, data: Vec<u8>) -> CodecResult<Self> {
        let value = Self {
            width,
            height,
            element,
            data,
        };
        value.validate()?;
        Ok(value)
    }

    /// Create an array with every byte set to zero
    pub fn zeros(width: u32, height: u32, element: ElementType) -> CodecResult<Self> {
        Self::filled(width, height, element, 0)
    }

    /// Create an array with every byte set to `byte`
    pub fn filled(width: u32, height: u32, element: ElementType, byte: u8) -> CodecResult<Self> {
        let len = Self::expected_len(width, height, element).ok_or(CodecError::InvalidInput {
            expected: None,
            actual: 0,
        })?;
        Ok(Self {
            width,
            height,
            element,
            data: vec![byte; len],
        })
    }

    /// Buffer length implied by the dimensions, `None` on overflow
    pub fn expected_len(width: u32, height: u32, element: ElementType) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(element.size())
    }

    /// Check the buffer length against the dimensions
    pub fn validate(&self) -> CodecResult<()> {
        let expected = Self::expected_len(self.width, self.height, self.element);
        if expected == Some(self.data.len()) {
            Ok(())
        } else {
            Err(CodecError::InvalidInput {
                expected,
                actual: self.data.len(),
            })
        }
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Buffer length in bytes
    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes of row `y`, `None` past the last row
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = (self.width as usize).checked_mul(self.element.size())?;
        let start = (y as usize).checked_mul(stride)?;
        self.data.get(start..start.checked_add(stride)?)
    }
}
