//! Encode and decode

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::array::ArrayValue;
use crate::element::ElementType;
use crate::error::{CodecError, CodecResult};

/// Header length in bytes
pub const HEADER_LEN: usize = 20;

/// Fixed payload header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    /// Elements per row
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Raw element type tag
    pub element_tag: i32,
    /// Body length in bytes
    pub size: u64,
}

impl PayloadHeader {
    /// Encode header to bytes
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.width);
        buf.put_u32_le(self.height);
        buf.put_i32_le(self.element_tag);
        buf.put_u64_le(self.size);
    }

    /// Decode header from bytes
    pub fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        if buf.remaining() < HEADER_LEN {
            return Err(CodecError::TruncatedHeader {
                len: buf.remaining(),
            });
        }

        Ok(Self {
            width: buf.get_u32_le(),
            height: buf.get_u32_le(),
            element_tag: buf.get_i32_le(),
            size: buf.get_u64_le(),
        })
    }

    /// Resolve the element type tag
    pub fn element(&self) -> CodecResult<ElementType> {
        ElementType::from_tag(self.element_tag)
            .ok_or(CodecError::UnknownElementType(self.element_tag))
    }

    /// Check the declared size against the dimensions
    pub fn check_size(&self, element: ElementType) -> CodecResult<()> {
        let expected = ArrayValue::expected_len(self.width, self.height, element).ok_or(
            CodecError::DimensionOverflow {
                width: self.width,
                height: self.height,
                element_size: element.size(),
            },
        )? as u64;

        if expected != self.size {
            return Err(CodecError::SizeMismatch {
                width: self.width,
                height: self.height,
                element_size: element.size(),
                declared: self.size,
                expected,
            });
        }
        Ok(())
    }
}

/// Encoded array: header followed by the raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    header: PayloadHeader,
    bytes: Bytes,
}

impl EncodedPayload {
    /// Parsed header
    pub fn header(&self) -> &PayloadHeader {
        &self.header
    }

    /// Body bytes following the header
    pub fn body(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Whole payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Total length including the header
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false, a payload carries at least its header
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for EncodedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<EncodedPayload> for Bytes {
    fn from(payload: EncodedPayload) -> Self {
        payload.bytes
    }
}

/// Encode an array
///
/// The `size` field is taken from the buffer length, which must agree with
/// the dimensions; otherwise this fails with [`CodecError::InvalidInput`].
pub fn encode(value: &ArrayValue) -> CodecResult<EncodedPayload> {
    value.validate()?;

    let header = PayloadHeader {
        width: value.width,
        height: value.height,
        element_tag: value.element.tag(),
        size: value.data.len() as u64,
    };

    let mut buf = BytesMut::with_capacity(HEADER_LEN + value.data.len());
    header.encode(&mut buf);
    buf.put_slice(&value.data);

    Ok(EncodedPayload {
        header,
        bytes: buf.freeze(),
    })
}

/// Decode an array
///
/// The payload must hold exactly one header and a body of the declared size.
/// The returned buffer is a copy and never shares storage with `payload`.
pub fn decode(payload: &[u8]) -> CodecResult<ArrayValue> {
    let mut buf = payload;
    let header = PayloadHeader::decode(&mut buf)?;
    let element = header.element()?;
    header.check_size(element)?;

    if buf.len() as u64 != header.size {
        return Err(CodecError::BodyLength {
            declared: header.size,
            actual: buf.len(),
        });
    }

    Ok(ArrayValue {
        width: header.width,
        height: header.height,
        element,
        data: buf.to_vec(),
    })
}
