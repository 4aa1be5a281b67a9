//! Binary codec for dense 2-D arrays
//!
//! This crate packs an [`ArrayValue`] (width, height, element type and raw
//! buffer) into a flat, self-describing byte sequence and reconstructs it
//! losslessly.
//!
//! # Wire format
//!
//! ```text
//! ┌──────────┬──────────┬──────────────┬──────────┬─────────────────────┐
//! │ width    │ height   │ element tag  │ size     │ body                │
//! │ u32 LE   │ u32 LE   │ i32 LE       │ u64 LE   │ `size` bytes        │
//! │ offset 0 │ offset 4 │ offset 8     │ offset 12│ offset 20           │
//! └──────────┴──────────┴──────────────┴──────────┴─────────────────────┘
//! ```
//!
//! All header integers are little-endian on every platform. The body is the
//! row-major element data, unpadded, and its length is fully determined by the
//! header, so no delimiters are needed and a payload can be embedded in a
//! larger envelope as-is.
//!
//! # Example
//!
//! ```
//! use matkv_codec::{decode, encode, ArrayValue, ElementType};
//!
//! let image = ArrayValue::filled(4, 3, ElementType::U8C3, 0x7f).unwrap();
//! let payload = encode(&image).unwrap();
//! assert_eq!(payload.header().size, 4 * 3 * 3);
//!
//! let decoded = decode(payload.as_bytes()).unwrap();
//! assert_eq!(decoded, image);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod codec;
pub mod element;
pub mod error;

pub use array::ArrayValue;
pub use codec::{decode, encode, EncodedPayload, PayloadHeader, HEADER_LEN};
pub use element::{Depth, ElementType, MAX_CHANNELS};
pub use error::{CodecError, CodecResult};
