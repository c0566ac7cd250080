//! Bit-level and integer codec layer of the posting format.
//!
//! - [`bit_io`]: MSB-first bit writer/reader with unary, gamma, binary and
//!   variable-byte primitives; used directly by the bit posting format.
//! - [`codecs`]: self-delimiting block codecs (`unary`, `gamma`, `vbyte`, `pfor`)
//!   selected by name per posting structure; used by the chunked posting format.
//!
//! ```rust
//! use quarry_compression::{BitReader, BitWriter, create_codec};
//!
//! let codec = create_codec("pfor").unwrap();
//! let mut writer = BitWriter::new();
//! codec.encode(&[1, 5, 2, 1 << 21], &mut writer).unwrap();
//! let bytes = writer.into_bytes();
//!
//! let mut decoded = vec![0u32; 4];
//! codec.decode(&mut BitReader::new(&bytes), &mut decoded, 4).unwrap();
//! assert_eq!(decoded, [1, 5, 2, 1 << 21]);
//! ```

pub mod bit_io;
pub mod codecs;

pub use bit_io::{BitPosition, BitReader, BitWriter};
pub use codecs::{CodecKind, DEFAULT_CHUNK_SIZE, IntegerCodec, create_codec};
