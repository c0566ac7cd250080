//! Storage access for posting files.
//!
//! Posting files are written once, sealed, and then only read. Readers fetch the
//! byte range a lexicon pointer names through [`ReadAt`], decode it, and drop the
//! buffer; no cursor state is shared between queries.
//!
//! Files that support positional reads ([`FileReader`]) serve any number of query
//! threads through one handle. A [`SeekingFileReader`] has a single cursor, so each
//! seek plus buffer fill runs under a lock owned by that file alone.

use std::{io, ops::Range, sync::Arc};

pub mod file;
pub mod memory;

pub use file::{FileReader, FileWriter, SeekingFileReader};

/// Random access to an immutable byte sequence.
pub trait ReadAt: Send + Sync + 'static {
    fn size(&self) -> io::Result<u64>;

    /// Reads `range`, truncated at the end of the data. A range starting past the
    /// end yields an empty buffer.
    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>>;

    /// Reads exactly `range`.
    ///
    /// A short read means a posting file is shorter than the pointers recorded for
    /// it, and fails with `UnexpectedEof`.
    fn read_exact_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let expected = range.end.saturating_sub(range.start);
        let buf = self.read_at(range)?;
        if buf.len() as u64 != expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("posting data ends after {} of {expected} bytes", buf.len()),
            ));
        }
        Ok(buf)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for Arc<T> {
    fn size(&self) -> io::Result<u64> {
        self.as_ref().size()
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        self.as_ref().read_at(range)
    }
}

/// Append-only output that becomes readable once sealed.
pub trait SealingWrite: Send {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flushes and commits everything written. No writes are accepted afterwards.
    fn seal(&mut self) -> io::Result<()>;

    /// Bytes written so far.
    fn position(&self) -> u64;
}

/// Clamps `range` to data of `size` bytes.
pub(crate) fn clamp_range(size: u64, range: Range<u64>) -> io::Result<Range<u64>> {
    if range.end < range.start {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("inverted read range {}..{}", range.start, range.end),
        ));
    }
    let start = range.start.min(size);
    Ok(start..range.end.min(size))
}
