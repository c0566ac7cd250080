//! In-memory posting storage, used for freshly built and fully loaded indexes.

use std::{io, ops::Range, sync::Arc};

use crate::{ReadAt, SealingWrite, clamp_range};

impl ReadAt for Vec<u8> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let range = clamp_range(self.len() as u64, range)?;
        Ok(self[range.start as usize..range.end as usize].to_vec())
    }
}

impl SealingWrite for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    fn seal(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn position(&self) -> u64 {
        self.len() as u64
    }
}

/// Shares a completed posting buffer between readers.
pub fn shared_buffer(data: Vec<u8>) -> Arc<dyn ReadAt> {
    Arc::new(data)
}
