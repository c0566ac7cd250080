//! Posting files on the local file system.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Seek, SeekFrom, Write},
    ops::Range,
    path::Path,
    sync::{Mutex, PoisonError},
};

use crate::{ReadAt, SealingWrite, clamp_range};

/// Reads a posting file with positional reads, so concurrent queries share one
/// handle without coordination.
pub struct FileReader {
    file: File,
    size: u64,
}

impl FileReader {
    pub fn new(file: File) -> io::Result<FileReader> {
        let size = file.metadata()?.len();
        Ok(FileReader { file, size })
    }

    pub fn open(path: impl AsRef<Path>) -> io::Result<FileReader> {
        FileReader::new(File::open(path)?)
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let range = clamp_range(self.size, range)?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        if !buf.is_empty() {
            read_exact_at(&self.file, range.start, &mut buf)?;
        }
        Ok(buf)
    }
}

/// Reads a posting file through its single cursor.
///
/// The seek and the buffer fill form one unit under a mutex owned by this file.
/// Decoding the returned bytes happens after the lock is released.
pub struct SeekingFileReader {
    file: Mutex<File>,
    size: u64,
}

impl SeekingFileReader {
    pub fn new(file: File) -> io::Result<SeekingFileReader> {
        let size = file.metadata()?.len();
        Ok(SeekingFileReader {
            file: Mutex::new(file),
            size,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> io::Result<SeekingFileReader> {
        SeekingFileReader::new(File::open(path)?)
    }
}

impl ReadAt for SeekingFileReader {
    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let range = clamp_range(self.size, range)?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        if !buf.is_empty() {
            // A failed read leaves the cursor somewhere arbitrary; every read seeks
            // first, so the poisoned state carries nothing over.
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            file.seek(SeekFrom::Start(range.start))?;
            file.read_exact(&mut buf)?;
        }
        Ok(buf)
    }
}

/// Writes a new posting file. Refuses to overwrite an existing one.
pub struct FileWriter {
    file: Option<BufWriter<File>>,
    position: u64,
}

impl FileWriter {
    pub fn new(file: File) -> FileWriter {
        FileWriter {
            file: Some(BufWriter::new(file)),
            position: 0,
        }
    }

    pub fn create(path: impl AsRef<Path>) -> io::Result<FileWriter> {
        Ok(FileWriter::new(File::create_new(path)?))
    }

    fn sealed() -> io::Error {
        io::Error::other("posting file is already sealed")
    }
}

impl SealingWrite for FileWriter {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(FileWriter::sealed)?
            .write_all(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn seal(&mut self) -> io::Result<()> {
        let file = self.file.take().ok_or_else(FileWriter::sealed)?;
        let file = file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, pos: u64, buf: &mut [u8]) -> io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.read_exact_at(buf, pos)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut pos: u64, mut buf: &mut [u8]) -> io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        let n = file.seek_read(buf, pos)?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf = &mut buf[n..];
        pos += n as u64;
    }
    Ok(())
}
