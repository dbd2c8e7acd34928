use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use crate::ContentResult;

/// Sequential little-endian reads over a seekable byte source.
pub struct BinaryReader<R> {
    inner: R,
    length: u64,
}

impl BinaryReader<BufReader<File>> {
    /// Open a file for reading
    pub fn open(path: &Path) -> ContentResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<'a> BinaryReader<Cursor<&'a [u8]>> {
    /// Read from an in-memory slice
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self {
            length: bytes.len() as _,
            inner: Cursor::new(bytes),
        }
    }
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Wrap a seekable source. The source is rewound to its start.
    pub fn new(mut inner: R) -> ContentResult<Self> {
        let length = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, length })
    }

    /// Total length of the source in bytes
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Current read position
    pub fn position(&mut self) -> ContentResult<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Move the read position to an absolute offset
    pub fn seek(&mut self, position: u64) -> ContentResult<()> {
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Bytes left between the read position and the end of the source
    pub fn remaining(&mut self) -> ContentResult<u64> {
        let position = self.position()?;
        Ok(self.length.saturating_sub(position))
    }

    pub fn read_byte(&mut self) -> ContentResult<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Read exactly `count` bytes, failing if the source ends first
    pub fn read_bytes(&mut self, count: usize) -> ContentResult<Vec<u8>> {
        let mut buf = vec![0; count];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read everything from the current position to the end
    pub fn read_to_end(&mut self) -> ContentResult<Vec<u8>> {
        let remaining = self.remaining()?;
        self.read_bytes(remaining as _)
    }

    pub fn read_u16(&mut self) -> ContentResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> ContentResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> ContentResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> ContentResult<[u8; N]> {
        let mut buf = [0; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_sequential_reads() {
        let mut bytes = vec![7u8];
        bytes.extend_from_slice(&513u16.to_le_bytes());
        bytes.extend_from_slice(&70_000u32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let mut reader = BinaryReader::from_slice(&bytes);
        assert_eq!(reader.length(), 11);
        assert_eq!(reader.read_byte().unwrap(), 7);
        assert_eq!(reader.read_u16().unwrap(), 513);
        assert_eq!(reader.read_u32().unwrap(), 70_000);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.position().unwrap(), 11);
        assert_eq!(reader.remaining().unwrap(), 0);
    }

    #[test]
    pub fn test_seek_and_short_read() {
        let bytes = [1u8, 2, 3, 4];
        let mut reader = BinaryReader::from_slice(&bytes);
        reader.seek(2).unwrap();
        assert_eq!(reader.read_to_end().unwrap(), vec![3, 4]);

        reader.seek(3).unwrap();
        assert!(reader.read_bytes(2).is_err());
    }
}
