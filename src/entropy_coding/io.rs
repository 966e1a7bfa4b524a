use core::slice::from_mut as into_slice;
use std::io::{self, ErrorKind, Read, Write};

use super::{ACRead, ACWrite};

/// Arithmetic coder read io for `io::Read` types
pub struct ACReader<R> {
    inner: R,
    eof: bool,
}

impl<R: Read> ACReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, eof: false }
    }
}

impl<R: Read> ACRead for ACReader<R> {
    fn read_byte(&mut self) -> io::Result<u8> {
        if self.eof {
            return Ok(0);
        }
        let mut byte = 0;
        match self.inner.read_exact(into_slice(&mut byte)) {
            Ok(()) => Ok(byte),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                self.eof = true;
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }
}

/// Arithmetic coder write io for `io::Write` types.
///
/// Zero bytes are held back until a nonzero byte follows, so trailing
/// zeros never reach the stream. The reader pads with zeros anyway.
pub struct ACWriter<W> {
    inner: W,
    zeros: u64,
}

impl<W: Write> ACWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, zeros: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ACWrite for ACWriter<W> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if byte == 0 {
            self.zeros += 1;
            return Ok(());
        }
        while self.zeros > 0 {
            self.zeros -= 1;
            self.inner.write_all(&[0])?;
        }
        self.inner.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.zeros = 0;
        self.inner.flush()
    }
}

/// Counts the bytes an `ACWriter` would produce without storing them
#[derive(Clone, Copy, Debug, Default)]
pub struct ACStats {
    bytes: u64,
    zeros: u64,
}

impl ACStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compressed size in bytes
    pub fn result(&self) -> u64 {
        self.bytes
    }
}

impl ACWrite for ACStats {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if byte == 0 {
            self.zeros += 1;
        } else {
            self.bytes += self.zeros + 1;
            self.zeros = 0;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.zeros = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ACRead, ACReader, ACStats, ACWrite, ACWriter};

    #[test]
    fn read_bytes() {
        let data = b"\xde\xad\xbe\xef";
        let mut reader = ACReader::new(&data[..]);
        for &byte in data {
            assert_eq!(reader.read_byte().unwrap(), byte);
        }
        // read past EOF
        (0..16).for_each(|_| assert_eq!(reader.read_byte().unwrap(), 0));
    }

    #[test]
    fn read_empty() {
        let empty: &[u8] = &[];
        let mut reader = ACReader::new(empty);
        (0..4).for_each(|_| assert_eq!(reader.read_byte().unwrap(), 0));
    }

    #[test]
    fn inner_zeros_are_kept() {
        let mut writer = ACWriter::new(Vec::new());
        for &byte in &[0, 7, 0, 0, 9] {
            writer.write_byte(byte).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![0, 7, 0, 0, 9]);
    }

    #[test]
    fn trailing_zeros_are_dropped() {
        let mut writer = ACWriter::new(Vec::new());
        for &byte in &[3, 0, 5, 0, 0, 0] {
            writer.write_byte(byte).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![3, 0, 5]);

        let mut writer = ACWriter::new(Vec::new());
        (0..10).for_each(|_| writer.write_byte(0).unwrap());
        writer.flush().unwrap();
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn stats_match_writer() {
        let bytes = [0, 0, 1, 2, 0, 3, 0, 0];
        let mut writer = ACWriter::new(Vec::new());
        let mut stats = ACStats::new();
        for &byte in &bytes {
            writer.write_byte(byte).unwrap();
            stats.write_byte(byte).unwrap();
        }
        writer.flush().unwrap();
        stats.flush().unwrap();
        assert_eq!(stats.result(), writer.into_inner().len() as u64);
        assert_eq!(stats.result(), 6);
    }
}
