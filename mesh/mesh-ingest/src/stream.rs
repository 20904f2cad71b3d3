//! Little-endian binary stream primitives.

use std::io::{self, Read};

use crate::error::{IoError, IoResult};

/// Sequential little-endian reader over any byte source.
///
/// The reader owns its source, so dropping it releases the underlying file
/// handle. Short reads surface as [`IoError::UnexpectedEof`] carrying the
/// offset of the read that ran out of data.
#[derive(Debug)]
pub struct LeReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> LeReader<R> {
    /// Wrap a byte source.
    pub const fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    fn eof_error(&self, err: io::Error) -> IoError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            IoError::UnexpectedEof {
                position: self.position,
            }
        } else {
            IoError::Io(err)
        }
    }

    fn read_array<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.eof_error(e))?;
        self.position += N as u64;
        Ok(buf)
    }

    /// Read a `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] if the stream ends first.
    pub fn read_u16(&mut self) -> IoResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] if the stream ends first.
    pub fn read_u32(&mut self) -> IoResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read an `f32`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] if the stream ends first.
    pub fn read_f32(&mut self) -> IoResult<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read an `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] if the stream ends first.
    pub fn read_f64(&mut self) -> IoResult<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    /// Skip exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] at the end of the stream if fewer
    /// than `len` bytes remain.
    pub fn skip(&mut self, len: u64) -> IoResult<()> {
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.position += copied;
        if copied < len {
            return Err(IoError::UnexpectedEof {
                position: self.position,
            });
        }
        Ok(())
    }

    /// Read a string terminated by a NUL byte or by `max_len` bytes,
    /// whichever comes first.
    ///
    /// The NUL byte is consumed but not returned. Invalid UTF-8 is replaced
    /// with `U+FFFD`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnexpectedEof`] if the stream ends before the
    /// terminator or the limit.
    pub fn read_terminated_string(&mut self, max_len: usize) -> IoResult<String> {
        let mut bytes = Vec::new();
        while bytes.len() < max_len {
            let [byte] = self.read_array::<1>()?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
