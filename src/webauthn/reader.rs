//! Cursor-based reader over a borrowed byte buffer
//!
//! The reader owns the cursor; callers that consume self-describing items
//! (CBOR) report how many bytes they used and the reader advances by that
//! amount.

use super::errors::{Result, WebAuthnError};

/// Sequential reader with bounds checking
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor offset from the start of the buffer
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Unread bytes, without advancing
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Read the next `n` bytes and advance the cursor
    ///
    /// # Errors
    ///
    /// Returns `TruncatedData` naming `field` if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(WebAuthnError::TruncatedData {
                field,
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    /// Skip `n` bytes
    ///
    /// # Errors
    ///
    /// Returns `TruncatedData` if fewer than `n` bytes remain.
    pub fn advance(&mut self, n: usize, field: &'static str) -> Result<()> {
        self.read_bytes(n, field).map(|_| ())
    }

    /// Read a fixed-size array
    ///
    /// # Errors
    ///
    /// Returns `TruncatedData` if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, field)?);
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `TruncatedData` if the buffer is exhausted.
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_bytes(1, field)?[0])
    }

    /// # Errors
    ///
    /// Returns `TruncatedData` if fewer than 2 bytes remain.
    pub fn read_u16_be(&mut self, field: &'static str) -> Result<u16> {
        self.read_array::<2>(field).map(u16::from_be_bytes)
    }

    /// # Errors
    ///
    /// Returns `TruncatedData` if fewer than 4 bytes remain.
    pub fn read_u32_be(&mut self, field: &'static str) -> Result<u32> {
        self.read_array::<4>(field).map(u32::from_be_bytes)
    }

    /// # Errors
    ///
    /// Returns `TruncatedData` if fewer than 8 bytes remain.
    pub fn read_u64_be(&mut self, field: &'static str) -> Result<u64> {
        self.read_array::<8>(field).map(u64::from_be_bytes)
    }
}
