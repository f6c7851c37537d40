// Byte image of radio EEPROM

use std::fmt::{self, Write as _};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MemoryMapError {
    #[error("Range {start:#06x}..{end:#06x} outside image of {size:#06x} bytes")]
    OutOfRange { start: usize, end: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, MemoryMapError>;

/// Fixed-size, address-indexed byte image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    bytes: Vec<u8>,
}

impl MemoryMap {
    /// Image of `size` bytes, all zero
    pub fn zeroed(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>> {
        let end = start.saturating_add(len);
        if end > self.bytes.len() {
            return Err(MemoryMapError::OutOfRange {
                start,
                end,
                size: self.bytes.len(),
            });
        }
        Ok(start..end)
    }

    /// `len` bytes starting at `addr`
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let range = self.check(addr, len)?;
        Ok(&self.bytes[range])
    }

    /// Overwrite bytes starting at `addr`; the image never grows
    pub fn write_at(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        let range = self.check(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Hex dump of `start..end`, clamped to the image
    pub fn printable(&self, start: usize, end: usize) -> String {
        let end = end.min(self.bytes.len());
        let start = start.min(end);
        hexdump(&self.bytes[start..end], start)
    }
}

impl fmt::Display for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} byte image", self.bytes.len())
    }
}

/// `hexdump -C` style listing. Offsets start at `base`.
pub fn hexdump(data: &[u8], base: usize) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 16);

    for (row, line) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:08x} ", base + row * 16);

        for col in 0..16 {
            if col % 8 == 0 {
                out.push(' ');
            }
            match line.get(col) {
                Some(byte) => {
                    let _ = write!(out, "{:02x} ", byte);
                }
                None => out.push_str("   "),
            }
        }

        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, " |{}|", ascii);
    }

    out
}
