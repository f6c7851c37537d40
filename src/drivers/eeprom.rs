// FT-817 EEPROM dump
// The radio exposes its EEPROM two bytes at a time through the CAT
// EEPROM-read command; walking the address space assembles an image

use super::ft817::{Ft817Radio, EEPROM_CELL_LEN};
use super::traits::{RadioResult, Status};
use crate::memmap::MemoryMap;
use crate::serial::{ProgressCallback, Transport};

/// Readable EEPROM size. Addresses run 0x0000..=0x1925; a read at 0x1926
/// only repeats the last byte.
pub const EEPROM_SIZE: usize = 0x1926;

/// An assembled EEPROM image, possibly cut short
#[derive(Debug, Clone, PartialEq)]
pub struct EepromImage {
    map: MemoryMap,
    valid_len: usize,
}

impl EepromImage {
    /// Full-size image; unread addresses stay zero
    pub fn map(&self) -> &MemoryMap {
        &self.map
    }

    /// Number of leading bytes that were actually read
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// The part of the image that was read
    pub fn prefix(&self) -> &[u8] {
        &self.map.as_bytes()[..self.valid_len]
    }

    pub fn is_complete(&self) -> bool {
        self.valid_len == self.map.len()
    }

    /// Address where the radio stopped answering, if it did
    pub fn stopped_at(&self) -> Option<usize> {
        (!self.is_complete()).then_some(self.valid_len)
    }
}

/// Walks the EEPROM address space with repeated two-byte reads
pub struct EepromDumper {
    size: usize,
    progress: Option<ProgressCallback>,
}

impl EepromDumper {
    pub fn new() -> Self {
        Self {
            size: EEPROM_SIZE,
            progress: None,
        }
    }

    /// Dump only the first `size` bytes (rounded up to a whole cell)
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size.min(EEPROM_SIZE);
        self
    }

    /// Report progress once per 256-byte page
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Read the EEPROM into an image.
    ///
    /// A cell that returns nothing means the radio stopped answering: the
    /// dump ends there and the partial image is returned. A one-byte cell
    /// is stored as far as it goes and the dump carries on. A failed read
    /// ends the dump the same way as a silent cell; only write errors abort
    /// it.
    pub async fn dump<T: Transport>(
        &self,
        radio: &Ft817Radio,
        port: &mut T,
    ) -> RadioResult<EepromImage> {
        let mut map = MemoryMap::zeroed(self.size);
        let mut valid_len = self.size;

        for addr in (0..self.size).step_by(EEPROM_CELL_LEN) {
            if addr & 0xFF == 0 {
                let status = Status::new(addr, self.size, format!("reading 0x{:04x}", addr));
                tracing::info!("{}", status);
                if let Some(ref callback) = self.progress {
                    callback(status.current, status.max, &status.message);
                }
            }

            let cell = radio.read_eeprom_cell(port, addr as u16).await?;

            match cell.len() {
                0 => {
                    tracing::warn!(
                        "{}: Only read up to 0x{:04x}",
                        radio.port_name(),
                        addr
                    );
                    valid_len = addr;
                    break;
                }
                1 => tracing::warn!("{}: short read at 0x{:04x}", radio.port_name(), addr),
                EEPROM_CELL_LEN => {}
                n => tracing::warn!(
                    "{}: {} bytes at 0x{:04x}, keeping the first {}",
                    radio.port_name(),
                    n,
                    addr,
                    EEPROM_CELL_LEN
                ),
            }

            let take = cell.len().min(EEPROM_CELL_LEN).min(self.size - addr);
            map.write_at(addr, &cell[..take])?;
        }

        if valid_len == self.size {
            tracing::info!("Read {} bytes of EEPROM", valid_len);
        }

        Ok(EepromImage { map, valid_len })
    }
}

impl Default for EepromDumper {
    fn default() -> Self {
        Self::new()
    }
}
