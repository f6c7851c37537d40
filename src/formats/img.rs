// .img file writer: raw image, magic separator, base64 JSON metadata

use super::metadata::Metadata;
use crate::memmap::MemoryMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImgError>;

/// Magic bytes that separate binary data from metadata in .img files
pub const MAGIC: &[u8] = b"\x00\xffchirp\xeeimg\x00\x01";

/// Save a memory map and metadata to a .img file
pub fn save_img(filename: impl AsRef<Path>, mmap: &MemoryMap, metadata: &Metadata) -> Result<()> {
    let mut file = File::create(filename)?;

    // Write the binary data
    file.write_all(mmap.as_bytes())?;

    // Write the magic separator
    file.write_all(MAGIC)?;

    // Encode metadata as base64-encoded JSON
    let metadata_json = metadata.to_json()?;
    file.write_all(BASE64.encode(metadata_json.as_bytes()).as_bytes())?;

    Ok(())
}
