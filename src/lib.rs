// FT817-RS: CAT control and EEPROM dumping for the Yaesu FT-817

pub mod bitwise;
pub mod cli;
pub mod core;
pub mod drivers;
pub mod formats;
pub mod memmap;
pub mod serial;

// Re-export commonly used types
pub use crate::bitwise::{pack_bcd, unpack_bcd, BcdError};
pub use crate::core::{Mode, RepeaterDir, ToneSquelch, TONES};
pub use drivers::{
    CatConfig, EepromDumper, EepromImage, FrequencyReading, Ft817Radio, RadioError,
    RadioResult, StatusReport,
};
pub use formats::{save_img, Metadata};
pub use memmap::MemoryMap;
pub use serial::{ProgressCallback, ReadDeadline, SerialConfig, SerialPort, Transport};

/// Crate version, recorded in image metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
