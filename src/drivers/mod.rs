// Radio driver framework
pub mod eeprom;
pub mod ft817;
pub mod traits;

pub use eeprom::{EepromDumper, EepromImage, EEPROM_SIZE};
pub use ft817::{CatConfig, FrequencyReading, Ft817Radio, StatusReport};
pub use traits::{RadioError, RadioResult, Status};
