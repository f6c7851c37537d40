// Serial communication module for radio I/O
pub mod cat_protocol;
pub mod comm;
pub mod protocol;

#[cfg(test)]
pub mod mock;

pub use cat_protocol::{CatFrame, Opcode, FRAME_LEN};
pub use comm::{Readiness, SerialConfig, SerialError, SerialPort, Transport};
pub use protocol::{ProgressCallback, ReadDeadline, ReadOutcome, ReadStatus, ResponseReader};
