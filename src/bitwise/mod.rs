// Binary field codecs for CAT command parameters

pub mod bcd;

pub use bcd::{pack as pack_bcd, unpack as unpack_bcd, BcdError};
