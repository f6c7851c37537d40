// Core module containing the radio's code tables
pub mod constants;

// Re-export commonly used types
pub use constants::*;
