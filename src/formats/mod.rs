// File format handlers
pub mod img;
pub mod metadata;

pub use img::{save_img, ImgError};
pub use metadata::Metadata;
