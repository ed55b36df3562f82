//! Host memory sources
//!
//! Address spaces backed by:
//! - A live process via `LiveProcess`
//! - A raw memory image file via `ImageFile`

mod image;
mod process;

pub use image::ImageFile;
pub use process::LiveProcess;
