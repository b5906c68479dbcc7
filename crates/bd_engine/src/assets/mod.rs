//! Asset loading
//!
//! Decoded images feed both GPU textures and cursor/icon pixel buffers.

mod image;

pub use self::image::{Image, ImageError};
