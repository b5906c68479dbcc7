//! Image decoding for texture and cursor data

use std::path::Path;

use thiserror::Error;

use crate::gfx::PixelFormat;
use crate::platform::RgbaPixels;

/// Image loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The decoder rejected the file
    #[error("Image loading error for file '{path}': {message}")]
    Decode {
        /// File that was requested
        path: String,
        /// Decoder message
        message: String,
    },

    /// Pixel buffer does not match the stated dimensions
    #[error("Invalid image data: expected {expected} bytes, got {actual}")]
    InvalidData {
        /// `width * height * channels`
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
}

/// Decoded 8-bit image, rows top to bottom
///
/// The default value is empty (0x0, no pixels) and only serves as a move
/// target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            format: PixelFormat::Rgb8,
        }
    }
}

impl Image {
    /// Load an image as RGB
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        Self::load(path.as_ref(), PixelFormat::Rgb8)
    }

    /// Load an image as RGBA
    pub fn from_file_rgba<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        Self::load(path.as_ref(), PixelFormat::Rgba8)
    }

    fn load(path: &Path, format: PixelFormat) -> Result<Self, ImageError> {
        log::debug!("Loading image from: {}", path.display());

        let decoded = image::open(path).map_err(|e| ImageError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let image = match format {
            PixelFormat::Rgb8 => {
                let rgb = decoded.to_rgb8();
                let (width, height) = rgb.dimensions();
                Self {
                    data: rgb.into_raw(),
                    width,
                    height,
                    format,
                }
            }
            PixelFormat::Rgba8 => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Self {
                    data: rgba.into_raw(),
                    width,
                    height,
                    format,
                }
            }
        };

        log::info!(
            "Loaded image {}x{} from {}",
            image.width,
            image.height,
            path.display()
        );
        Ok(image)
    }

    /// Wrap raw pixels already in `format`
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(ImageError::InvalidData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Single-colour RGBA image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    /// Move the pixels out, leaving an empty image behind
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Texel layout of [`Image::data`]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True for the default or a moved-from image
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RGBA copy for cursors and window icons; RGB input gets opaque alpha
    pub fn to_rgba_pixels(&self) -> RgbaPixels {
        let data = match self.format {
            PixelFormat::Rgba8 => self.data.clone(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                .collect(),
        };
        RgbaPixels {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
