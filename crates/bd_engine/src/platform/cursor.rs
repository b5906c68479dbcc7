//! Owned cursor objects

use super::backend::CursorId;
use super::error::{WindowError, WindowResult};
use super::types::{CursorShape, Point2D, RgbaPixels};
use super::Platform;
use crate::assets::Image;

/// A cursor image that can be set on any window
///
/// Destroying a cursor that is in use reverts those windows to the default
/// arrow.
pub struct Cursor {
    platform: Platform,
    handle: Option<CursorId>,
}

impl Cursor {
    /// Cursor with one of the standard shapes
    pub fn standard(platform: &Platform, shape: CursorShape) -> WindowResult<Self> {
        let handle = platform.create("cursor", |backend| backend.create_standard_cursor(shape))?;
        Ok(Self {
            platform: platform.clone(),
            handle: Some(handle),
        })
    }

    /// Cursor from RGBA pixels; `hot_spot` is relative to the top-left corner
    pub fn from_pixels(
        platform: &Platform,
        pixels: &RgbaPixels,
        hot_spot: Point2D<i32>,
    ) -> WindowResult<Self> {
        let expected = pixels.width as usize * pixels.height as usize * 4;
        if pixels.width == 0 || pixels.height == 0 || pixels.data.len() != expected {
            return Err(WindowError::InvalidArgument(format!(
                "cursor image is {}x{} with {} bytes",
                pixels.width,
                pixels.height,
                pixels.data.len()
            )));
        }
        let handle = platform.create("cursor", |backend| {
            backend.create_cursor(pixels, hot_spot.x, hot_spot.y)
        })?;
        Ok(Self {
            platform: platform.clone(),
            handle: Some(handle),
        })
    }

    /// Cursor from a decoded image
    pub fn from_image(platform: &Platform, image: &Image, hot_spot: Point2D<i32>) -> WindowResult<Self> {
        Self::from_pixels(platform, &image.to_rgba_pixels(), hot_spot)
    }

    /// Move the cursor out, leaving this value empty
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            platform: self.platform.clone(),
            handle: self.handle.take(),
        }
    }

    /// Native handle, `None` once moved out
    pub const fn handle(&self) -> Option<CursorId> {
        self.handle
    }

    /// True once moved out
    pub const fn is_empty(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.platform.call(|backend| backend.destroy_cursor(handle)) {
                log::warn!("Failed to destroy cursor: {e}");
            }
        }
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("handle", &self.handle).finish()
    }
}
