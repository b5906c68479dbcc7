//! 2D textures uploaded from decoded images

use std::rc::Rc;

use super::{GraphicsApi, GraphicsError};
use crate::assets::Image;

/// Owned GL texture object
///
/// Id 0 marks an empty texture (the result of [`Texture2D::empty`] or a value
/// that has been moved out of with [`Texture2D::take`]).
pub struct Texture2D {
    gl: Rc<dyn GraphicsApi>,
    id: u32,
}

impl Texture2D {
    /// Upload `image` with mipmaps, repeat wrapping and linear filtering
    pub fn from_image(gl: Rc<dyn GraphicsApi>, image: &Image) -> Result<Self, GraphicsError> {
        if image.is_empty() {
            return Err(GraphicsError::InvalidData(String::from(
                "cannot create a texture from an empty image",
            )));
        }

        let id = gl.create_texture();
        if id == 0 {
            return Err(GraphicsError::ObjectCreation("texture"));
        }

        gl.bind_texture(0, id);
        gl.set_texture_sampling();
        // Rows of RGB images are not 4-byte aligned in general
        gl.set_unpack_alignment(1);
        gl.tex_image_2d(image.width(), image.height(), image.format(), image.data());
        gl.generate_mipmap();
        gl.bind_texture(0, 0);

        log::debug!(
            "Uploaded texture {id} ({}x{} {:?})",
            image.width(),
            image.height(),
            image.format()
        );
        Ok(Self { gl, id })
    }

    /// Texture without a GL object
    pub fn empty(gl: Rc<dyn GraphicsApi>) -> Self {
        Self { gl, id: 0 }
    }

    /// Move the GL object out, leaving this texture empty
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            gl: Rc::clone(&self.gl),
            id: std::mem::take(&mut self.id),
        }
    }

    /// Bind to texture unit `unit`
    pub fn bind(&self, unit: u32) {
        self.gl.bind_texture(unit, self.id);
    }

    /// Native texture name, 0 when empty
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// True when no GL object is owned
    pub const fn is_empty(&self) -> bool {
        self.id == 0
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        if self.id != 0 {
            self.gl.delete_texture(self.id);
        }
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::mock::MockGraphics;
    use crate::gfx::PixelFormat;

    fn gl() -> (MockGraphics, Rc<dyn GraphicsApi>) {
        let mock = MockGraphics::new();
        let gl: Rc<dyn GraphicsApi> = Rc::new(mock.clone());
        (mock, gl)
    }

    #[test]
    fn test_upload_sequence() {
        let (mock, gl) = gl();
        let image = Image::from_pixels(3, 1, PixelFormat::Rgb8, vec![0; 9]).unwrap();
        let texture = Texture2D::from_image(gl, &image).unwrap();

        let state = mock.state();
        let uploaded = &state.textures[&texture.id()];
        assert_eq!(uploaded.size, (3, 1));
        assert_eq!(uploaded.format, Some(PixelFormat::Rgb8));
        assert_eq!(uploaded.bytes, 9);
        assert!(uploaded.mipmapped);
        assert_eq!(state.unpack_alignment, 1);
        assert_eq!(state.bound_texture[&0], 0);
        assert_eq!(
            state.calls,
            [
                "create_texture",
                "bind_texture",
                "set_texture_sampling",
                "set_unpack_alignment",
                "tex_image_2d",
                "generate_mipmap",
                "bind_texture",
            ]
        );
    }

    #[test]
    fn test_rgba_upload() {
        let (mock, gl) = gl();
        let image = Image::solid_color(2, 2, [0, 0, 0, 255]);
        let texture = Texture2D::from_image(gl, &image).unwrap();
        assert_eq!(mock.state().textures[&texture.id()].format, Some(PixelFormat::Rgba8));
    }

    #[test]
    fn test_take_transfers_ownership() {
        let (mock, gl) = gl();
        let image = Image::solid_color(1, 1, [1, 1, 1, 1]);
        let mut first = Texture2D::from_image(gl, &image).unwrap();
        let id = first.id();

        let second = first.take();
        assert!(first.is_empty());
        assert_eq!(second.id(), id);

        drop(first);
        assert!(mock.state().deleted_textures.is_empty());
        drop(second);
        assert_eq!(mock.state().deleted_textures, vec![id]);
    }

    #[test]
    fn test_empty_texture_releases_nothing() {
        let (mock, gl) = gl();
        drop(Texture2D::empty(gl));
        assert!(mock.state().calls.is_empty());
    }

    #[test]
    fn test_rejects_empty_image() {
        let (_mock, gl) = gl();
        let err = Texture2D::from_image(gl, &Image::default()).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidData(_)));
    }
}
