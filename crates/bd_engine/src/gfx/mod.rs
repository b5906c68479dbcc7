//! OpenGL resource layer
//!
//! [`GraphicsApi`] is the seam between the engine and the driver. Resource
//! owners ([`ShaderProgram`], [`Texture2D`], [`GeometryBuffers`]) hold an
//! `Rc<dyn GraphicsApi>` and release their GL objects on drop, so the function
//! table always outlives the objects created through it.
//!
//! Object names are `u32`; `0` never names a live object.

mod geometry;
mod gl_driver;
#[cfg(test)]
pub(crate) mod mock;
mod shader;
mod texture;

use thiserror::Error;

pub use geometry::{GeometryBuffers, VertexAttribute};
pub use gl_driver::GlDriver;
pub use shader::{ShaderError, ShaderProgram};
pub use texture::Texture2D;

/// Graphics driver errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// OpenGL entry points could not be resolved
    #[error("Failed to load OpenGL functions: {0}")]
    LoaderFailed(String),

    /// The driver returned 0 for a new object
    #[error("Failed to create {0} object")]
    ObjectCreation(&'static str),

    /// Data handed to the driver is inconsistent
    #[error("Invalid graphics data: {0}")]
    InvalidData(String),
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
        })
    }
}

/// Texel layout of uploaded image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGB
    Rgb8,
    /// 8-bit RGBA
    Rgba8,
}

impl PixelFormat {
    /// Bytes per texel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Buffer binding targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attributes
    Array,
    /// Element indices
    ElementArray,
}

/// Rasterization mode for polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Filled polygons
    Fill,
    /// Outlines only
    Line,
}

/// Driver entry points used by the engine
///
/// Methods take `&self`: the GL state lives in the current context, not in the
/// implementing value. All calls require that context to be current on the
/// calling thread.
pub trait GraphicsApi {
    /// New shader object, 0 on failure
    fn create_shader(&self, stage: ShaderStage) -> u32;
    /// Replace a shader's source
    fn shader_source(&self, shader: u32, source: &str);
    /// Compile a shader
    fn compile_shader(&self, shader: u32);
    /// Whether the last compilation succeeded
    fn shader_compiled(&self, shader: u32) -> bool;
    /// Compiler output
    fn shader_info_log(&self, shader: u32) -> String;
    /// Delete a shader object
    fn delete_shader(&self, shader: u32);

    /// New program object, 0 on failure
    fn create_program(&self) -> u32;
    /// Attach a compiled shader
    fn attach_shader(&self, program: u32, shader: u32);
    /// Link attached shaders
    fn link_program(&self, program: u32);
    /// Whether the last link succeeded
    fn program_linked(&self, program: u32) -> bool;
    /// Linker output
    fn program_info_log(&self, program: u32) -> String;
    /// Make a program current, 0 for none
    fn use_program(&self, program: u32);
    /// Delete a program object
    fn delete_program(&self, program: u32);
    /// Attribute location, -1 when absent
    fn attrib_location(&self, program: u32, name: &str) -> i32;
    /// Uniform location, -1 when absent
    fn uniform_location(&self, program: u32, name: &str) -> i32;
    /// Set an integer uniform of the current program
    fn set_uniform_i32(&self, location: i32, value: i32);

    /// New texture object, 0 on failure
    fn create_texture(&self) -> u32;
    /// Bind a 2D texture to a texture unit, 0 to unbind
    fn bind_texture(&self, unit: u32, texture: u32);
    /// Repeat wrapping and linear filtering on the bound texture
    fn set_texture_sampling(&self);
    /// Row alignment used when reading client pixel data
    fn set_unpack_alignment(&self, alignment: i32);
    /// Upload level 0 of the bound texture
    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, data: &[u8]);
    /// Build the mipmap chain of the bound texture
    fn generate_mipmap(&self);
    /// Delete a texture object
    fn delete_texture(&self, texture: u32);

    /// New vertex array object, 0 on failure
    fn create_vertex_array(&self) -> u32;
    /// Bind a vertex array, 0 to unbind
    fn bind_vertex_array(&self, vertex_array: u32);
    /// Delete a vertex array object
    fn delete_vertex_array(&self, vertex_array: u32);
    /// New buffer object, 0 on failure
    fn create_buffer(&self) -> u32;
    /// Bind `buffer` to `target` and fill it with static data
    fn buffer_data(&self, target: BufferTarget, buffer: u32, data: &[u8]);
    /// Delete a buffer object
    fn delete_buffer(&self, buffer: u32);
    /// Describe and enable a float attribute of the bound array buffer
    fn vertex_attrib(&self, location: u32, components: i32, stride: usize, offset: usize);

    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Colour used by [`GraphicsApi::clear`]
    fn clear_color(&self, rgba: [f32; 4]);
    /// Clear the colour and depth buffers
    fn clear(&self);
    /// Draw indexed triangles from the bound vertex array
    fn draw_triangles(&self, index_count: i32);
    /// Rasterization mode for front and back faces
    fn polygon_mode(&self, mode: PolygonMode);
}
