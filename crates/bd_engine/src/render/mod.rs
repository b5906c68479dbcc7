//! Rendering
//!
//! [`Renderer`] owns the GPU resources for one frame's worth of drawing and
//! [`RenderWindow`] ties it to a native window, its context and its events.

mod render_window;

use std::rc::Rc;

use thiserror::Error;

use crate::assets::{Image, ImageError};
use crate::config::RendererConfig;
use crate::gfx::{
    GeometryBuffers, GraphicsApi, GraphicsError, PolygonMode, ShaderError, ShaderProgram,
    ShaderStage, Texture2D, VertexAttribute,
};
use crate::platform::{Size2D, WindowError};

pub use render_window::{GraphicsLoader, RenderWindow};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Shader compilation or linking failed
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),

    /// A texture image could not be loaded
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Driver failure
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Window or context failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
}

const VERTEX_SHADER: &str = r"#version 330 core
layout (location = 0) in vec3 position;
layout (location = 1) in vec3 color;
layout (location = 2) in vec2 texCoord;

out vec3 fragColor;
out vec2 fragTexCoord;

void main() {
    gl_Position = vec4(position.xyz, 1.0);
    fragColor = color;
    fragTexCoord = texCoord;
}
";

// Sampler arrays only take constant indices in GLSL 3.30
const FRAGMENT_SHADER: &str = r"#version 330 core
in vec3 fragColor;
in vec2 fragTexCoord;

out vec4 color;

uniform int textureCount;
uniform sampler2D textures[4];

void main() {
    vec4 texel = vec4(1.0);
    if (textureCount > 0) {
        texel = texture(textures[0], fragTexCoord);
    }
    if (textureCount > 1) {
        texel = mix(texel, texture(textures[1], fragTexCoord), 0.5);
    }
    if (textureCount > 2) {
        texel = mix(texel, texture(textures[2], fragTexCoord), 0.5);
    }
    if (textureCount > 3) {
        texel = mix(texel, texture(textures[3], fragTexCoord), 0.5);
    }
    color = vec4(fragColor * texel.rgb, 1.0);
}
";

/// Position xyz, colour rgb, texture uv
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 32] = [
     0.5,  0.5, 0.0,  0.0, 0.0, 1.0,  1.0, 1.0, // top right
     0.5, -0.5, 0.0,  1.0, 0.0, 0.0,  1.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,  0.0, 1.0, 0.0,  0.0, 0.0, // bottom left
    -0.5,  0.5, 0.0,  1.0, 0.0, 0.0,  0.0, 1.0, // top left
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const QUAD_LAYOUT: [VertexAttribute; 3] = [
    VertexAttribute::new(0, 3),
    VertexAttribute::new(1, 3),
    VertexAttribute::new(2, 2),
];

/// Draws the scene into the current context
pub struct Renderer {
    gl: Rc<dyn GraphicsApi>,
    textures: Vec<Texture2D>,
    quad: GeometryBuffers,
    program: ShaderProgram,
    clear_color: [f32; 4],
    wireframe: bool,
    viewport: Size2D,
}

impl Renderer {
    /// Compile the shaders, upload the quad and any configured textures
    pub fn new(gl: Rc<dyn GraphicsApi>, config: &RendererConfig) -> Result<Self, RenderError> {
        let mut program = ShaderProgram::new(Rc::clone(&gl))?;
        program.add_shader(VERTEX_SHADER, ShaderStage::Vertex)?;
        program.add_shader(FRAGMENT_SHADER, ShaderStage::Fragment)?;
        program.link_shaders()?;

        let quad = GeometryBuffers::new(Rc::clone(&gl), &QUAD_VERTICES, &QUAD_INDICES, &QUAD_LAYOUT)?;

        let textures = config
            .textures
            .iter()
            .take(RendererConfig::MAX_TEXTURES)
            .map(|path| -> Result<Texture2D, RenderError> {
                let image = Image::from_file(path)?;
                Ok(Texture2D::from_image(Rc::clone(&gl), &image)?)
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        program.use_program();
        program.set_uniform_i32("textureCount", textures.len() as i32);
        for unit in 0..textures.len() {
            program.set_uniform_i32(&format!("textures[{unit}]"), unit as i32);
        }
        gl.use_program(0);

        let mut renderer = Self {
            gl,
            textures,
            quad,
            program,
            clear_color: config.clear_color,
            wireframe: false,
            viewport: Size2D::new(0, 0),
        };
        if config.wireframe {
            renderer.toggle_wireframe_mode();
        }

        log::info!(
            "Renderer ready ({} texture(s), wireframe {})",
            renderer.textures.len(),
            renderer.wireframe
        );
        Ok(renderer)
    }

    /// Resize the viewport to the framebuffer
    pub fn set_window_size(&mut self, width: i32, height: i32) {
        self.viewport = Size2D::new(width, height);
        self.gl.viewport(0, 0, width, height);
    }

    /// Clear and draw one frame; the caller swaps buffers
    pub fn draw_frame(&self) {
        self.gl.clear_color(self.clear_color);
        self.gl.clear();

        self.program.use_program();
        for (unit, texture) in self.textures.iter().enumerate() {
            texture.bind(unit as u32);
        }
        self.quad.draw();
    }

    /// Switch between filled and outlined polygons, returning the new state
    pub fn toggle_wireframe_mode(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        self.gl.polygon_mode(if self.wireframe {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        });
        self.wireframe
    }

    /// Whether polygons are drawn as outlines
    pub const fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Last size passed to [`Renderer::set_window_size`]
    pub const fn viewport(&self) -> Size2D {
        self.viewport
    }

    /// Number of textures sampled per frame
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("program", &self.program)
            .field("quad", &self.quad)
            .field("textures", &self.textures)
            .field("wireframe", &self.wireframe)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
