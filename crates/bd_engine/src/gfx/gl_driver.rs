//! [`GraphicsApi`] backed by the `gl` crate

use std::ffi::{c_void, CStr, CString};

use super::{BufferTarget, GraphicsApi, GraphicsError, PixelFormat, PolygonMode, ShaderStage};

/// OpenGL function table of the current context
///
/// `gl` keeps its function pointers in process-wide statics, so this type is
/// only a witness that they have been loaded.
#[derive(Debug)]
pub struct GlDriver {
    version: String,
}

impl GlDriver {
    /// Resolve every GL entry point through `loader`
    ///
    /// The context the functions belong to must be current.
    pub fn load(mut loader: impl FnMut(&str) -> *const c_void) -> Result<Self, GraphicsError> {
        gl::load_with(|symbol| loader(symbol));

        for (name, loaded) in [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glDrawElements", gl::DrawElements::is_loaded()),
            ("glGetString", gl::GetString::is_loaded()),
        ] {
            if !loaded {
                return Err(GraphicsError::LoaderFailed(format!("{name} is unavailable")));
            }
        }

        let version = unsafe {
            let ptr = gl::GetString(gl::VERSION);
            if ptr.is_null() {
                String::from("unknown")
            } else {
                CStr::from_ptr(ptr.cast()).to_string_lossy().into_owned()
            }
        };
        log::info!("OpenGL loaded: {version}");
        Ok(Self { version })
    }

    /// `GL_VERSION` of the context the driver was loaded for
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn gl_stage(stage: ShaderStage) -> gl::types::GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Geometry => gl::GEOMETRY_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

fn gl_target(target: BufferTarget) -> gl::types::GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn info_log(len: i32, read: impl FnOnce(i32, *mut i32, *mut gl::types::GLchar)) -> String {
    let capacity = usize::try_from(len).unwrap_or(0).max(1);
    let mut buffer = vec![0u8; capacity];
    let mut written = 0;
    read(len.max(1), &mut written, buffer.as_mut_ptr().cast());
    buffer.truncate(usize::try_from(written).unwrap_or(0));
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

impl GraphicsApi for GlDriver {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        unsafe { gl::CreateShader(gl_stage(stage)) }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let ptr = source.as_ptr().cast::<gl::types::GLchar>();
        let len = i32::try_from(source.len()).unwrap_or(i32::MAX);
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) };
    }

    fn compile_shader(&self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        let mut status = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == i32::from(gl::TRUE)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        info_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, cap, written, buf);
        })
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_linked(&self, program: u32) -> bool {
        let mut status = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == i32::from(gl::TRUE)
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        info_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program, cap, written, buf);
        })
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        CString::new(name).map_or(-1, |name| unsafe { gl::GetAttribLocation(program, name.as_ptr()) })
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        CString::new(name).map_or(-1, |name| unsafe { gl::GetUniformLocation(program, name.as_ptr()) })
    }

    fn set_uniform_i32(&self, location: i32, value: i32) {
        unsafe { gl::Uniform1i(location, value) };
    }

    fn create_texture(&self) -> u32 {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        texture
    }

    fn bind_texture(&self, unit: u32, texture: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, texture);
        }
    }

    fn set_texture_sampling(&self) {
        unsafe {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        }
    }

    fn set_unpack_alignment(&self, alignment: i32) {
        unsafe { gl::PixelStorei(gl::UNPACK_ALIGNMENT, alignment) };
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, data: &[u8]) {
        let (internal, layout) = match format {
            PixelFormat::Rgb8 => (gl::RGB8, gl::RGB),
            PixelFormat::Rgba8 => (gl::RGBA8, gl::RGBA),
        };
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                internal as i32,
                i32::try_from(width).unwrap_or(i32::MAX),
                i32::try_from(height).unwrap_or(i32::MAX),
                0,
                layout,
                gl::UNSIGNED_BYTE,
                data.as_ptr().cast(),
            );
        }
    }

    fn generate_mipmap(&self) {
        unsafe { gl::GenerateMipmap(gl::TEXTURE_2D) };
    }

    fn delete_texture(&self, texture: u32) {
        unsafe { gl::DeleteTextures(1, &texture) };
    }

    fn create_vertex_array(&self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe { gl::BindVertexArray(vertex_array) };
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array) };
    }

    fn create_buffer(&self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn buffer_data(&self, target: BufferTarget, buffer: u32, data: &[u8]) {
        let size = isize::try_from(data.len()).unwrap_or(isize::MAX);
        unsafe {
            gl::BindBuffer(gl_target(target), buffer);
            gl::BufferData(gl_target(target), size, data.as_ptr().cast(), gl::STATIC_DRAW);
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn vertex_attrib(&self, location: u32, components: i32, stride: usize, offset: usize) {
        let stride = i32::try_from(stride).unwrap_or(i32::MAX);
        unsafe {
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
            gl::EnableVertexAttribArray(location);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) };
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT) };
    }

    fn draw_triangles(&self, index_count: i32) {
        unsafe { gl::DrawElements(gl::TRIANGLES, index_count, gl::UNSIGNED_INT, std::ptr::null()) };
    }

    fn polygon_mode(&self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => gl::FILL,
            PolygonMode::Line => gl::LINE,
        };
        unsafe { gl::PolygonMode(gl::FRONT_AND_BACK, mode) };
    }
}
