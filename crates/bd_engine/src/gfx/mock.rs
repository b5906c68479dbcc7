//! Recording [`GraphicsApi`] for tests
#![allow(missing_docs)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{BufferTarget, GraphicsApi, PixelFormat, PolygonMode, ShaderStage};

/// Sources containing this marker fail to compile
pub const COMPILE_ERROR_MARKER: &str = "#error";

#[derive(Debug, Clone, Default)]
pub struct MockShader {
    pub stage: Option<ShaderStage>,
    pub source: String,
    pub compiled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockTexture {
    pub size: (u32, u32),
    pub format: Option<PixelFormat>,
    pub bytes: usize,
    pub mipmapped: bool,
}

#[derive(Debug, Default)]
pub struct MockGraphicsState {
    next_id: u32,
    pub fail_creation: bool,
    pub fail_link: bool,
    pub shaders: HashMap<u32, MockShader>,
    pub programs: HashMap<u32, Vec<u32>>,
    pub textures: HashMap<u32, MockTexture>,
    pub vertex_arrays: HashSet<u32>,
    pub buffers: HashMap<u32, (BufferTarget, usize)>,
    pub deleted_shaders: Vec<u32>,
    pub deleted_programs: Vec<u32>,
    pub deleted_textures: Vec<u32>,
    pub deleted_vertex_arrays: Vec<u32>,
    pub deleted_buffers: Vec<u32>,
    pub attributes: Vec<(u32, i32, usize, usize)>,
    pub uniforms: HashMap<i32, i32>,
    pub bound_texture: HashMap<u32, u32>,
    pub bound_vertex_array: u32,
    pub current_program: u32,
    pub unpack_alignment: i32,
    pub viewport: Option<(i32, i32, i32, i32)>,
    pub clear_color: [f32; 4],
    pub clears: usize,
    pub draws: Vec<i32>,
    pub polygon_mode: Option<PolygonMode>,
    pub calls: Vec<&'static str>,
}

impl MockGraphicsState {
    fn allocate(&mut self) -> u32 {
        if self.fail_creation {
            return 0;
        }
        self.next_id += 1;
        self.next_id
    }

    /// Objects created and not yet deleted
    pub fn live_objects(&self) -> usize {
        self.shaders.len()
            + self.programs.len()
            + self.textures.len()
            + self.vertex_arrays.len()
            + self.buffers.len()
    }
}

/// Cloning shares the recorded state
#[derive(Debug, Clone, Default)]
pub struct MockGraphics {
    state: Rc<RefCell<MockGraphicsState>>,
}

impl MockGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, MockGraphicsState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockGraphicsState> {
        self.state.borrow_mut()
    }

    fn record(&self, call: &'static str) -> RefMut<'_, MockGraphicsState> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state
    }
}

impl GraphicsApi for MockGraphics {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        let mut state = self.record("create_shader");
        let id = state.allocate();
        if id != 0 {
            state.shaders.insert(
                id,
                MockShader {
                    stage: Some(stage),
                    ..MockShader::default()
                },
            );
        }
        id
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(entry) = self.record("shader_source").shaders.get_mut(&shader) {
            entry.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(entry) = self.record("compile_shader").shaders.get_mut(&shader) {
            entry.compiled = !entry.source.contains(COMPILE_ERROR_MARKER);
        }
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        self.state().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.state().shaders.get(&shader) {
            Some(entry) if !entry.compiled => String::from("0:1: error: forced failure"),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.record("delete_shader");
        if state.shaders.remove(&shader).is_some() {
            state.deleted_shaders.push(shader);
        }
    }

    fn create_program(&self) -> u32 {
        let mut state = self.record("create_program");
        let id = state.allocate();
        if id != 0 {
            state.programs.insert(id, Vec::new());
        }
        id
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(attached) = self.record("attach_shader").programs.get_mut(&program) {
            attached.push(shader);
        }
    }

    fn link_program(&self, _program: u32) {
        self.record("link_program");
    }

    fn program_linked(&self, program: u32) -> bool {
        let state = self.state();
        !state.fail_link && state.programs.contains_key(&program)
    }

    fn program_info_log(&self, _program: u32) -> String {
        if self.state().fail_link {
            String::from("error: unresolved varying")
        } else {
            String::new()
        }
    }

    fn use_program(&self, program: u32) {
        self.record("use_program").current_program = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.record("delete_program");
        if state.programs.remove(&program).is_some() {
            state.deleted_programs.push(program);
        }
    }

    fn attrib_location(&self, _program: u32, name: &str) -> i32 {
        match name {
            "position" => 0,
            "color" => 1,
            "texCoord" => 2,
            _ => -1,
        }
    }

    fn uniform_location(&self, _program: u32, name: &str) -> i32 {
        match name {
            "textureCount" => 0,
            _ if name.starts_with("textures") => 1,
            _ => -1,
        }
    }

    fn set_uniform_i32(&self, location: i32, value: i32) {
        self.record("set_uniform_i32").uniforms.insert(location, value);
    }

    fn create_texture(&self) -> u32 {
        let mut state = self.record("create_texture");
        let id = state.allocate();
        if id != 0 {
            state.textures.insert(id, MockTexture::default());
        }
        id
    }

    fn bind_texture(&self, unit: u32, texture: u32) {
        self.record("bind_texture").bound_texture.insert(unit, texture);
    }

    fn set_texture_sampling(&self) {
        self.record("set_texture_sampling");
    }

    fn set_unpack_alignment(&self, alignment: i32) {
        self.record("set_unpack_alignment").unpack_alignment = alignment;
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PixelFormat, data: &[u8]) {
        let mut guard = self.record("tex_image_2d");
        let state = &mut *guard;
        let bound = state.bound_texture.get(&0).copied().unwrap_or(0);
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.size = (width, height);
            texture.format = Some(format);
            texture.bytes = data.len();
        }
    }

    fn generate_mipmap(&self) {
        let mut guard = self.record("generate_mipmap");
        let state = &mut *guard;
        let bound = state.bound_texture.get(&0).copied().unwrap_or(0);
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.mipmapped = true;
        }
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.record("delete_texture");
        if state.textures.remove(&texture).is_some() {
            state.deleted_textures.push(texture);
        }
    }

    fn create_vertex_array(&self) -> u32 {
        let mut state = self.record("create_vertex_array");
        let id = state.allocate();
        if id != 0 {
            state.vertex_arrays.insert(id);
        }
        id
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        self.record("bind_vertex_array").bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.record("delete_vertex_array");
        if state.vertex_arrays.remove(&vertex_array) {
            state.deleted_vertex_arrays.push(vertex_array);
        }
    }

    fn create_buffer(&self) -> u32 {
        let mut state = self.record("create_buffer");
        let id = state.allocate();
        if id != 0 {
            state.buffers.insert(id, (BufferTarget::Array, 0));
        }
        id
    }

    fn buffer_data(&self, target: BufferTarget, buffer: u32, data: &[u8]) {
        if let Some(entry) = self.record("buffer_data").buffers.get_mut(&buffer) {
            *entry = (target, data.len());
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.record("delete_buffer");
        if state.buffers.remove(&buffer).is_some() {
            state.deleted_buffers.push(buffer);
        }
    }

    fn vertex_attrib(&self, location: u32, components: i32, stride: usize, offset: usize) {
        self.record("vertex_attrib")
            .attributes
            .push((location, components, stride, offset));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record("viewport").viewport = Some((x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record("clear_color").clear_color = rgba;
    }

    fn clear(&self) {
        self.record("clear").clears += 1;
    }

    fn draw_triangles(&self, index_count: i32) {
        self.record("draw_triangles").draws.push(index_count);
    }

    fn polygon_mode(&self, mode: PolygonMode) {
        self.record("polygon_mode").polygon_mode = Some(mode);
    }
}
