//! Indexed vertex geometry on the GPU

use std::rc::Rc;

use super::{BufferTarget, GraphicsApi, GraphicsError};

/// One float attribute inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub location: u32,
    /// Float components (1 to 4)
    pub components: u32,
}

impl VertexAttribute {
    /// Attribute at `location` with `components` floats
    pub const fn new(location: u32, components: u32) -> Self {
        Self {
            location,
            components,
        }
    }
}

/// Vertex array with its vertex and index buffers
pub struct GeometryBuffers {
    gl: Rc<dyn GraphicsApi>,
    vao: u32,
    vbo: u32,
    ebo: u32,
    index_count: i32,
}

impl GeometryBuffers {
    /// Upload interleaved `vertices` and triangle `indices`
    ///
    /// Each vertex is the concatenation of `layout`'s attributes in order.
    pub fn new(
        gl: Rc<dyn GraphicsApi>,
        vertices: &[f32],
        indices: &[u32],
        layout: &[VertexAttribute],
    ) -> Result<Self, GraphicsError> {
        let floats_per_vertex: usize = layout.iter().map(|a| a.components as usize).sum();
        if floats_per_vertex == 0 || vertices.len() % floats_per_vertex != 0 {
            return Err(GraphicsError::InvalidData(format!(
                "{} floats do not form whole vertices of {floats_per_vertex}",
                vertices.len()
            )));
        }
        let vertex_count = vertices.len() / floats_per_vertex;
        if let Some(index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GraphicsError::InvalidData(format!(
                "index {index} out of range for {vertex_count} vertices"
            )));
        }
        let index_count = i32::try_from(indices.len())
            .map_err(|_| GraphicsError::InvalidData(String::from("too many indices")))?;

        // Wrap each object as soon as it exists so a later failure releases it
        let mut geometry = Self {
            gl: Rc::clone(&gl),
            vao: 0,
            vbo: 0,
            ebo: 0,
            index_count,
        };
        geometry.vao = Self::create(gl.create_vertex_array(), "vertex array")?;
        geometry.vbo = Self::create(gl.create_buffer(), "vertex buffer")?;
        geometry.ebo = Self::create(gl.create_buffer(), "index buffer")?;

        gl.bind_vertex_array(geometry.vao);
        gl.buffer_data(BufferTarget::Array, geometry.vbo, bytemuck::cast_slice(vertices));
        gl.buffer_data(BufferTarget::ElementArray, geometry.ebo, bytemuck::cast_slice(indices));

        let stride = floats_per_vertex * std::mem::size_of::<f32>();
        let mut offset = 0;
        for attribute in layout {
            gl.vertex_attrib(
                attribute.location,
                attribute.components as i32,
                stride,
                offset,
            );
            offset += attribute.components as usize * std::mem::size_of::<f32>();
        }
        gl.bind_vertex_array(0);

        Ok(geometry)
    }

    fn create(id: u32, what: &'static str) -> Result<u32, GraphicsError> {
        if id == 0 {
            Err(GraphicsError::ObjectCreation(what))
        } else {
            Ok(id)
        }
    }

    /// Draw every indexed triangle
    pub fn draw(&self) {
        self.gl.bind_vertex_array(self.vao);
        self.gl.draw_triangles(self.index_count);
        self.gl.bind_vertex_array(0);
    }

    /// Number of indices submitted per draw
    pub const fn index_count(&self) -> i32 {
        self.index_count
    }
}

impl Drop for GeometryBuffers {
    fn drop(&mut self) {
        if self.ebo != 0 {
            self.gl.delete_buffer(self.ebo);
        }
        if self.vbo != 0 {
            self.gl.delete_buffer(self.vbo);
        }
        if self.vao != 0 {
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

impl std::fmt::Debug for GeometryBuffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffers")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .field("ebo", &self.ebo)
            .field("index_count", &self.index_count)
            .finish()
    }
}
