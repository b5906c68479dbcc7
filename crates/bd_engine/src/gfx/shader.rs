//! Shader program management

use std::rc::Rc;

use thiserror::Error;

use super::{GraphicsApi, GraphicsError, ShaderStage};

/// Shader compile and link failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A stage failed to compile
    #[error("Compile error for {stage} shader: {log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler output
        log: String,
    },

    /// The program failed to link
    #[error("Linker error: {log}")]
    Link {
        /// Linker output
        log: String,
    },

    /// Linking was requested with nothing attached
    #[error("No shader stages attached to program")]
    NoStages,

    /// Driver-level failure
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

/// GL program object plus the stages attached to it
pub struct ShaderProgram {
    gl: Rc<dyn GraphicsApi>,
    program: u32,
    shaders: Vec<u32>,
}

impl ShaderProgram {
    /// Create an empty program object
    pub fn new(gl: Rc<dyn GraphicsApi>) -> Result<Self, GraphicsError> {
        let program = gl.create_program();
        if program == 0 {
            return Err(GraphicsError::ObjectCreation("program"));
        }
        Ok(Self {
            gl,
            program,
            shaders: Vec::new(),
        })
    }

    /// Compile `source` as `stage` and attach it
    ///
    /// A stage that does not compile is deleted and left unattached.
    pub fn add_shader(&mut self, source: &str, stage: ShaderStage) -> Result<(), ShaderError> {
        let shader = self.gl.create_shader(stage);
        if shader == 0 {
            return Err(GraphicsError::ObjectCreation("shader").into());
        }

        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);

        if !self.gl.shader_compiled(shader) {
            let log = self.gl.shader_info_log(shader);
            log::error!("Compile error for {stage} shader: {log}");
            self.gl.delete_shader(shader);
            return Err(ShaderError::Compile { stage, log });
        }

        self.gl.attach_shader(self.program, shader);
        self.shaders.push(shader);
        Ok(())
    }

    /// Link every attached stage
    pub fn link_shaders(&mut self) -> Result<(), ShaderError> {
        if self.shaders.is_empty() {
            return Err(ShaderError::NoStages);
        }

        self.gl.link_program(self.program);
        if !self.gl.program_linked(self.program) {
            let log = self.gl.program_info_log(self.program);
            log::error!("Linker error: {log}");
            return Err(ShaderError::Link { log });
        }
        Ok(())
    }

    /// Make this program current
    pub fn use_program(&self) {
        self.gl.use_program(self.program);
    }

    /// Location of a vertex attribute, -1 when absent
    pub fn attrib_location(&self, name: &str) -> i32 {
        self.gl.attrib_location(self.program, name)
    }

    /// Location of a uniform, -1 when absent
    pub fn uniform_location(&self, name: &str) -> i32 {
        self.gl.uniform_location(self.program, name)
    }

    /// Set an integer uniform; the program must be current
    pub fn set_uniform_i32(&self, name: &str, value: i32) {
        let location = self.uniform_location(name);
        if location < 0 {
            log::debug!("Uniform '{name}' not active in program {}", self.program);
            return;
        }
        self.gl.set_uniform_i32(location, value);
    }

    /// Native program name
    pub fn id(&self) -> u32 {
        self.program
    }

    /// Number of successfully attached stages
    pub fn stage_count(&self) -> usize {
        self.shaders.len()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        for shader in self.shaders.drain(..) {
            self.gl.delete_shader(shader);
        }
        self.gl.delete_program(self.program);
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("shaders", &self.shaders)
            .finish()
    }
}
