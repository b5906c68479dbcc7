//! # bdEngine
//!
//! A small OpenGL rendering engine built on owned windowing and GPU handles.
//!
//! ## Features
//!
//! - **Owned native handles**: windows, cursors, shaders, textures and buffers
//!   release their native objects exactly once, on drop
//! - **Per-window callbacks**: closures registered on a window receive typed
//!   events and may replace or remove themselves while running
//! - **Backend traits**: GLFW and OpenGL sit behind `NativeWindowing` and
//!   `GraphicsApi`, so the engine runs headless against mocks in tests
//! - **Configuration**: TOML or RON engine configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bd_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::new(EngineConfig::default());
//!     engine.init()?;
//!     let exit_code = engine.run()?;
//!     std::process::exit(exit_code);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod gfx;
pub mod platform;
pub mod render;

mod engine;

pub use config::{EngineConfig, RendererConfig, WindowConfig};
pub use engine::{Engine, EngineError, EngineState, PlatformFactory};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Image, ImageError},
        config::{Config, ConfigError},
        foundation::time::Timer,
        gfx::{GraphicsApi, ShaderError, ShaderProgram, ShaderStage, Texture2D},
        platform::{Cursor, KeyCode, Monitor, Platform, Window, WindowError, WindowRef},
        render::{RenderError, RenderWindow, Renderer},
        Engine, EngineConfig, EngineError, EngineState, RendererConfig, WindowConfig,
    };
}
