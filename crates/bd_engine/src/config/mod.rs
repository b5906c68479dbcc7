//! Configuration system

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// File-backed configuration, format chosen by extension (`.toml` or `.ron`)
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format for a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,

    /// Window configuration
    pub window: WindowConfig,

    /// Renderer configuration
    pub renderer: RendererConfig,
}

/// Window and context configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Content width in screen coordinates
    pub width: u32,

    /// Content height in screen coordinates
    pub height: u32,

    /// Whether the window is resizable
    pub resizable: bool,

    /// Requested OpenGL version (major, minor)
    pub gl_version: (u32, u32),

    /// Request a core profile context
    pub core_profile: bool,

    /// Frames to wait between buffer swaps (0 disables vsync)
    pub swap_interval: i32,
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// RGBA colour the frame is cleared to
    pub clear_color: [f32; 4],

    /// Start in wireframe mode
    pub wireframe: bool,

    /// Image files mapped onto the quad, at most [`RendererConfig::MAX_TEXTURES`]
    pub textures: Vec<String>,
}

impl RendererConfig {
    /// Texture units sampled by the built-in shader
    pub const MAX_TEXTURES: usize = 4;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            window: WindowConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("bdEngine test application"),
            width: 640,
            height: 480,
            resizable: true,
            gl_version: (3, 3),
            core_profile: true,
            swap_interval: 1,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            wireframe: false,
            textures: Vec::new(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject values no window or renderer can be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        let (major, minor) = self.window.gl_version;
        if (major, minor) < (3, 3) {
            return Err(ConfigError::Invalid(format!(
                "OpenGL {major}.{minor} is too old, 3.3 is required"
            )));
        }
        if self.window.swap_interval < 0 {
            return Err(ConfigError::Invalid(format!(
                "swap interval {} must not be negative",
                self.window.swap_interval
            )));
        }
        if self.renderer.textures.len() > RendererConfig::MAX_TEXTURES {
            return Err(ConfigError::Invalid(format!(
                "{} textures configured, at most {} are supported",
                self.renderer.textures.len(),
                RendererConfig::MAX_TEXTURES
            )));
        }
        if self.renderer.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(String::from(
                "clear colour components must lie in 0..=1",
            )));
        }
        Ok(())
    }
}
