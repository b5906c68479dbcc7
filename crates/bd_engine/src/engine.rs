//! Core engine implementation

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{Config, ConfigError, EngineConfig};
use crate::foundation::time::Timer;
use crate::platform::{Platform, WindowError, WindowResult};
use crate::render::{GraphicsLoader, RenderError, RenderWindow};

/// Creates the windowing platform when the engine initializes
pub type PlatformFactory = Box<dyn Fn() -> WindowResult<Platform>>;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no window yet
    Uninitialized,
    /// Window and renderer exist, loop not started
    Initialized,
    /// Inside [`Engine::run`]
    Running,
    /// The loop has ended
    Stopped,
}

/// Main engine struct
///
/// Owns the platform context and the render window, and drives the frame loop.
pub struct Engine {
    config: EngineConfig,
    platform_factory: PlatformFactory,
    graphics_loader: GraphicsLoader,
    state: EngineState,
    // Declared before the platform so the window goes first
    render_window: Option<RenderWindow>,
    platform: Option<Platform>,
    timer: Timer,
    // Reported by `init`, once logging is up
    config_source: Option<PathBuf>,
    ignored_args: Vec<String>,
}

impl Engine {
    /// Engine using GLFW and OpenGL
    pub fn new(config: EngineConfig) -> Self {
        Self::with_backends(config, Box::new(Platform::glfw), RenderWindow::gl_loader())
    }

    /// Engine with explicit windowing and graphics backends
    pub fn with_backends(
        config: EngineConfig,
        platform_factory: PlatformFactory,
        graphics_loader: GraphicsLoader,
    ) -> Self {
        Self {
            config,
            platform_factory,
            graphics_loader,
            state: EngineState::Uninitialized,
            render_window: None,
            platform: None,
            timer: Timer::new(),
            config_source: None,
            ignored_args: Vec::new(),
        }
    }

    /// Validated engine from a configuration file
    pub fn from_config<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let config = EngineConfig::load_from_file(path.as_ref())?;
        config.validate()?;
        let mut engine = Self::new(config);
        engine.config_source = Some(path.as_ref().to_path_buf());
        Ok(engine)
    }

    /// Engine from the process arguments (program name excluded)
    ///
    /// A leading `.toml` or `.ron` path is loaded as the configuration; any
    /// other argument is ignored.
    pub fn from_args<I, S>(args: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        let Some(first) = args.next() else {
            return Ok(Self::new(EngineConfig::default()));
        };

        let first = first.as_ref();
        let (mut engine, ignored) = if is_config_path(first) {
            (Self::from_config(first)?, None)
        } else {
            (Self::new(EngineConfig::default()), Some(first.to_string()))
        };
        engine.ignored_args.extend(ignored);
        engine
            .ignored_args
            .extend(args.map(|arg| arg.as_ref().to_string()));
        Ok(engine)
    }

    /// Create the platform, window and renderer
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Uninitialized {
            return Err(EngineError::AlreadyInitialized);
        }

        log::info!("Initializing engine...");
        if let Some(path) = &self.config_source {
            log::info!("Configuration loaded from {}", path.display());
        }
        for arg in &self.ignored_args {
            log::warn!("Ignoring argument '{arg}'");
        }
        let platform = (self.platform_factory)()?;
        log::info!("Windowing library {}", platform.version_string());
        let render_window = RenderWindow::new(
            &platform,
            &self.config.window,
            &self.config.renderer,
            &self.graphics_loader,
        )?;

        self.platform = Some(platform);
        self.render_window = Some(render_window);
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Run the frame loop until the window closes; returns the exit code
    pub fn run(&mut self) -> Result<i32, EngineError> {
        if self.state != EngineState::Initialized {
            return Err(EngineError::NotInitialized);
        }
        let Some(render_window) = self.render_window.as_mut() else {
            return Err(EngineError::NotInitialized);
        };

        log::info!("Starting main loop...");
        self.state = EngineState::Running;
        let result = Self::frame_loop(render_window, &mut self.timer);
        self.state = EngineState::Stopped;

        log::info!(
            "Main loop ended after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        result?;
        Ok(0)
    }

    fn frame_loop(render_window: &mut RenderWindow, timer: &mut Timer) -> Result<(), RenderError> {
        while render_window.keep_running()? {
            timer.update();
            render_window.draw_frame()?;
            render_window.handle_events()?;
        }
        Ok(())
    }

    /// Ask the loop to end after the current iteration
    pub fn stop(&self) -> Result<(), EngineError> {
        let render_window = self.render_window.as_ref().ok_or(EngineError::NotInitialized)?;
        render_window.stop()?;
        Ok(())
    }

    /// Current lifecycle state
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Active configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The render window, once initialized
    pub const fn render_window(&self) -> Option<&RenderWindow> {
        self.render_window.as_ref()
    }

    /// The platform context, once initialized
    pub const fn platform(&self) -> Option<&Platform> {
        self.platform.as_ref()
    }

    /// Frame timing of the last run
    pub const fn timer(&self) -> &Timer {
        &self.timer
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("render_window", &self.render_window)
            .finish_non_exhaustive()
    }
}

fn is_config_path(arg: &str) -> bool {
    matches!(
        Path::new(arg).extension().and_then(|ext| ext.to_str()),
        Some("toml" | "ron")
    )
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// `init` was called on an engine that is already set up
    #[error("Engine already initialized.")]
    AlreadyInitialized,

    /// `run` was called before `init` or after the loop ended
    #[error("Engine not initialized.")]
    NotInitialized,

    /// Windowing failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Rendering failure
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::mock::MockGraphics;
    use crate::gfx::GraphicsApi;
    use crate::platform::mock::MockWindowing;
    use crate::platform::{ErrorCode, NativeEvent, NativeFailure, WindowRef};
    use std::rc::Rc;

    fn mock_engine(config: EngineConfig) -> (MockWindowing, MockGraphics, Engine) {
        let windowing = MockWindowing::new();
        let graphics = MockGraphics::new();
        let backend = windowing.clone();
        let gl = graphics.clone();
        let engine = Engine::with_backends(
            config,
            Box::new(move || Platform::new(backend.clone())),
            Box::new(move |_: &WindowRef| Ok(Rc::new(gl.clone()) as Rc<dyn GraphicsApi>)),
        );
        (windowing, graphics, engine)
    }

    #[test]
    fn test_runs_k_frames_for_k_polls() {
        let (windowing, graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        windowing.close_after_polls(5);

        assert_eq!(engine.run().unwrap(), 0);
        assert_eq!(engine.state(), EngineState::Stopped);

        let state = windowing.state();
        assert_eq!(state.polls, 5);
        assert_eq!(state.windows.values().next().unwrap().swaps, 5);
        assert_eq!(graphics.state().draws.len(), 5);
        assert_eq!(engine.timer().frame_count(), 5);
    }

    #[test]
    fn test_double_init_keeps_first_state() {
        let (windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        let window = engine.render_window().and_then(|rw| rw.window().handle());

        assert!(matches!(engine.init(), Err(EngineError::AlreadyInitialized)));
        assert_eq!(engine.state(), EngineState::Initialized);
        assert_eq!(engine.render_window().and_then(|rw| rw.window().handle()), window);
        assert_eq!(windowing.state().windows_created, 1);
    }

    #[test]
    fn test_run_requires_init() {
        let (_windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        assert!(matches!(engine.run(), Err(EngineError::NotInitialized)));
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_run_after_stop_is_rejected() {
        let (windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        windowing.close_after_polls(1);
        engine.run().unwrap();
        assert!(matches!(engine.run(), Err(EngineError::NotInitialized)));
    }

    #[test]
    fn test_stop_before_run_skips_loop() {
        let (windowing, graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        engine.stop().unwrap();
        assert_eq!(engine.run().unwrap(), 0);
        assert_eq!(windowing.state().polls, 0);
        assert!(graphics.state().draws.is_empty());
    }

    #[test]
    fn test_escape_ends_loop() {
        let (windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        let window = windowing.single_window();
        windowing.push_event(NativeEvent::Key {
            window,
            key: crate::platform::KeyCode::Escape.raw(),
            scancode: 9,
            action: 1,
            mods: 0,
        });

        assert_eq!(engine.run().unwrap(), 0);
        assert_eq!(windowing.state().polls, 1);
    }

    #[test]
    fn test_close_veto_keeps_running() {
        let (windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        let window = windowing.single_window();

        // Veto the first request and queue an Escape press for the next poll
        let queue = windowing.clone();
        engine
            .render_window()
            .unwrap()
            .set_close_handler(move || {
                queue.push_event(NativeEvent::Key {
                    window,
                    key: crate::platform::KeyCode::Escape.raw(),
                    scancode: 9,
                    action: 1,
                    mods: 0,
                });
                false
            })
            .unwrap();
        windowing.close_after_polls(2);

        assert_eq!(engine.run().unwrap(), 0);
        let state = windowing.state();
        assert_eq!(state.polls, 3);
        assert_eq!(state.windows[window].swaps, 3);
    }

    #[test]
    fn test_resize_applies_on_next_frame() {
        let (windowing, graphics, mut engine) = mock_engine(EngineConfig::default());
        engine.init().unwrap();
        let window = windowing.single_window();
        windowing.push_event(NativeEvent::FramebufferSize {
            window,
            width: 320,
            height: 200,
        });
        windowing.close_after_polls(2);

        engine.run().unwrap();
        assert_eq!(graphics.state().viewport, Some((0, 0, 320, 200)));
    }

    #[test]
    fn test_window_creation_failure() {
        let (windowing, _graphics, mut engine) = mock_engine(EngineConfig::default());
        windowing.state_mut().fail_window_creation = Some(Some(NativeFailure::new(
            ErrorCode::VersionUnavailable,
            "GL 3.3 unavailable",
        )));

        let err = engine.init().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Render(RenderError::Window(WindowError::CreationFailed { .. }))
        ));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(err.to_string().contains("GL 3.3 unavailable"));
    }

    #[test]
    fn test_from_args_without_config() {
        let engine = Engine::from_args(["--verbose", "extra"]).unwrap();
        assert_eq!(engine.config(), &EngineConfig::default());
        assert_eq!(engine.ignored_args, ["--verbose", "extra"]);
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_from_args_loads_config() {
        let path = std::env::temp_dir().join(format!("bd_engine_args_{}.toml", std::process::id()));
        let mut config = EngineConfig::default();
        config.window.title = String::from("From file");
        config.save_to_file(&path).unwrap();

        let engine = Engine::from_args([path.display().to_string()]).unwrap();
        assert_eq!(engine.config().window.title, "From file");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_from_args_rejects_invalid_config() {
        let path = std::env::temp_dir().join(format!("bd_engine_invalid_{}.ron", std::process::id()));
        std::fs::write(&path, "(window: (width: 0))").unwrap();
        let err = Engine::from_args([path.display().to_string()]).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::Invalid(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(EngineError::AlreadyInitialized.to_string(), "Engine already initialized.");
        assert_eq!(EngineError::NotInitialized.to_string(), "Engine not initialized.");
    }
}
