//! Window, context and renderer bundled for the frame loop

use std::cell::RefCell;
use std::rc::Rc;

use super::{RenderError, Renderer};
use crate::config::{RendererConfig, WindowConfig};
use crate::gfx::{GlDriver, GraphicsApi, GraphicsError};
use crate::platform::{
    InputAction, KeyCode, OpenGlProfile, Platform, Size2D, Window, WindowHint, WindowRef,
};

/// Resolves the graphics API once the window's context is current
pub type GraphicsLoader = Box<dyn Fn(&WindowRef) -> Result<Rc<dyn GraphicsApi>, GraphicsError>>;

/// Input collected by callbacks during event processing, applied by
/// [`RenderWindow::begin_frame`]
#[derive(Debug, Default)]
struct FrameRequests {
    resize: Option<Size2D>,
    wireframe_toggles: usize,
}

/// A native window with a current GL context and the renderer drawing into it
pub struct RenderWindow {
    // Declared first so GL objects are released while the context still exists
    renderer: Renderer,
    window: Window,
    requests: Rc<RefCell<FrameRequests>>,
    framebuffer: Size2D,
}

impl RenderWindow {
    /// Loader resolving OpenGL through the window's context
    pub fn gl_loader() -> GraphicsLoader {
        Box::new(|window: &WindowRef| -> Result<Rc<dyn GraphicsApi>, GraphicsError> {
            let driver = GlDriver::load(|symbol| {
                window.proc_address(symbol).unwrap_or(std::ptr::null())
            })?;
            log::debug!("Using OpenGL {}", driver.version());
            Ok(Rc::new(driver))
        })
    }

    /// Create the window, load the graphics API and build the renderer
    pub fn new(
        platform: &Platform,
        window_config: &WindowConfig,
        renderer_config: &RendererConfig,
        loader: &GraphicsLoader,
    ) -> Result<Self, RenderError> {
        let (major, minor) = window_config.gl_version;
        let profile = if window_config.core_profile {
            OpenGlProfile::Core
        } else {
            OpenGlProfile::Any
        };
        platform.default_window_hints()?;
        platform.window_hint(WindowHint::ContextVersion(major, minor))?;
        platform.window_hint(WindowHint::OpenGlProfile(profile))?;
        platform.window_hint(WindowHint::Resizable(window_config.resizable))?;
        if cfg!(target_os = "macos") && window_config.core_profile {
            platform.window_hint(WindowHint::OpenGlForwardCompat(true))?;
        }

        let window = Window::new(
            platform,
            i32::try_from(window_config.width).unwrap_or(i32::MAX),
            i32::try_from(window_config.height).unwrap_or(i32::MAX),
            &window_config.title,
        )?;
        window.make_context_current()?;

        let gl = loader(&window)?;
        platform.set_swap_interval(window_config.swap_interval)?;

        let mut renderer = Renderer::new(gl, renderer_config)?;
        let framebuffer = window.framebuffer_size()?;
        renderer.set_window_size(framebuffer.width, framebuffer.height);

        let requests = Rc::new(RefCell::new(FrameRequests::default()));
        Self::register_callbacks(&window, &requests)?;

        println!("Key bindings:");
        println!("  Esc  quit");
        println!("  W    toggle wireframe mode");

        log::info!(
            "Render window \"{}\" ready ({}x{} framebuffer)",
            window_config.title,
            framebuffer.width,
            framebuffer.height
        );
        Ok(Self {
            renderer,
            window,
            requests,
            framebuffer,
        })
    }

    fn register_callbacks(
        window: &Window,
        requests: &Rc<RefCell<FrameRequests>>,
    ) -> Result<(), RenderError> {
        let pending = Rc::clone(requests);
        window.set_framebuffer_size_callback(move |_, width, height| {
            pending.borrow_mut().resize = Some(Size2D::new(width, height));
        })?;

        let pending = Rc::clone(requests);
        window.set_key_callback(move |window, key, scancode, action, _mods| {
            let name = window.platform().key_name(key, scancode).ok().flatten();
            println!("{}", key_event_line(name.as_deref(), scancode, action));

            if action != InputAction::Press {
                return;
            }
            match key {
                KeyCode::Escape => {
                    if let Err(e) = window.set_should_close(true) {
                        log::warn!("Failed to request close: {e}");
                    }
                }
                KeyCode::W => pending.borrow_mut().wireframe_toggles += 1,
                _ => {}
            }
        })?;
        Ok(())
    }

    /// Consult `allow_close` whenever the user asks to close the window;
    /// returning `false` keeps it open
    pub fn set_close_handler(
        &self,
        mut allow_close: impl FnMut() -> bool + 'static,
    ) -> Result<(), RenderError> {
        self.window.set_close_callback(move |window| {
            if !allow_close() {
                log::info!("Close request vetoed");
                if let Err(e) = window.set_should_close(false) {
                    log::warn!("Failed to cancel close: {e}");
                }
            }
        })?;
        Ok(())
    }

    /// False once the window has been asked to close
    pub fn keep_running(&self) -> Result<bool, RenderError> {
        Ok(!self.window.should_close()?)
    }

    /// Ask the loop to end after the current iteration
    pub fn stop(&self) -> Result<(), RenderError> {
        self.window.set_should_close(true)?;
        Ok(())
    }

    /// Apply input gathered since the last frame
    pub fn begin_frame(&mut self) {
        let FrameRequests {
            resize,
            wireframe_toggles,
        } = std::mem::take(&mut *self.requests.borrow_mut());

        if let Some(size) = resize {
            self.framebuffer = size;
            if size.is_empty() {
                log::debug!("Framebuffer is empty, keeping viewport");
            } else {
                self.renderer.set_window_size(size.width, size.height);
            }
        }

        for _ in 0..wireframe_toggles {
            let enabled = self.renderer.toggle_wireframe_mode();
            log::info!("Wireframe mode {}", if enabled { "on" } else { "off" });
        }
    }

    /// Present the frame
    pub fn end_frame(&self) -> Result<(), RenderError> {
        self.window.swap_buffers()?;
        Ok(())
    }

    /// Draw one complete frame and swap buffers
    pub fn draw_frame(&mut self) -> Result<(), RenderError> {
        self.begin_frame();
        self.renderer.draw_frame();
        self.end_frame()
    }

    /// Process pending events without blocking
    pub fn handle_events(&self) -> Result<(), RenderError> {
        self.window.platform().poll_events()?;
        Ok(())
    }

    /// Framebuffer size as of the last [`RenderWindow::begin_frame`]
    pub const fn framebuffer_size(&self) -> Size2D {
        self.framebuffer
    }

    /// The renderer
    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The native window
    pub const fn window(&self) -> &Window {
        &self.window
    }
}

/// Diagnostic line for a key event, naming the key when the layout has a name
/// for it and falling back to the scancode otherwise
fn key_event_line(name: Option<&str>, scancode: i32, action: InputAction) -> String {
    match name {
        Some(name) => format!("Key callback: '{name}' {}", action.describe()),
        None => format!("Key callback: {scancode} {}", action.describe()),
    }
}

impl std::fmt::Debug for RenderWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderWindow")
            .field("window", &self.window.handle())
            .field("framebuffer", &self.framebuffer)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}
