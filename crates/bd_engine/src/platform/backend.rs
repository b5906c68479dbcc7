//! Native windowing library contract
//!
//! This module defines the trait that every windowing backend implements. The
//! trait mirrors the shape of the native C API: free functions that take an
//! opaque handle. The safe owner types in this crate ([`Window`], [`Cursor`],
//! [`Monitor`]) are the only callers.
//!
//! Raw values (key codes, actions, attribute ids) cross this boundary as
//! integers, exactly as the native library reports them. Translation into
//! typed values happens in the callback trampolines, not in the backend.
//!
//! # Thread Safety
//! Backends are not `Send`. The native library requires nearly every call to
//! happen on the thread that initialized it.
//!
//! [`Window`]: super::Window
//! [`Cursor`]: super::Cursor
//! [`Monitor`]: super::Monitor

use std::ffi::c_void;
use std::path::PathBuf;

use slotmap::new_key_type;

use super::error::{NativeFailure, WindowError};
use super::types::{
    CursorShape, EventKind, GammaRamp, MonitorInfo, RgbaPixels, WindowCommand, WindowHint,
};

new_key_type! {
    /// Opaque native window handle
    pub struct WindowId;
    /// Opaque native cursor handle
    pub struct CursorId;
    /// Opaque native monitor handle
    pub struct MonitorId;
}

/// An event as the native library delivers it, before translation
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// Window moved
    WindowPos {
        /// Source window
        window: WindowId,
        /// New x position
        x: i32,
        /// New y position
        y: i32,
    },
    /// Window resized
    WindowSize {
        /// Source window
        window: WindowId,
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Close requested; the close flag is already set when this arrives
    Close {
        /// Source window
        window: WindowId,
    },
    /// Contents damaged
    Refresh {
        /// Source window
        window: WindowId,
    },
    /// Focus changed, `focused` is the native boolean (1 = true)
    Focus {
        /// Source window
        window: WindowId,
        /// Native boolean
        focused: i32,
    },
    /// Iconify state changed, `iconified` is the native boolean
    Iconify {
        /// Source window
        window: WindowId,
        /// Native boolean
        iconified: i32,
    },
    /// Framebuffer resized
    FramebufferSize {
        /// Source window
        window: WindowId,
        /// New width in pixels
        width: i32,
        /// New height in pixels
        height: i32,
    },
    /// Key event with raw key, action and modifier values
    Key {
        /// Source window
        window: WindowId,
        /// Raw key code
        key: i32,
        /// Platform scancode
        scancode: i32,
        /// Raw action
        action: i32,
        /// Raw modifier bits
        mods: i32,
    },
    /// Unicode code point
    Char {
        /// Source window
        window: WindowId,
        /// Code point
        codepoint: u32,
    },
    /// Unicode code point with raw modifier bits
    CharMods {
        /// Source window
        window: WindowId,
        /// Code point
        codepoint: u32,
        /// Raw modifier bits
        mods: i32,
    },
    /// Mouse button event with raw values
    MouseButton {
        /// Source window
        window: WindowId,
        /// Raw button index
        button: i32,
        /// Raw action
        action: i32,
        /// Raw modifier bits
        mods: i32,
    },
    /// Cursor moved
    CursorPos {
        /// Source window
        window: WindowId,
        /// New x position
        x: f64,
        /// New y position
        y: f64,
    },
    /// Cursor entered (1) or left (0)
    CursorEnter {
        /// Source window
        window: WindowId,
        /// Native boolean
        entered: i32,
    },
    /// Scroll offsets
    Scroll {
        /// Source window
        window: WindowId,
        /// Horizontal offset
        x: f64,
        /// Vertical offset
        y: f64,
    },
    /// Files dropped
    Drop {
        /// Source window
        window: WindowId,
        /// Dropped paths
        paths: Vec<PathBuf>,
    },
    /// Monitor configuration change, `event` is the raw connection value
    Monitor {
        /// Affected monitor
        monitor: MonitorId,
        /// Raw connection event
        event: i32,
    },
    /// Joystick configuration change, raw joystick id and connection value
    Joystick {
        /// Raw joystick id
        joystick: i32,
        /// Raw connection event
        event: i32,
    },
}

impl NativeEvent {
    /// Window the event belongs to, `None` for library-wide events
    pub const fn window(&self) -> Option<WindowId> {
        match self {
            Self::WindowPos { window, .. }
            | Self::WindowSize { window, .. }
            | Self::Close { window }
            | Self::Refresh { window }
            | Self::Focus { window, .. }
            | Self::Iconify { window, .. }
            | Self::FramebufferSize { window, .. }
            | Self::Key { window, .. }
            | Self::Char { window, .. }
            | Self::CharMods { window, .. }
            | Self::MouseButton { window, .. }
            | Self::CursorPos { window, .. }
            | Self::CursorEnter { window, .. }
            | Self::Scroll { window, .. }
            | Self::Drop { window, .. } => Some(*window),
            Self::Monitor { .. } | Self::Joystick { .. } => None,
        }
    }

    /// Callback slot the event is routed to, `None` for library-wide events
    pub const fn kind(&self) -> Option<EventKind> {
        match self {
            Self::WindowPos { .. } => Some(EventKind::WindowPos),
            Self::WindowSize { .. } => Some(EventKind::WindowSize),
            Self::Close { .. } => Some(EventKind::Close),
            Self::Refresh { .. } => Some(EventKind::Refresh),
            Self::Focus { .. } => Some(EventKind::Focus),
            Self::Iconify { .. } => Some(EventKind::Iconify),
            Self::FramebufferSize { .. } => Some(EventKind::FramebufferSize),
            Self::Key { .. } => Some(EventKind::Key),
            Self::Char { .. } => Some(EventKind::Char),
            Self::CharMods { .. } => Some(EventKind::CharMods),
            Self::MouseButton { .. } => Some(EventKind::MouseButton),
            Self::CursorPos { .. } => Some(EventKind::CursorPos),
            Self::CursorEnter { .. } => Some(EventKind::CursorEnter),
            Self::Scroll { .. } => Some(EventKind::Scroll),
            Self::Drop { .. } => Some(EventKind::Drop),
            Self::Monitor { .. } | Self::Joystick { .. } => None,
        }
    }
}

/// Contract for native windowing backends
///
/// Calls that can fail record a [`NativeFailure`] which the caller drains with
/// [`NativeWindowing::take_error`] immediately after the call. This mirrors the
/// native library's global error callback.
pub trait NativeWindowing {
    /// One-time library initialization; calling it again is a no-op
    fn init(&mut self) -> Result<(), WindowError>;

    /// Library teardown; must tolerate repeated calls
    fn terminate(&mut self);

    /// Drain the error recorded since the last call, if any
    fn take_error(&mut self) -> Option<NativeFailure>;

    /// Version string of the native library
    fn version_string(&self) -> String;

    // -- Window creation

    /// Reset all window hints to their defaults
    fn default_window_hints(&mut self);

    /// Set a hint for the next window creation
    fn window_hint(&mut self, hint: WindowHint);

    /// Create a window and its context; `None` on failure (error recorded)
    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        monitor: Option<MonitorId>,
        share: Option<WindowId>,
    ) -> Option<WindowId>;

    /// Destroy a window and its context
    fn destroy_window(&mut self, window: WindowId);

    // -- Window properties

    /// Close flag
    fn should_close(&self, window: WindowId) -> bool;

    /// Set the close flag
    fn set_should_close(&mut self, window: WindowId, value: bool);

    /// Set the title
    fn set_title(&mut self, window: WindowId, title: &str);

    /// Set the icon candidates; an empty slice restores the default icon
    fn set_icon(&mut self, window: WindowId, images: &[RgbaPixels]);

    /// Position of the content area
    fn window_pos(&self, window: WindowId) -> (i32, i32);

    /// Move the content area
    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32);

    /// Size of the content area in screen coordinates
    fn window_size(&self, window: WindowId) -> (i32, i32);

    /// Resize the content area
    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32);

    /// Framebuffer size in pixels
    fn framebuffer_size(&self, window: WindowId) -> (i32, i32);

    /// Frame edges (left, top, right, bottom)
    fn frame_size(&self, window: WindowId) -> (i32, i32, i32, i32);

    /// Size limits of the content area, `None` meaning don't care
    fn set_size_limits(
        &mut self,
        window: WindowId,
        min: Option<(u32, u32)>,
        max: Option<(u32, u32)>,
    );

    /// Required aspect ratio of the content area
    fn set_aspect_ratio(&mut self, window: WindowId, numerator: u32, denominator: u32);

    /// Iconify, restore, maximize, show, hide or focus
    fn window_command(&mut self, window: WindowId, command: WindowCommand);

    /// Monitor used for full screen mode, `None` when windowed
    fn window_monitor(&self, window: WindowId) -> Option<MonitorId>;

    /// Switch between windowed and full screen mode
    fn set_window_monitor(
        &mut self,
        window: WindowId,
        monitor: Option<MonitorId>,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        refresh_rate: Option<u32>,
    );

    /// Raw window attribute value
    fn window_attrib(&self, window: WindowId, attrib: i32) -> i32;

    /// Present the back buffer
    fn swap_buffers(&mut self, window: WindowId);

    /// Register or clear the native callback for an event type
    fn set_event_enabled(&mut self, window: WindowId, kind: EventKind, enabled: bool);

    // -- Input

    /// Raw input mode value
    fn input_mode(&self, window: WindowId, mode: i32) -> i32;

    /// Set a raw input mode value
    fn set_input_mode(&mut self, window: WindowId, mode: i32, value: i32);

    /// Last raw action for a key
    fn key_state(&self, window: WindowId, key: i32) -> i32;

    /// Last raw action for a mouse button
    fn mouse_button_state(&self, window: WindowId, button: i32) -> i32;

    /// Cursor position relative to the content area
    fn cursor_pos(&self, window: WindowId) -> (f64, f64);

    /// Move the cursor
    fn set_cursor_pos(&mut self, window: WindowId, x: f64, y: f64);

    /// Use a cursor over the window, `None` for the default arrow
    fn set_cursor(&mut self, window: WindowId, cursor: Option<CursorId>);

    /// Clipboard contents
    fn clipboard_string(&self, window: WindowId) -> Option<String>;

    /// Replace clipboard contents
    fn set_clipboard_string(&mut self, window: WindowId, value: &str);

    // -- Events

    /// Process pending events without blocking and return them in order
    fn poll_events(&mut self) -> Vec<NativeEvent>;

    /// Block until at least one event arrives or the timeout (seconds) elapses
    fn wait_events(&mut self, timeout: Option<f64>) -> Vec<NativeEvent>;

    /// Wake a thread blocked in [`NativeWindowing::wait_events`]
    fn post_empty_event(&mut self);

    // -- Context

    /// Make a window's context current, `None` to detach
    fn make_context_current(&mut self, window: Option<WindowId>);

    /// Window whose context is current
    fn current_context(&self) -> Option<WindowId>;

    /// Buffer swap interval for the current context
    fn set_swap_interval(&mut self, interval: i32);

    /// Whether a client API extension is supported by the current context
    fn extension_supported(&self, name: &str) -> bool;

    /// Address of a client API function for the current context
    fn proc_address(&mut self, name: &str) -> *const c_void;

    // -- Monitors

    /// Connected monitors, primary first
    fn monitors(&mut self) -> Vec<MonitorId>;

    /// Primary monitor
    fn primary_monitor(&mut self) -> Option<MonitorId>;

    /// Snapshot of a monitor's properties
    fn monitor_info(&mut self, monitor: MonitorId) -> Option<MonitorInfo>;

    /// Current gamma ramp, `None` when the platform has no gamma support
    fn gamma_ramp(&mut self, monitor: MonitorId) -> Option<GammaRamp>;

    /// Replace the gamma ramp; channels have equal, non-zero length
    fn set_gamma_ramp(&mut self, monitor: MonitorId, ramp: &GammaRamp);

    /// Apply a power curve with a positive, finite exponent
    fn set_gamma(&mut self, monitor: MonitorId, gamma: f32);

    // -- Cursors

    /// Create a cursor with a standard shape
    fn create_standard_cursor(&mut self, shape: CursorShape) -> Option<CursorId>;

    /// Create a cursor from an image and hot spot
    fn create_cursor(&mut self, image: &RgbaPixels, x_hot: i32, y_hot: i32) -> Option<CursorId>;

    /// Destroy a cursor
    fn destroy_cursor(&mut self, cursor: CursorId);

    // -- Keyboard, joysticks, time

    /// Layout-specific name of a printable key
    fn key_name(&self, key: i32, scancode: i32) -> Option<String>;

    /// Whether a joystick is connected
    fn joystick_present(&self, joystick: i32) -> bool;

    /// Joystick axis values in `[-1, 1]`
    fn joystick_axes(&self, joystick: i32) -> Vec<f32>;

    /// Raw joystick button actions
    fn joystick_buttons(&self, joystick: i32) -> Vec<i32>;

    /// Joystick name
    fn joystick_name(&self, joystick: i32) -> Option<String>;

    /// Seconds since initialization or the last [`NativeWindowing::set_time`]
    fn time(&self) -> f64;

    /// Reset the timer
    fn set_time(&mut self, seconds: f64);

    /// Raw high resolution timer value
    fn timer_value(&self) -> u64;

    /// Ticks per second of the raw timer
    fn timer_frequency(&self) -> u64;
}
