//! Window ownership and per-window operations
//!
//! [`Window`] owns one native window (and its context). Every operation lives
//! on [`WindowRef`], which `Window` dereferences to; callbacks receive a
//! temporary `WindowRef` for the window the event belongs to.
//!
//! # Lifecycle
//!
//! ```text
//! Window::new ──> [owned] ──take()──> [owned by the new value]
//!                    │                       │
//!                    ▼ drop                  ▼ drop
//!          callbacks forgotten,     (source is empty: drop is a no-op,
//!          native window destroyed   operations return EmptyHandle)
//! ```

use std::ffi::c_void;
use std::ops::Deref;
use std::path::PathBuf;

use super::backend::{MonitorId, NativeWindowing, WindowId};
use super::callbacks::{
    CharCallback, CharModsCallback, CursorEnterCallback, CursorPosCallback, DropCallback,
    FramebufferSizeCallback, KeyCallback, MouseButtonCallback, ScrollCallback,
    WindowCloseCallback, WindowFocusCallback, WindowIconifyCallback, WindowPosCallback,
    WindowRefreshCallback, WindowSizeCallback,
};
use super::cursor::Cursor;
use super::error::{WindowError, WindowResult};
use super::monitor::Monitor;
use super::types::{
    Area2D, CursorMode, EventKind, InputAction, InputMode, KeyCode, KeyModifiers, MouseButton,
    Point2D, RgbaPixels, Size2D, WindowAttribute, WindowCommand,
};
use super::Platform;

/// Non-owning access to a native window
pub struct WindowRef {
    platform: Platform,
    handle: Option<WindowId>,
}

/// An owned native window with its context
///
/// Not `Clone`: exactly one value owns the native window. Use
/// [`Window::take`] to move ownership out of a place that can't be moved from.
pub struct Window {
    inner: WindowRef,
}

fn positive(value: i32, what: &str) -> WindowResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| WindowError::InvalidArgument(format!("{what} must be positive, got {value}")))
}

fn size_limit(size: Option<Size2D>) -> WindowResult<Option<(u32, u32)>> {
    size.map(|s| {
        let width = u32::try_from(s.width);
        let height = u32::try_from(s.height);
        match (width, height) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(WindowError::InvalidArgument(format!(
                "size limit {}x{} is negative",
                s.width, s.height
            ))),
        }
    })
    .transpose()
}

impl Window {
    /// Create a windowed-mode window using the current hints
    pub fn new(platform: &Platform, width: i32, height: i32, title: &str) -> WindowResult<Self> {
        Self::create(platform, width, height, title, None, None)
    }

    /// Create a full screen window on `monitor`
    pub fn new_fullscreen(
        platform: &Platform,
        width: i32,
        height: i32,
        title: &str,
        monitor: &Monitor,
    ) -> WindowResult<Self> {
        Self::create(platform, width, height, title, Some(monitor.id()), None)
    }

    /// Create a window whose context shares objects with `share`
    pub fn new_shared(
        platform: &Platform,
        width: i32,
        height: i32,
        title: &str,
        share: &WindowRef,
    ) -> WindowResult<Self> {
        let share = share.id()?;
        Self::create(platform, width, height, title, None, Some(share))
    }

    fn create(
        platform: &Platform,
        width: i32,
        height: i32,
        title: &str,
        monitor: Option<MonitorId>,
        share: Option<WindowId>,
    ) -> WindowResult<Self> {
        let w = positive(width, "window width")?;
        let h = positive(height, "window height")?;
        let handle = platform.create("window", |backend| {
            backend.create_window(w, h, title, monitor, share)
        })?;
        platform.track_window(handle);
        log::debug!("Created window {handle:?} ({width}x{height}, \"{title}\")");
        Ok(Self {
            inner: WindowRef {
                platform: platform.clone(),
                handle: Some(handle),
            },
        })
    }

    /// Move the native window out, leaving this value empty
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            inner: WindowRef {
                platform: self.inner.platform.clone(),
                handle: self.inner.handle.take(),
            },
        }
    }
}

impl Deref for Window {
    type Target = WindowRef;

    fn deref(&self) -> &WindowRef {
        &self.inner
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.handle.take() {
            self.inner.platform.forget_window(handle);
            match self.inner.platform.call(|backend| backend.destroy_window(handle)) {
                Ok(()) => log::debug!("Destroyed window {handle:?}"),
                Err(e) => log::warn!("Failed to destroy window: {e}"),
            }
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window").field("handle", &self.inner.handle).finish()
    }
}

impl std::fmt::Debug for WindowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRef").field("handle", &self.handle).finish()
    }
}

impl WindowRef {
    pub(crate) const fn borrowed(platform: Platform, handle: WindowId) -> Self {
        Self {
            platform,
            handle: Some(handle),
        }
    }

    /// Native handle, `None` once the owning window was moved out
    pub const fn handle(&self) -> Option<WindowId> {
        self.handle
    }

    /// True once the owning window was moved out
    pub const fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    /// Library context this window belongs to
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    fn id(&self) -> WindowResult<WindowId> {
        self.handle.ok_or(WindowError::EmptyHandle("window"))
    }

    fn with<R>(&self, f: impl FnOnce(&mut dyn NativeWindowing, WindowId) -> R) -> WindowResult<R> {
        let id = self.id()?;
        self.platform.call(|backend| f(backend, id))
    }

    /// Close flag
    pub fn should_close(&self) -> WindowResult<bool> {
        self.with(|b, w| b.should_close(w))
    }

    /// Set or clear the close flag
    pub fn set_should_close(&self, value: bool) -> WindowResult<()> {
        self.with(|b, w| b.set_should_close(w, value))
    }

    /// Change the title
    pub fn set_title(&self, title: &str) -> WindowResult<()> {
        self.with(|b, w| b.set_title(w, title))
    }

    /// Set the icon; the system picks the candidate closest to the size it needs
    pub fn set_icon(&self, candidates: &[RgbaPixels]) -> WindowResult<()> {
        self.with(|b, w| b.set_icon(w, candidates))
    }

    /// Revert to the default icon
    pub fn reset_icon(&self) -> WindowResult<()> {
        self.with(|b, w| b.set_icon(w, &[]))
    }

    /// Position of the content area
    pub fn position(&self) -> WindowResult<Point2D<i32>> {
        let (x, y) = self.with(|b, w| b.window_pos(w))?;
        Ok(Point2D::new(x, y))
    }

    /// Move the content area
    pub fn set_position(&self, position: Point2D<i32>) -> WindowResult<()> {
        self.with(|b, w| b.set_window_pos(w, position.x, position.y))
    }

    /// Size of the content area in screen coordinates
    pub fn size(&self) -> WindowResult<Size2D> {
        let (width, height) = self.with(|b, w| b.window_size(w))?;
        Ok(Size2D::new(width, height))
    }

    /// Resize the content area
    pub fn set_size(&self, size: Size2D) -> WindowResult<()> {
        positive(size.width, "window width")?;
        positive(size.height, "window height")?;
        self.with(|b, w| b.set_window_size(w, size.width, size.height))
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> WindowResult<Size2D> {
        let (width, height) = self.with(|b, w| b.framebuffer_size(w))?;
        Ok(Size2D::new(width, height))
    }

    /// Thickness of each frame edge around the content area
    pub fn frame_size(&self) -> WindowResult<Area2D> {
        let (left, top, right, bottom) = self.with(|b, w| b.frame_size(w))?;
        Ok(Area2D::new(left, top, right, bottom))
    }

    /// Limit the content area size, `None` leaves that bound open
    pub fn set_size_limits(&self, min: Option<Size2D>, max: Option<Size2D>) -> WindowResult<()> {
        let min = size_limit(min)?;
        let max = size_limit(max)?;
        self.with(|b, w| b.set_size_limits(w, min, max))
    }

    /// Force an aspect ratio on the content area
    pub fn set_aspect_ratio(&self, numerator: i32, denominator: i32) -> WindowResult<()> {
        let numerator = positive(numerator, "aspect ratio numerator")?;
        let denominator = positive(denominator, "aspect ratio denominator")?;
        self.with(|b, w| b.set_aspect_ratio(w, numerator, denominator))
    }

    /// Minimize
    pub fn iconify(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Iconify))
    }

    /// Undo iconify or maximize
    pub fn restore(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Restore))
    }

    /// Maximize
    pub fn maximize(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Maximize))
    }

    /// Make visible
    pub fn show(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Show))
    }

    /// Hide
    pub fn hide(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Hide))
    }

    /// Bring to front and take input focus
    pub fn focus(&self) -> WindowResult<()> {
        self.with(|b, w| b.window_command(w, WindowCommand::Focus))
    }

    /// Monitor used in full screen mode, `None` when windowed
    pub fn monitor(&self) -> WindowResult<Option<Monitor>> {
        let monitor = self.with(|b, w| b.window_monitor(w))?;
        Ok(monitor.map(|id| Monitor::new(self.platform.clone(), id)))
    }

    /// Switch to full screen on `monitor`, or back to windowed mode with `None`
    ///
    /// `position` only applies in windowed mode, `refresh_rate` only in full screen.
    pub fn set_monitor(
        &self,
        monitor: Option<&Monitor>,
        position: Point2D<i32>,
        size: Size2D,
        refresh_rate: Option<u32>,
    ) -> WindowResult<()> {
        let width = positive(size.width, "window width")?;
        let height = positive(size.height, "window height")?;
        let monitor = monitor.map(Monitor::id);
        self.with(|b, w| {
            b.set_window_monitor(w, monitor, position.x, position.y, width, height, refresh_rate);
        })
    }

    /// Integer value of a window or context attribute
    pub fn int_attribute(&self, attribute: WindowAttribute) -> WindowResult<i32> {
        self.with(|b, w| b.window_attrib(w, attribute as i32))
    }

    /// Boolean value of a window or context attribute
    pub fn bool_attribute(&self, attribute: WindowAttribute) -> WindowResult<bool> {
        Ok(self.int_attribute(attribute)? != 0)
    }

    /// Present the back buffer
    pub fn swap_buffers(&self) -> WindowResult<()> {
        self.with(|b, w| b.swap_buffers(w))
    }

    /// Integer value of an input mode
    pub fn int_input_mode(&self, mode: InputMode) -> WindowResult<i32> {
        self.with(|b, w| b.input_mode(w, mode as i32))
    }

    /// Boolean value of an input mode
    pub fn bool_input_mode(&self, mode: InputMode) -> WindowResult<bool> {
        Ok(self.int_input_mode(mode)? != 0)
    }

    /// Current cursor mode
    pub fn cursor_mode(&self) -> WindowResult<CursorMode> {
        Ok(CursorMode::from_raw(self.int_input_mode(InputMode::Cursor)?))
    }

    /// Show, hide or capture the cursor
    pub fn set_cursor_mode(&self, mode: CursorMode) -> WindowResult<()> {
        self.with(|b, w| b.set_input_mode(w, InputMode::Cursor as i32, mode as i32))
    }

    /// Keep key presses until they are queried
    pub fn set_sticky_keys(&self, enabled: bool) -> WindowResult<()> {
        self.with(|b, w| b.set_input_mode(w, InputMode::StickyKeys as i32, i32::from(enabled)))
    }

    /// Keep mouse button presses until they are queried
    pub fn set_sticky_mouse_buttons(&self, enabled: bool) -> WindowResult<()> {
        self.with(|b, w| {
            b.set_input_mode(w, InputMode::StickyMouseButtons as i32, i32::from(enabled));
        })
    }

    /// Last reported state of a key
    pub fn key(&self, key: KeyCode) -> WindowResult<InputAction> {
        if key == KeyCode::Unknown {
            return Err(WindowError::InvalidArgument("cannot query an unknown key".to_string()));
        }
        Ok(InputAction::from_raw(self.with(|b, w| b.key_state(w, key.raw()))?))
    }

    /// Last reported state of a mouse button
    pub fn mouse_button(&self, button: MouseButton) -> WindowResult<InputAction> {
        Ok(InputAction::from_raw(
            self.with(|b, w| b.mouse_button_state(w, button.raw()))?,
        ))
    }

    /// Cursor position relative to the content area
    pub fn cursor_position(&self) -> WindowResult<Point2D<f64>> {
        let (x, y) = self.with(|b, w| b.cursor_pos(w))?;
        Ok(Point2D::new(x, y))
    }

    /// Move the cursor
    pub fn set_cursor_position(&self, position: Point2D<f64>) -> WindowResult<()> {
        self.with(|b, w| b.set_cursor_pos(w, position.x, position.y))
    }

    /// Use `cursor` while the pointer is over this window
    pub fn set_cursor(&self, cursor: &Cursor) -> WindowResult<()> {
        let cursor = cursor.handle().ok_or(WindowError::EmptyHandle("cursor"))?;
        self.with(|b, w| b.set_cursor(w, Some(cursor)))
    }

    /// Revert to the default arrow
    pub fn unset_cursor(&self) -> WindowResult<()> {
        self.with(|b, w| b.set_cursor(w, None))
    }

    /// Clipboard contents as UTF-8
    pub fn clipboard_string(&self) -> WindowResult<Option<String>> {
        self.with(|b, w| b.clipboard_string(w))
    }

    /// Replace the clipboard contents
    pub fn set_clipboard_string(&self, value: &str) -> WindowResult<()> {
        self.with(|b, w| b.set_clipboard_string(w, value))
    }

    /// Make this window's context current on the calling thread
    pub fn make_context_current(&self) -> WindowResult<()> {
        let id = self.id()?;
        self.platform.call(|b| b.make_context_current(Some(id)))
    }

    /// Whether this window's context is current
    pub fn is_context_current(&self) -> WindowResult<bool> {
        let id = self.id()?;
        Ok(self.platform.call(|b| b.current_context())? == Some(id))
    }

    /// Address of an OpenGL function; this window's context must be current
    pub fn proc_address(&self, name: &str) -> WindowResult<*const c_void> {
        self.with(|b, _| b.proc_address(name))
    }
}

macro_rules! callback_accessors {
    ($(
        $(#[$doc:meta])*
        $set:ident / $unset:ident => $slot:ident, $kind:ident, $alias:ty, ($($arg:ty),*);
    )*) => {
        impl WindowRef {
            $(
                $(#[$doc])*
                pub fn $set(
                    &self,
                    callback: impl FnMut(&WindowRef $(, $arg)*) + 'static,
                ) -> WindowResult<()> {
                    let callback: Box<$alias> = Box::new(callback);
                    self.platform
                        .set_window_callback(self.id()?, EventKind::$kind, |c| &mut c.$slot, callback)
                }

                #[doc = concat!("Remove the closure installed by [`WindowRef::", stringify!($set), "`]")]
                pub fn $unset(&self) -> WindowResult<()> {
                    self.platform
                        .unset_window_callback(self.id()?, EventKind::$kind, |c| &mut c.$slot)
                }
            )*
        }
    };
}

callback_accessors! {
    /// Called when the window moves
    set_pos_callback / unset_pos_callback => window_pos, WindowPos, WindowPosCallback, (i32, i32);
    /// Called when the window is resized
    set_size_callback / unset_size_callback => window_size, WindowSize, WindowSizeCallback, (i32, i32);
    /// Called when the user asks to close the window; the close flag is already
    /// set and may be cleared again to veto
    set_close_callback / unset_close_callback => close, Close, WindowCloseCallback, ();
    /// Called when the contents need redrawing
    set_refresh_callback / unset_refresh_callback => refresh, Refresh, WindowRefreshCallback, ();
    /// Called when the window gains or loses focus
    set_focus_callback / unset_focus_callback => focus, Focus, WindowFocusCallback, (bool);
    /// Called when the window is iconified or restored
    set_iconify_callback / unset_iconify_callback => iconify, Iconify, WindowIconifyCallback, (bool);
    /// Called when the framebuffer is resized
    set_framebuffer_size_callback / unset_framebuffer_size_callback =>
        framebuffer_size, FramebufferSize, FramebufferSizeCallback, (i32, i32);
    /// Called for every physical key press, repeat and release
    set_key_callback / unset_key_callback =>
        key, Key, KeyCallback, (KeyCode, i32, InputAction, KeyModifiers);
    /// Called for every Unicode character typed
    set_char_callback / unset_char_callback => char, Char, CharCallback, (char);
    /// Called for every Unicode character typed, with modifiers
    set_char_mods_callback / unset_char_mods_callback =>
        char_mods, CharMods, CharModsCallback, (char, KeyModifiers);
    /// Called for every mouse button press and release
    set_mouse_button_callback / unset_mouse_button_callback =>
        mouse_button, MouseButton, MouseButtonCallback, (MouseButton, InputAction, KeyModifiers);
    /// Called when the cursor moves
    set_cursor_pos_callback / unset_cursor_pos_callback =>
        cursor_pos, CursorPos, CursorPosCallback, (f64, f64);
    /// Called when the cursor enters or leaves the content area
    set_cursor_enter_callback / unset_cursor_enter_callback =>
        cursor_enter, CursorEnter, CursorEnterCallback, (bool);
    /// Called on scroll input
    set_scroll_callback / unset_scroll_callback => scroll, Scroll, ScrollCallback, (f64, f64);
    /// Called when files are dropped onto the window
    set_drop_callback / unset_drop_callback => drop, Drop, DropCallback, (&[PathBuf]);
}
