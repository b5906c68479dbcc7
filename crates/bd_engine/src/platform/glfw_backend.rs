//! GLFW implementation of [`NativeWindowing`]
//!
//! Window events arrive through the per-window channels of the `glfw` crate
//! and are merged in timestamp order. Monitor and joystick connection changes
//! come from GLFW's connection callbacks and are queued until the next event
//! pass. Monitors are identified by their native pointer, which GLFW keeps
//! stable from connection until disconnection.

use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::os::raw::{c_int, c_uint, c_ushort};
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use glfw::Context as _;
use slotmap::SlotMap;

use super::backend::{CursorId, MonitorId, NativeEvent, NativeWindowing, WindowId};
use super::error::{ErrorCode, NativeFailure, WindowError};
use super::types::{
    ConnectionEvent, CursorShape, EventKind, GammaRamp, MonitorInfo, OpenGlProfile, Point2D,
    RgbaPixels, Size2D, VideoMode, WindowCommand, WindowHint,
};

type MonitorPtr = *mut glfw::ffi::GLFWmonitor;

/// A connection change reported by GLFW, `true` when connected
enum Connection {
    Monitor(MonitorPtr, bool),
    Joystick(c_int, bool),
}

thread_local! {
    static PENDING_ERROR: RefCell<Option<NativeFailure>> = const { RefCell::new(None) };
    static PENDING_CONNECTIONS: RefCell<Vec<Connection>> = const { RefCell::new(Vec::new()) };
}

/// Thread that first initialized GLFW in this process
static INIT_THREAD: OnceLock<ThreadId> = OnceLock::new();

fn record_glfw_error(error: glfw::Error, description: String) {
    record(ErrorCode::from_raw(error as i32), description);
}

fn record(code: ErrorCode, description: impl Into<String>) {
    let failure = NativeFailure::new(code, description);
    PENDING_ERROR.with(|pending| *pending.borrow_mut() = Some(failure));
}

fn unknown_window() {
    record(ErrorCode::InvalidValue, "unknown window handle");
}

fn not_initialized() {
    record(ErrorCode::NotInitialized, "GLFW is not initialized");
}

fn queue_connection(connection: Connection) {
    PENDING_CONNECTIONS.with(|pending| pending.borrow_mut().push(connection));
}

// glfw::Monitor keeps its pointer private, so monitor changes use the raw callback
extern "C" fn monitor_changed(monitor: MonitorPtr, event: c_int) {
    queue_connection(Connection::Monitor(monitor, event == glfw::ffi::CONNECTED));
}

/// Monitors in GLFW's order, primary first
fn connected_monitors() -> Vec<MonitorPtr> {
    let mut count: c_int = 0;
    let monitors = unsafe { glfw::ffi::glfwGetMonitors(&mut count) };
    if monitors.is_null() {
        return Vec::new();
    }
    let len = usize::try_from(count).unwrap_or(0);
    unsafe { std::slice::from_raw_parts(monitors, len) }.to_vec()
}

struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    cursor: Option<CursorId>,
}

/// Monitor ids keyed by native pointer
#[derive(Default)]
struct MonitorTable {
    ids: SlotMap<MonitorId, MonitorPtr>,
}

impl MonitorTable {
    fn find(&self, ptr: MonitorPtr) -> Option<MonitorId> {
        self.ids.iter().find(|(_, known)| **known == ptr).map(|(id, _)| id)
    }

    fn get(&self, id: MonitorId) -> Option<MonitorPtr> {
        self.ids.get(id).copied()
    }

    /// Id for a newly connected monitor, `None` if it is already known
    fn connect(&mut self, ptr: MonitorPtr) -> Option<MonitorId> {
        if ptr.is_null() || self.find(ptr).is_some() {
            return None;
        }
        Some(self.ids.insert(ptr))
    }

    fn disconnect(&mut self, ptr: MonitorPtr) -> Option<MonitorId> {
        let id = self.find(ptr)?;
        self.ids.remove(id);
        Some(id)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn clear(&mut self) {
        self.ids.clear();
    }
}

/// GLFW backend
///
/// `glfw::Cursor` values are owned by whichever window currently shows them,
/// so each cursor slot is empty while the cursor is lent to a window.
#[derive(Default)]
pub struct GlfwBackend {
    glfw: Option<glfw::Glfw>,
    windows: SlotMap<WindowId, GlfwWindow>,
    cursors: SlotMap<CursorId, Option<glfw::Cursor>>,
    monitors: MonitorTable,
    current: Option<WindowId>,
}

impl GlfwBackend {
    /// Backend that initializes GLFW on [`NativeWindowing::init`]
    pub fn new() -> Self {
        Self::default()
    }

    fn glfw(&self) -> Option<&glfw::Glfw> {
        let glfw = self.glfw.as_ref();
        if glfw.is_none() {
            not_initialized();
        }
        glfw
    }

    fn glfw_mut(&mut self) -> Option<&mut glfw::Glfw> {
        let glfw = self.glfw.as_mut();
        if glfw.is_none() {
            not_initialized();
        }
        glfw
    }

    fn with_window<R: Default>(&self, id: WindowId, f: impl FnOnce(&GlfwWindow) -> R) -> R {
        self.windows.get(id).map_or_else(
            || {
                unknown_window();
                R::default()
            },
            f,
        )
    }

    fn with_window_mut(&mut self, id: WindowId, f: impl FnOnce(&mut GlfwWindow)) {
        match self.windows.get_mut(id) {
            Some(record) => f(record),
            None => unknown_window(),
        }
    }

    /// Native pointer of a known monitor
    fn known_monitor(&self, monitor: MonitorId) -> Option<MonitorPtr> {
        self.glfw()?;
        self.monitors.get(monitor)
    }

    /// Position of a monitor in the list `with_connected_monitors` hands out
    fn monitor_index(&self, monitor: MonitorId) -> Option<usize> {
        let index = self.known_monitor(monitor).and_then(|ptr| {
            connected_monitors().iter().position(|connected| *connected == ptr)
        });
        if index.is_none() {
            record(ErrorCode::InvalidValue, "monitor is not connected");
        }
        index
    }

    /// Turn queued connection changes into events
    fn take_connections(&mut self) -> Vec<NativeEvent> {
        let connections = PENDING_CONNECTIONS.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
        let connection_event = |connected: bool| {
            if connected {
                ConnectionEvent::CONNECTED
            } else {
                ConnectionEvent::DISCONNECTED
            }
        };

        let mut events = Vec::new();
        for connection in connections {
            match connection {
                Connection::Monitor(ptr, true) => {
                    if let Some(monitor) = self.monitors.connect(ptr) {
                        events.push(NativeEvent::Monitor {
                            monitor,
                            event: ConnectionEvent::CONNECTED,
                        });
                    }
                }
                Connection::Monitor(ptr, false) => {
                    if let Some(monitor) = self.monitors.disconnect(ptr) {
                        events.push(NativeEvent::Monitor {
                            monitor,
                            event: ConnectionEvent::DISCONNECTED,
                        });
                    }
                }
                Connection::Joystick(joystick, connected) => events.push(NativeEvent::Joystick {
                    joystick,
                    event: connection_event(connected),
                }),
            }
        }
        events
    }

    fn collect_events(&mut self) -> Vec<NativeEvent> {
        let mut stamped = Vec::new();
        for (id, record) in &self.windows {
            for (time, event) in glfw::flush_messages(&record.events) {
                if let Some(event) = translate_event(id, event) {
                    stamped.push((time, event));
                }
            }
        }
        stamped.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut events = self.take_connections();
        events.extend(stamped.into_iter().map(|(_, event)| event));
        events
    }

    /// Give a lent cursor back to its slot
    fn reclaim_cursor(cursors: &mut SlotMap<CursorId, Option<glfw::Cursor>>, record: &mut GlfwWindow) {
        if let Some(id) = record.cursor.take() {
            let cursor = record.window.set_cursor(None);
            if let Some(slot) = cursors.get_mut(id) {
                *slot = cursor;
            }
        }
    }
}

fn joystick_present(joystick: c_int) -> bool {
    unsafe { glfw::ffi::glfwJoystickPresent(joystick) != 0 }
}

fn gamma_channel(data: *const c_ushort, size: usize) -> Vec<u16> {
    if data.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(data, size) }.to_vec()
    }
}

fn c_string(ptr: *const std::os::raw::c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: GLFW returns NUL terminated UTF-8 valid until the next call
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

fn translate_event(window: WindowId, event: glfw::WindowEvent) -> Option<NativeEvent> {
    use glfw::WindowEvent as E;

    Some(match event {
        E::Pos(x, y) => NativeEvent::WindowPos { window, x, y },
        E::Size(width, height) => NativeEvent::WindowSize { window, width, height },
        E::Close => NativeEvent::Close { window },
        E::Refresh => NativeEvent::Refresh { window },
        E::Focus(focused) => NativeEvent::Focus {
            window,
            focused: i32::from(focused),
        },
        E::Iconify(iconified) => NativeEvent::Iconify {
            window,
            iconified: i32::from(iconified),
        },
        E::FramebufferSize(width, height) => NativeEvent::FramebufferSize { window, width, height },
        E::Key(key, scancode, action, mods) => NativeEvent::Key {
            window,
            key: key as i32,
            scancode,
            action: action as i32,
            mods: mods.bits(),
        },
        E::Char(ch) => NativeEvent::Char {
            window,
            codepoint: u32::from(ch),
        },
        E::CharModifiers(ch, mods) => NativeEvent::CharMods {
            window,
            codepoint: u32::from(ch),
            mods: mods.bits(),
        },
        E::MouseButton(button, action, mods) => NativeEvent::MouseButton {
            window,
            button: button as i32,
            action: action as i32,
            mods: mods.bits(),
        },
        E::CursorPos(x, y) => NativeEvent::CursorPos { window, x, y },
        E::CursorEnter(entered) => NativeEvent::CursorEnter {
            window,
            entered: i32::from(entered),
        },
        E::Scroll(x, y) => NativeEvent::Scroll { window, x, y },
        E::FileDrop(paths) => NativeEvent::Drop { window, paths },
        _ => return None,
    })
}

fn glfw_hint(hint: WindowHint) -> glfw::WindowHint {
    use glfw::WindowHint as H;

    match hint {
        WindowHint::Resizable(v) => H::Resizable(v),
        WindowHint::Visible(v) => H::Visible(v),
        WindowHint::Decorated(v) => H::Decorated(v),
        WindowHint::Focused(v) => H::Focused(v),
        WindowHint::AutoIconify(v) => H::AutoIconify(v),
        WindowHint::Floating(v) => H::Floating(v),
        WindowHint::Maximized(v) => H::Maximized(v),
        WindowHint::Samples(v) => H::Samples(v),
        WindowHint::DoubleBuffer(v) => H::DoubleBuffer(v),
        WindowHint::ContextVersion(major, minor) => H::ContextVersion(major, minor),
        WindowHint::OpenGlProfile(profile) => H::OpenGlProfile(match profile {
            OpenGlProfile::Any => glfw::OpenGlProfileHint::Any,
            OpenGlProfile::Core => glfw::OpenGlProfileHint::Core,
            OpenGlProfile::Compat => glfw::OpenGlProfileHint::Compat,
        }),
        WindowHint::OpenGlForwardCompat(v) => H::OpenGlForwardCompat(v),
        WindowHint::OpenGlDebugContext(v) => H::OpenGlDebugContext(v),
    }
}

fn video_mode(mode: &glfw::VidMode) -> VideoMode {
    VideoMode {
        width: mode.width,
        height: mode.height,
        red_bits: mode.red_bits,
        green_bits: mode.green_bits,
        blue_bits: mode.blue_bits,
        refresh_rate: mode.refresh_rate,
    }
}

fn monitor_info(monitor: &glfw::Monitor) -> MonitorInfo {
    let (x, y) = monitor.get_pos();
    let (width_mm, height_mm) = monitor.get_physical_size();
    MonitorInfo {
        name: monitor.get_name(),
        position: Point2D::new(x, y),
        physical_size_mm: Size2D::new(width_mm, height_mm),
        video_modes: monitor.get_video_modes().iter().map(video_mode).collect(),
        video_mode: monitor.get_video_mode().as_ref().map(video_mode),
    }
}

fn pixel_image(image: &RgbaPixels) -> glfw::PixelImage {
    glfw::PixelImage {
        width: image.width,
        height: image.height,
        pixels: image
            .data
            .chunks_exact(4)
            .map(|p| u32::from_ne_bytes([p[0], p[1], p[2], p[3]]))
            .collect(),
    }
}

impl NativeWindowing for GlfwBackend {
    fn init(&mut self) -> Result<(), WindowError> {
        let current = thread::current().id();
        if *INIT_THREAD.get_or_init(|| current) != current {
            return Err(WindowError::WrongThread);
        }
        if self.glfw.is_some() {
            return Ok(());
        }

        let mut glfw = glfw::init(record_glfw_error)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;
        unsafe { glfw::ffi::glfwSetMonitorCallback(Some(monitor_changed)) };
        glfw.set_joystick_callback(|joystick, event| {
            queue_connection(Connection::Joystick(
                joystick as c_int,
                event == glfw::JoystickEvent::Connected,
            ));
        });
        self.glfw = Some(glfw);

        for monitor in connected_monitors() {
            self.monitors.connect(monitor);
        }
        log::debug!("GLFW initialized with {} monitor(s)", self.monitors.len());
        Ok(())
    }

    fn terminate(&mut self) {
        let Some(glfw) = self.glfw.take() else {
            return;
        };
        let cursors = &mut self.cursors;
        for (_, mut record) in self.windows.drain() {
            Self::reclaim_cursor(cursors, &mut record);
        }
        self.cursors.clear();
        self.monitors.clear();
        self.current = None;
        PENDING_CONNECTIONS.with(|pending| pending.borrow_mut().clear());
        // The glfw crate counts its handles and terminates with the last one
        drop(glfw);
    }

    fn take_error(&mut self) -> Option<NativeFailure> {
        PENDING_ERROR.with(|pending| pending.borrow_mut().take())
    }

    fn version_string(&self) -> String {
        glfw::get_version_string()
    }

    fn default_window_hints(&mut self) {
        if let Some(glfw) = self.glfw_mut() {
            glfw.default_window_hints();
        }
    }

    fn window_hint(&mut self, hint: WindowHint) {
        if let Some(glfw) = self.glfw_mut() {
            glfw.window_hint(glfw_hint(hint));
        }
    }

    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        monitor: Option<MonitorId>,
        share: Option<WindowId>,
    ) -> Option<WindowId> {
        let monitor_index = match monitor {
            Some(id) => Some(self.monitor_index(id)?),
            None => None,
        };
        if share.is_some_and(|id| !self.windows.contains_key(id)) {
            unknown_window();
            return None;
        }

        let Self { glfw, windows, .. } = self;
        let Some(glfw) = glfw.as_mut() else {
            not_initialized();
            return None;
        };
        let (window, events) = glfw.with_connected_monitors(|glfw, monitors| {
            let mode = monitor_index
                .and_then(|index| monitors.get(index))
                .map_or(glfw::WindowMode::Windowed, |m| glfw::WindowMode::FullScreen(m));
            match share.and_then(|id| windows.get(id)) {
                Some(shared) => shared.window.create_shared(width, height, title, mode),
                None => glfw.create_window(width, height, title, mode),
            }
        })?;

        Some(self.windows.insert(GlfwWindow {
            window,
            events,
            cursor: None,
        }))
    }

    fn destroy_window(&mut self, window: WindowId) {
        let Some(mut record) = self.windows.remove(window) else {
            unknown_window();
            return;
        };
        Self::reclaim_cursor(&mut self.cursors, &mut record);
        if self.current == Some(window) {
            self.current = None;
        }
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.with_window(window, |r| r.window.should_close())
    }

    fn set_should_close(&mut self, window: WindowId, value: bool) {
        self.with_window_mut(window, |r| r.window.set_should_close(value));
    }

    fn set_title(&mut self, window: WindowId, title: &str) {
        self.with_window_mut(window, |r| r.window.set_title(title));
    }

    fn set_icon(&mut self, window: WindowId, images: &[RgbaPixels]) {
        let images = images.iter().map(pixel_image).collect();
        self.with_window_mut(window, |r| r.window.set_icon_from_pixels(images));
    }

    fn window_pos(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |r| r.window.get_pos())
    }

    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32) {
        self.with_window_mut(window, |r| r.window.set_pos(x, y));
    }

    fn window_size(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |r| r.window.get_size())
    }

    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32) {
        self.with_window_mut(window, |r| r.window.set_size(width, height));
    }

    fn framebuffer_size(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |r| r.window.get_framebuffer_size())
    }

    fn frame_size(&self, window: WindowId) -> (i32, i32, i32, i32) {
        self.with_window(window, |r| r.window.get_frame_size())
    }

    fn set_size_limits(
        &mut self,
        window: WindowId,
        min: Option<(u32, u32)>,
        max: Option<(u32, u32)>,
    ) {
        self.with_window_mut(window, |r| {
            r.window.set_size_limits(
                min.map(|m| m.0),
                min.map(|m| m.1),
                max.map(|m| m.0),
                max.map(|m| m.1),
            );
        });
    }

    fn set_aspect_ratio(&mut self, window: WindowId, numerator: u32, denominator: u32) {
        self.with_window_mut(window, |r| r.window.set_aspect_ratio(numerator, denominator));
    }

    fn window_command(&mut self, window: WindowId, command: WindowCommand) {
        self.with_window_mut(window, |r| match command {
            WindowCommand::Iconify => r.window.iconify(),
            WindowCommand::Restore => r.window.restore(),
            WindowCommand::Maximize => r.window.maximize(),
            WindowCommand::Show => r.window.show(),
            WindowCommand::Hide => r.window.hide(),
            WindowCommand::Focus => r.window.focus(),
        });
    }

    fn window_monitor(&self, window: WindowId) -> Option<MonitorId> {
        let monitor = self.with_window(window, |r| {
            Some(unsafe { glfw::ffi::glfwGetWindowMonitor(r.window.window_ptr()) })
        })?;
        self.monitors.find(monitor)
    }

    fn set_window_monitor(
        &mut self,
        window: WindowId,
        monitor: Option<MonitorId>,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        refresh_rate: Option<u32>,
    ) {
        let monitor_index = match monitor {
            Some(id) => match self.monitor_index(id) {
                Some(index) => Some(index),
                None => return,
            },
            None => None,
        };
        let Self { glfw, windows, .. } = self;
        let Some(record) = windows.get_mut(window) else {
            unknown_window();
            return;
        };
        let Some(index) = monitor_index else {
            record
                .window
                .set_monitor(glfw::WindowMode::Windowed, x, y, width, height, refresh_rate);
            return;
        };
        let Some(glfw) = glfw.as_mut() else {
            not_initialized();
            return;
        };
        glfw.with_connected_monitors(|_, monitors| {
            if let Some(m) = monitors.get(index) {
                record.window.set_monitor(
                    glfw::WindowMode::FullScreen(m),
                    x,
                    y,
                    width,
                    height,
                    refresh_rate,
                );
            }
        });
    }

    fn window_attrib(&self, window: WindowId, attrib: i32) -> i32 {
        self.with_window(window, |r| unsafe {
            glfw::ffi::glfwGetWindowAttrib(r.window.window_ptr(), attrib)
        })
    }

    fn swap_buffers(&mut self, window: WindowId) {
        self.with_window_mut(window, |r| r.window.swap_buffers());
    }

    fn set_event_enabled(&mut self, window: WindowId, kind: EventKind, enabled: bool) {
        self.with_window_mut(window, |r| {
            let w = &mut r.window;
            match kind {
                EventKind::WindowPos => w.set_pos_polling(enabled),
                EventKind::WindowSize => w.set_size_polling(enabled),
                EventKind::Close => w.set_close_polling(enabled),
                EventKind::Refresh => w.set_refresh_polling(enabled),
                EventKind::Focus => w.set_focus_polling(enabled),
                EventKind::Iconify => w.set_iconify_polling(enabled),
                EventKind::FramebufferSize => w.set_framebuffer_size_polling(enabled),
                EventKind::Key => w.set_key_polling(enabled),
                EventKind::Char => w.set_char_polling(enabled),
                EventKind::CharMods => w.set_char_mods_polling(enabled),
                EventKind::MouseButton => w.set_mouse_button_polling(enabled),
                EventKind::CursorPos => w.set_cursor_pos_polling(enabled),
                EventKind::CursorEnter => w.set_cursor_enter_polling(enabled),
                EventKind::Scroll => w.set_scroll_polling(enabled),
                EventKind::Drop => w.set_drag_and_drop_polling(enabled),
            }
        });
    }

    fn input_mode(&self, window: WindowId, mode: i32) -> i32 {
        self.with_window(window, |r| unsafe {
            glfw::ffi::glfwGetInputMode(r.window.window_ptr(), mode)
        })
    }

    fn set_input_mode(&mut self, window: WindowId, mode: i32, value: i32) {
        self.with_window_mut(window, |r| unsafe {
            glfw::ffi::glfwSetInputMode(r.window.window_ptr(), mode, value);
        });
    }

    fn key_state(&self, window: WindowId, key: i32) -> i32 {
        self.with_window(window, |r| unsafe { glfw::ffi::glfwGetKey(r.window.window_ptr(), key) })
    }

    fn mouse_button_state(&self, window: WindowId, button: i32) -> i32 {
        self.with_window(window, |r| unsafe {
            glfw::ffi::glfwGetMouseButton(r.window.window_ptr(), button)
        })
    }

    fn cursor_pos(&self, window: WindowId) -> (f64, f64) {
        self.with_window(window, |r| r.window.get_cursor_pos())
    }

    fn set_cursor_pos(&mut self, window: WindowId, x: f64, y: f64) {
        self.with_window_mut(window, |r| r.window.set_cursor_pos(x, y));
    }

    fn set_cursor(&mut self, window: WindowId, cursor: Option<CursorId>) {
        if !self.windows.contains_key(window) {
            unknown_window();
            return;
        }
        if cursor.is_some_and(|id| !self.cursors.contains_key(id)) {
            record(ErrorCode::InvalidValue, "unknown cursor handle");
            return;
        }

        // A glfw::Cursor can only sit on one window at a time
        let Self {
            windows, cursors, ..
        } = self;
        if cursor.is_some() {
            for (_, other) in windows.iter_mut() {
                if other.cursor == cursor {
                    Self::reclaim_cursor(cursors, other);
                }
            }
        }
        let record = &mut windows[window];
        Self::reclaim_cursor(cursors, record);
        if let Some(id) = cursor {
            let lent = cursors.get_mut(id).and_then(Option::take);
            if lent.is_some() {
                record.window.set_cursor(lent);
                record.cursor = Some(id);
            }
        }
    }

    fn clipboard_string(&self, window: WindowId) -> Option<String> {
        self.with_window(window, |r| r.window.get_clipboard_string())
    }

    fn set_clipboard_string(&mut self, window: WindowId, value: &str) {
        self.with_window_mut(window, |r| r.window.set_clipboard_string(value));
    }

    fn poll_events(&mut self) -> Vec<NativeEvent> {
        let Some(glfw) = self.glfw_mut() else {
            return Vec::new();
        };
        glfw.poll_events();
        self.collect_events()
    }

    fn wait_events(&mut self, timeout: Option<f64>) -> Vec<NativeEvent> {
        let Some(glfw) = self.glfw_mut() else {
            return Vec::new();
        };
        match timeout {
            Some(seconds) => glfw.wait_events_timeout(seconds),
            None => glfw.wait_events(),
        }
        self.collect_events()
    }

    fn post_empty_event(&mut self) {
        if self.glfw().is_some() {
            unsafe { glfw::ffi::glfwPostEmptyEvent() };
        }
    }

    fn make_context_current(&mut self, window: Option<WindowId>) {
        match window {
            Some(id) => match self.windows.get_mut(id) {
                Some(record) => {
                    record.window.make_current();
                    self.current = Some(id);
                }
                None => unknown_window(),
            },
            None => {
                unsafe { glfw::ffi::glfwMakeContextCurrent(std::ptr::null_mut()) };
                self.current = None;
            }
        }
    }

    fn current_context(&self) -> Option<WindowId> {
        self.current
    }

    fn set_swap_interval(&mut self, interval: i32) {
        let interval = match interval {
            i32::MIN..=-1 => glfw::SwapInterval::Adaptive,
            0 => glfw::SwapInterval::None,
            n => glfw::SwapInterval::Sync(n.unsigned_abs()),
        };
        if let Some(glfw) = self.glfw_mut() {
            glfw.set_swap_interval(interval);
        }
    }

    fn extension_supported(&self, name: &str) -> bool {
        self.glfw().is_some_and(|glfw| glfw.extension_supported(name))
    }

    fn proc_address(&mut self, name: &str) -> *const c_void {
        let current = self.current;
        let Some(context) = current.and_then(|id| self.windows.get_mut(id)) else {
            record(ErrorCode::NoCurrentContext, "no current context");
            return std::ptr::null();
        };
        context.window.get_proc_address(name) as *const c_void
    }

    fn monitors(&mut self) -> Vec<MonitorId> {
        if self.glfw().is_none() {
            return Vec::new();
        }
        // Monitors connected since the last event pass are reported after it
        connected_monitors()
            .into_iter()
            .filter_map(|monitor| self.monitors.find(monitor))
            .collect()
    }

    fn primary_monitor(&mut self) -> Option<MonitorId> {
        self.glfw()?;
        self.monitors.find(unsafe { glfw::ffi::glfwGetPrimaryMonitor() })
    }

    fn monitor_info(&mut self, monitor: MonitorId) -> Option<MonitorInfo> {
        let ptr = self.known_monitor(monitor)?;
        let index = connected_monitors().iter().position(|connected| *connected == ptr)?;
        let glfw = self.glfw.as_mut()?;
        glfw.with_connected_monitors(|_, monitors| monitors.get(index).map(|m| monitor_info(m)))
    }

    fn gamma_ramp(&mut self, monitor: MonitorId) -> Option<GammaRamp> {
        let ptr = self.known_monitor(monitor)?;
        let ramp = unsafe { glfw::ffi::glfwGetGammaRamp(ptr) };
        if ramp.is_null() {
            return None;
        }
        // SAFETY: the ramp stays valid until the next gamma call for this monitor
        let ramp = unsafe { &*ramp };
        let size = ramp.size as usize;
        Some(GammaRamp {
            red: gamma_channel(ramp.red, size),
            green: gamma_channel(ramp.green, size),
            blue: gamma_channel(ramp.blue, size),
        })
    }

    fn set_gamma_ramp(&mut self, monitor: MonitorId, ramp: &GammaRamp) {
        let Some(ptr) = self.known_monitor(monitor) else {
            return;
        };
        let Some(size) = ramp.size().and_then(|size| c_uint::try_from(size).ok()) else {
            record(ErrorCode::InvalidValue, "gamma ramp channels differ in length");
            return;
        };
        let (mut red, mut green, mut blue) = (ramp.red.clone(), ramp.green.clone(), ramp.blue.clone());
        let native = glfw::ffi::GLFWgammaramp {
            red: red.as_mut_ptr(),
            green: green.as_mut_ptr(),
            blue: blue.as_mut_ptr(),
            size,
        };
        unsafe { glfw::ffi::glfwSetGammaRamp(ptr, &native) };
    }

    fn set_gamma(&mut self, monitor: MonitorId, gamma: f32) {
        if let Some(ptr) = self.known_monitor(monitor) {
            unsafe { glfw::ffi::glfwSetGamma(ptr, gamma) };
        }
    }

    fn create_standard_cursor(&mut self, shape: CursorShape) -> Option<CursorId> {
        self.glfw()?;
        let cursor = glfw::Cursor::standard(match shape {
            CursorShape::Arrow => glfw::StandardCursor::Arrow,
            CursorShape::IBeam => glfw::StandardCursor::IBeam,
            CursorShape::Crosshair => glfw::StandardCursor::Crosshair,
            CursorShape::Hand => glfw::StandardCursor::Hand,
            CursorShape::HResize => glfw::StandardCursor::HResize,
            CursorShape::VResize => glfw::StandardCursor::VResize,
        });
        Some(self.cursors.insert(Some(cursor)))
    }

    fn create_cursor(&mut self, image: &RgbaPixels, x_hot: i32, y_hot: i32) -> Option<CursorId> {
        self.glfw()?;
        let cursor = glfw::Cursor::create_from_pixels(
            pixel_image(image),
            u32::try_from(x_hot).unwrap_or(0),
            u32::try_from(y_hot).unwrap_or(0),
        );
        Some(self.cursors.insert(Some(cursor)))
    }

    fn destroy_cursor(&mut self, cursor: CursorId) {
        let Self {
            windows, cursors, ..
        } = self;
        for (_, record) in windows.iter_mut() {
            if record.cursor == Some(cursor) {
                Self::reclaim_cursor(cursors, record);
            }
        }
        // Dropping the glfw::Cursor destroys it
        cursors.remove(cursor);
    }

    fn key_name(&self, key: i32, scancode: i32) -> Option<String> {
        self.glfw()?;
        c_string(unsafe { glfw::ffi::glfwGetKeyName(key, scancode) })
    }

    fn joystick_present(&self, joystick: i32) -> bool {
        self.glfw().is_some() && joystick_present(joystick)
    }

    fn joystick_axes(&self, joystick: i32) -> Vec<f32> {
        if self.glfw().is_none() {
            return Vec::new();
        }
        let mut count: c_int = 0;
        let axes = unsafe { glfw::ffi::glfwGetJoystickAxes(joystick, &mut count) };
        if axes.is_null() {
            return Vec::new();
        }
        let len = usize::try_from(count).unwrap_or(0);
        unsafe { std::slice::from_raw_parts(axes, len) }.to_vec()
    }

    fn joystick_buttons(&self, joystick: i32) -> Vec<i32> {
        if self.glfw().is_none() {
            return Vec::new();
        }
        let mut count: c_int = 0;
        let buttons = unsafe { glfw::ffi::glfwGetJoystickButtons(joystick, &mut count) };
        if buttons.is_null() {
            return Vec::new();
        }
        let len = usize::try_from(count).unwrap_or(0);
        unsafe { std::slice::from_raw_parts(buttons, len) }
            .iter()
            .map(|b| i32::from(*b))
            .collect()
    }

    fn joystick_name(&self, joystick: i32) -> Option<String> {
        self.glfw()?;
        c_string(unsafe { glfw::ffi::glfwGetJoystickName(joystick) })
    }

    fn time(&self) -> f64 {
        self.glfw().map_or(0.0, glfw::Glfw::get_time)
    }

    fn set_time(&mut self, seconds: f64) {
        if let Some(glfw) = self.glfw_mut() {
            glfw.set_time(seconds);
        }
    }

    fn timer_value(&self) -> u64 {
        self.glfw().map_or(0, glfw::Glfw::get_timer_value)
    }

    fn timer_frequency(&self) -> u64 {
        self.glfw().map_or(0, glfw::Glfw::get_timer_frequency)
    }
}

impl Drop for GlfwBackend {
    fn drop(&mut self) {
        self.terminate();
    }
}
