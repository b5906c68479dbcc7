//! In-memory windowing backend for tests
//!
//! Every clone shares the same state, so a test keeps one clone for inspection
//! and hands the other to [`Platform::new`](super::Platform::new).

#![allow(missing_docs)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::rc::Rc;

use slotmap::SlotMap;

use super::backend::{CursorId, MonitorId, NativeEvent, NativeWindowing, WindowId};
use super::error::{ErrorCode, NativeFailure, WindowError};
use super::types::{
    ConnectionEvent, CursorShape, EventKind, GammaRamp, MonitorInfo, Point2D, RgbaPixels, Size2D,
    VideoMode, WindowCommand, WindowHint,
};

/// State of one mock window
#[derive(Debug, Clone, Default)]
pub struct MockWindow {
    pub title: String,
    pub pos: (i32, i32),
    pub size: (i32, i32),
    pub framebuffer: (i32, i32),
    pub should_close: bool,
    pub enabled: HashSet<EventKind>,
    pub monitor: Option<MonitorId>,
    pub attribs: HashMap<i32, i32>,
    pub input_modes: HashMap<i32, i32>,
    pub keys: HashMap<i32, i32>,
    pub buttons: HashMap<i32, i32>,
    pub cursor_pos: (f64, f64),
    pub cursor: Option<CursorId>,
    pub icons: usize,
    pub size_limits: Option<(Option<(u32, u32)>, Option<(u32, u32)>)>,
    pub aspect_ratio: Option<(u32, u32)>,
    pub commands: Vec<WindowCommand>,
    pub swaps: usize,
    pub share: Option<WindowId>,
}

/// Joystick attached to the mock
#[derive(Debug, Clone, Default)]
pub struct MockJoystick {
    pub name: String,
    pub axes: Vec<f32>,
    pub buttons: Vec<i32>,
}

/// Shared mock state
#[derive(Debug, Default)]
pub struct MockState {
    pub initialized: bool,
    pub init_calls: usize,
    pub terminate_calls: usize,
    pub fail_init: bool,
    pub pending_error: Option<NativeFailure>,
    pub fail_window_creation: Option<Option<NativeFailure>>,
    pub hints: Vec<WindowHint>,
    pub windows: SlotMap<WindowId, MockWindow>,
    pub windows_created: usize,
    pub windows_destroyed: usize,
    pub cursors: SlotMap<CursorId, Option<CursorShape>>,
    pub cursors_created: usize,
    pub cursors_destroyed: usize,
    pub monitors: SlotMap<MonitorId, MonitorInfo>,
    pub monitor_order: Vec<MonitorId>,
    pub gamma: HashMap<MonitorId, GammaRamp>,
    pub gamma_unsupported: bool,
    pub joysticks: HashMap<i32, MockJoystick>,
    pub queued_events: Vec<NativeEvent>,
    pub close_after_polls: Option<usize>,
    pub polls: usize,
    pub waits: Vec<Option<f64>>,
    pub empty_events_posted: usize,
    pub current_context: Option<WindowId>,
    pub swap_interval: Option<i32>,
    pub extensions: HashSet<String>,
    pub registrations: Vec<(WindowId, EventKind, bool)>,
    pub clipboard: Option<String>,
    pub time: f64,
}

/// Mock backend handle
#[derive(Debug, Clone, Default)]
pub struct MockWindowing {
    state: Rc<RefCell<MockState>>,
}

impl MockWindowing {
    /// Mock with one 1920x1080 monitor attached
    pub fn new() -> Self {
        let mock = Self::default();
        mock.connect_monitor("Mock Display", (0, 0));
        mock
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    /// Make the next native call report `code`
    pub fn inject_error(&self, code: ErrorCode, description: &str) {
        self.state_mut().pending_error = Some(NativeFailure::new(code, description));
    }

    /// Queue an event for the next poll; window events are only delivered
    /// while their kind is enabled on a live window
    pub fn push_event(&self, event: NativeEvent) {
        self.state_mut().queued_events.push(event);
    }

    /// Attach a monitor and queue its connection event
    pub fn connect_monitor(&self, name: &str, position: (i32, i32)) -> MonitorId {
        let mode = VideoMode {
            width: 1920,
            height: 1080,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            refresh_rate: 60,
        };
        let info = MonitorInfo {
            name: Some(name.to_string()),
            position: Point2D::new(position.0, position.1),
            physical_size_mm: Size2D::new(530, 300),
            video_modes: vec![mode],
            video_mode: Some(mode),
        };
        let mut state = self.state_mut();
        let id = state.monitors.insert(info);
        state.monitor_order.push(id);
        state.queued_events.push(NativeEvent::Monitor {
            monitor: id,
            event: ConnectionEvent::CONNECTED,
        });
        id
    }

    /// Detach a monitor and queue its disconnection event
    pub fn disconnect_monitor(&self, monitor: MonitorId) {
        let mut state = self.state_mut();
        state.monitors.remove(monitor);
        state.monitor_order.retain(|m| *m != monitor);
        state.queued_events.push(NativeEvent::Monitor {
            monitor,
            event: ConnectionEvent::DISCONNECTED,
        });
    }

    /// Set the close flag of every window on the given poll (1-based)
    pub fn close_after_polls(&self, polls: usize) {
        self.state_mut().close_after_polls = Some(polls);
    }

    /// Only window, panics when there isn't exactly one
    pub fn single_window(&self) -> WindowId {
        let state = self.state();
        assert_eq!(state.windows.len(), 1, "expected exactly one mock window");
        state.windows.keys().next().unwrap()
    }

    fn record(&self, code: ErrorCode, description: &str) {
        self.state_mut().pending_error = Some(NativeFailure::new(code, description));
    }

    fn with_window<R: Default>(&self, window: WindowId, f: impl FnOnce(&MockWindow) -> R) -> R {
        let value = self.state().windows.get(window).map(f);
        value.unwrap_or_else(|| {
            self.record(ErrorCode::InvalidValue, "unknown window");
            R::default()
        })
    }

    fn with_window_mut(&self, window: WindowId, f: impl FnOnce(&mut MockWindow)) {
        let found = self.state_mut().windows.get_mut(window).map(f).is_some();
        if !found {
            self.record(ErrorCode::InvalidValue, "unknown window");
        }
    }

    fn drain_events(&self) -> Vec<NativeEvent> {
        let mut guard = self.state_mut();
        let state = &mut *guard;
        state.polls += 1;
        if state.close_after_polls == Some(state.polls) {
            let ids: Vec<WindowId> = state.windows.keys().collect();
            for id in ids {
                let window = &mut state.windows[id];
                window.should_close = true;
                if window.enabled.contains(&EventKind::Close) {
                    state.queued_events.push(NativeEvent::Close { window: id });
                }
            }
        }
        let windows = &state.windows;
        std::mem::take(&mut state.queued_events)
            .into_iter()
            .filter(|event| match (event.window(), event.kind()) {
                (Some(window), Some(kind)) => windows
                    .get(window)
                    .is_some_and(|w| w.enabled.contains(&kind)),
                _ => true,
            })
            .collect()
    }
}

impl NativeWindowing for MockWindowing {
    fn init(&mut self) -> Result<(), WindowError> {
        let mut state = self.state_mut();
        state.init_calls += 1;
        if state.fail_init {
            return Err(WindowError::InitializationFailed("mock refused".to_string()));
        }
        state.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) {
        let mut state = self.state_mut();
        state.terminate_calls += 1;
        state.initialized = false;
    }

    fn take_error(&mut self) -> Option<NativeFailure> {
        self.state_mut().pending_error.take()
    }

    fn version_string(&self) -> String {
        "3.3.8 Mock".to_string()
    }

    fn default_window_hints(&mut self) {
        self.state_mut().hints.clear();
    }

    fn window_hint(&mut self, hint: WindowHint) {
        self.state_mut().hints.push(hint);
    }

    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        monitor: Option<MonitorId>,
        share: Option<WindowId>,
    ) -> Option<WindowId> {
        let mut state = self.state_mut();
        if let Some(failure) = state.fail_window_creation.clone() {
            state.pending_error = failure;
            return None;
        }
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        state.windows_created += 1;
        Some(state.windows.insert(MockWindow {
            title: title.to_string(),
            size: (width, height),
            framebuffer: (width, height),
            monitor,
            share,
            ..MockWindow::default()
        }))
    }

    fn destroy_window(&mut self, window: WindowId) {
        let mut state = self.state_mut();
        if state.windows.remove(window).is_some() {
            state.windows_destroyed += 1;
            if state.current_context == Some(window) {
                state.current_context = None;
            }
        } else {
            state.pending_error = Some(NativeFailure::new(ErrorCode::InvalidValue, "unknown window"));
        }
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.with_window(window, |w| w.should_close)
    }

    fn set_should_close(&mut self, window: WindowId, value: bool) {
        self.with_window_mut(window, |w| w.should_close = value);
    }

    fn set_title(&mut self, window: WindowId, title: &str) {
        self.with_window_mut(window, |w| w.title = title.to_string());
    }

    fn set_icon(&mut self, window: WindowId, images: &[RgbaPixels]) {
        self.with_window_mut(window, |w| w.icons = images.len());
    }

    fn window_pos(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |w| w.pos)
    }

    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32) {
        self.with_window_mut(window, |w| w.pos = (x, y));
    }

    fn window_size(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |w| w.size)
    }

    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32) {
        self.with_window_mut(window, |w| {
            w.size = (width, height);
            w.framebuffer = (width, height);
        });
    }

    fn framebuffer_size(&self, window: WindowId) -> (i32, i32) {
        self.with_window(window, |w| w.framebuffer)
    }

    fn frame_size(&self, window: WindowId) -> (i32, i32, i32, i32) {
        self.with_window(window, |_| (1, 30, 1, 1))
    }

    fn set_size_limits(
        &mut self,
        window: WindowId,
        min: Option<(u32, u32)>,
        max: Option<(u32, u32)>,
    ) {
        self.with_window_mut(window, |w| w.size_limits = Some((min, max)));
    }

    fn set_aspect_ratio(&mut self, window: WindowId, numerator: u32, denominator: u32) {
        self.with_window_mut(window, |w| w.aspect_ratio = Some((numerator, denominator)));
    }

    fn window_command(&mut self, window: WindowId, command: WindowCommand) {
        self.with_window_mut(window, |w| w.commands.push(command));
    }

    fn window_monitor(&self, window: WindowId) -> Option<MonitorId> {
        self.with_window(window, |w| w.monitor)
    }

    fn set_window_monitor(
        &mut self,
        window: WindowId,
        monitor: Option<MonitorId>,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        _refresh_rate: Option<u32>,
    ) {
        self.with_window_mut(window, |w| {
            w.monitor = monitor;
            w.pos = (x, y);
            w.size = (
                i32::try_from(width).unwrap_or(i32::MAX),
                i32::try_from(height).unwrap_or(i32::MAX),
            );
        });
    }

    fn window_attrib(&self, window: WindowId, attrib: i32) -> i32 {
        self.with_window(window, |w| w.attribs.get(&attrib).copied().unwrap_or(0))
    }

    fn swap_buffers(&mut self, window: WindowId) {
        self.with_window_mut(window, |w| w.swaps += 1);
    }

    fn set_event_enabled(&mut self, window: WindowId, kind: EventKind, enabled: bool) {
        self.state_mut().registrations.push((window, kind, enabled));
        self.with_window_mut(window, |w| {
            if enabled {
                w.enabled.insert(kind);
            } else {
                w.enabled.remove(&kind);
            }
        });
    }

    fn input_mode(&self, window: WindowId, mode: i32) -> i32 {
        self.with_window(window, |w| w.input_modes.get(&mode).copied().unwrap_or(0))
    }

    fn set_input_mode(&mut self, window: WindowId, mode: i32, value: i32) {
        self.with_window_mut(window, |w| {
            w.input_modes.insert(mode, value);
        });
    }

    fn key_state(&self, window: WindowId, key: i32) -> i32 {
        self.with_window(window, |w| w.keys.get(&key).copied().unwrap_or(0))
    }

    fn mouse_button_state(&self, window: WindowId, button: i32) -> i32 {
        self.with_window(window, |w| w.buttons.get(&button).copied().unwrap_or(0))
    }

    fn cursor_pos(&self, window: WindowId) -> (f64, f64) {
        self.with_window(window, |w| w.cursor_pos)
    }

    fn set_cursor_pos(&mut self, window: WindowId, x: f64, y: f64) {
        self.with_window_mut(window, |w| w.cursor_pos = (x, y));
    }

    fn set_cursor(&mut self, window: WindowId, cursor: Option<CursorId>) {
        self.with_window_mut(window, |w| w.cursor = cursor);
    }

    fn clipboard_string(&self, _window: WindowId) -> Option<String> {
        self.state().clipboard.clone()
    }

    fn set_clipboard_string(&mut self, _window: WindowId, value: &str) {
        self.state_mut().clipboard = Some(value.to_string());
    }

    fn poll_events(&mut self) -> Vec<NativeEvent> {
        self.drain_events()
    }

    fn wait_events(&mut self, timeout: Option<f64>) -> Vec<NativeEvent> {
        self.state_mut().waits.push(timeout);
        self.drain_events()
    }

    fn post_empty_event(&mut self) {
        self.state_mut().empty_events_posted += 1;
    }

    fn make_context_current(&mut self, window: Option<WindowId>) {
        self.state_mut().current_context = window;
    }

    fn current_context(&self) -> Option<WindowId> {
        self.state().current_context
    }

    fn set_swap_interval(&mut self, interval: i32) {
        let mut state = self.state_mut();
        if state.current_context.is_none() {
            state.pending_error = Some(NativeFailure::new(
                ErrorCode::NoCurrentContext,
                "no current context",
            ));
            return;
        }
        state.swap_interval = Some(interval);
    }

    fn extension_supported(&self, name: &str) -> bool {
        self.state().extensions.contains(name)
    }

    fn proc_address(&mut self, _name: &str) -> *const c_void {
        std::ptr::null()
    }

    fn monitors(&mut self) -> Vec<MonitorId> {
        self.state().monitor_order.clone()
    }

    fn primary_monitor(&mut self) -> Option<MonitorId> {
        self.state().monitor_order.first().copied()
    }

    fn monitor_info(&mut self, monitor: MonitorId) -> Option<MonitorInfo> {
        self.state().monitors.get(monitor).cloned()
    }

    fn gamma_ramp(&mut self, monitor: MonitorId) -> Option<GammaRamp> {
        let state = self.state();
        if state.gamma_unsupported || !state.monitors.contains_key(monitor) {
            return None;
        }
        let ramp = state.gamma.get(&monitor).cloned();
        Some(ramp.unwrap_or_else(|| GammaRamp::from_exponent(1.0, 256)))
    }

    fn set_gamma_ramp(&mut self, monitor: MonitorId, ramp: &GammaRamp) {
        self.state_mut().gamma.insert(monitor, ramp.clone());
    }

    fn set_gamma(&mut self, monitor: MonitorId, gamma: f32) {
        self.state_mut()
            .gamma
            .insert(monitor, GammaRamp::from_exponent(gamma, 256));
    }

    fn create_standard_cursor(&mut self, shape: CursorShape) -> Option<CursorId> {
        let mut state = self.state_mut();
        state.cursors_created += 1;
        Some(state.cursors.insert(Some(shape)))
    }

    fn create_cursor(&mut self, image: &RgbaPixels, _x_hot: i32, _y_hot: i32) -> Option<CursorId> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.data.len() != expected {
            self.record(ErrorCode::InvalidValue, "cursor image size mismatch");
            return None;
        }
        let mut state = self.state_mut();
        state.cursors_created += 1;
        Some(state.cursors.insert(None))
    }

    fn destroy_cursor(&mut self, cursor: CursorId) {
        let mut state = self.state_mut();
        if state.cursors.remove(cursor).is_some() {
            state.cursors_destroyed += 1;
            for window in state.windows.values_mut() {
                if window.cursor == Some(cursor) {
                    window.cursor = None;
                }
            }
        }
    }

    fn key_name(&self, key: i32, _scancode: i32) -> Option<String> {
        match key {
            65..=90 => char::from_u32(u32::try_from(key).ok()? + 32).map(String::from),
            _ => None,
        }
    }

    fn joystick_present(&self, joystick: i32) -> bool {
        self.state().joysticks.contains_key(&joystick)
    }

    fn joystick_axes(&self, joystick: i32) -> Vec<f32> {
        self.state()
            .joysticks
            .get(&joystick)
            .map(|j| j.axes.clone())
            .unwrap_or_default()
    }

    fn joystick_buttons(&self, joystick: i32) -> Vec<i32> {
        self.state()
            .joysticks
            .get(&joystick)
            .map(|j| j.buttons.clone())
            .unwrap_or_default()
    }

    fn joystick_name(&self, joystick: i32) -> Option<String> {
        self.state().joysticks.get(&joystick).map(|j| j.name.clone())
    }

    fn time(&self) -> f64 {
        self.state().time
    }

    fn set_time(&mut self, seconds: f64) {
        self.state_mut().time = seconds;
    }

    fn timer_value(&self) -> u64 {
        (self.state().time * 1_000_000.0) as u64
    }

    fn timer_frequency(&self) -> u64 {
        1_000_000
    }
}
