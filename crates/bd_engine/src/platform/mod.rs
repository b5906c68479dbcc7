//! Windowing platform
//!
//! Safe ownership layer over a native windowing library. [`Platform`] is the
//! initialized library: it owns the backend, the per-window callback registry
//! and the library-wide callbacks. Every [`Window`], [`Cursor`] and
//! [`Monitor`] keeps a clone of it, so the library is terminated only after
//! the last of them is gone.
//!
//! `Platform` is neither `Send` nor `Sync`. Holding one proves the code runs
//! on the thread that initialized the library.
//!
//! # Example
//!
//! ```no_run
//! use bd_engine::platform::{Platform, Window, WindowHint, KeyCode};
//!
//! let platform = Platform::glfw()?;
//! platform.window_hint(WindowHint::Resizable(false))?;
//! let window = Window::new(&platform, 640, 480, "demo")?;
//! window.set_key_callback(|window, key, _, _, _| {
//!     if key == KeyCode::Escape {
//!         let _ = window.set_should_close(true);
//!     }
//! })?;
//! while !window.should_close()? {
//!     platform.wait_events()?;
//! }
//! # Ok::<(), bd_engine::platform::WindowError>(())
//! ```

mod backend;
mod callbacks;
mod cursor;
mod error;
mod glfw_backend;
#[cfg(test)]
pub(crate) mod mock;
mod monitor;
mod types;
mod window;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub use backend::{CursorId, MonitorId, NativeEvent, NativeWindowing, WindowId};
pub use callbacks::{
    CharCallback, CharModsCallback, CursorEnterCallback, CursorPosCallback, DropCallback,
    ErrorCallback, FramebufferSizeCallback, JoystickCallback, KeyCallback, MonitorCallback,
    MouseButtonCallback, ScrollCallback, WindowCloseCallback, WindowFocusCallback,
    WindowIconifyCallback, WindowPosCallback, WindowRefreshCallback, WindowSizeCallback,
};
pub use cursor::Cursor;
pub use error::{ErrorCode, NativeFailure, WindowError, WindowResult};
pub use glfw_backend::GlfwBackend;
pub use monitor::Monitor;
pub use types::*;
pub use window::{Window, WindowRef};

use callbacks::{LibraryCallbacks, WindowCallbacks};

thread_local! {
    static GLFW_PLATFORM: RefCell<Weak<PlatformInner>> = const { RefCell::new(Weak::new()) };
}

struct PlatformInner {
    backend: RefCell<Box<dyn NativeWindowing>>,
    callbacks: RefCell<HashMap<WindowId, WindowCallbacks>>,
    library: RefCell<LibraryCallbacks>,
}

impl Drop for PlatformInner {
    fn drop(&mut self) {
        self.callbacks.get_mut().clear();
        self.backend.get_mut().terminate();
        log::info!("Windowing library terminated");
    }
}

/// Initialized windowing library
#[derive(Clone)]
pub struct Platform {
    inner: Rc<PlatformInner>,
}

impl Platform {
    /// Initialize `backend` and take ownership of it
    pub fn new(backend: impl NativeWindowing + 'static) -> WindowResult<Self> {
        let mut backend: Box<dyn NativeWindowing> = Box::new(backend);
        backend.init()?;
        if let Some(failure) = backend.take_error() {
            backend.terminate();
            return Err(WindowError::InitializationFailed(failure.description));
        }
        log::info!("Windowing library initialized: {}", backend.version_string());

        Ok(Self {
            inner: Rc::new(PlatformInner {
                backend: RefCell::new(backend),
                callbacks: RefCell::new(HashMap::new()),
                library: RefCell::new(LibraryCallbacks::default()),
            }),
        })
    }

    /// Initialize GLFW, or join the GLFW context already alive on this thread
    pub fn glfw() -> WindowResult<Self> {
        GLFW_PLATFORM.with(|cache| Self::shared(cache, || Self::new(GlfwBackend::new())))
    }

    fn shared(
        cache: &RefCell<Weak<PlatformInner>>,
        create: impl FnOnce() -> WindowResult<Self>,
    ) -> WindowResult<Self> {
        let alive = cache.borrow().upgrade();
        if let Some(inner) = alive {
            return Ok(Self { inner });
        }
        let platform = create()?;
        *cache.borrow_mut() = Rc::downgrade(&platform.inner);
        Ok(platform)
    }

    /// Run one backend call and surface any error it recorded
    pub(crate) fn call<R>(&self, f: impl FnOnce(&mut dyn NativeWindowing) -> R) -> WindowResult<R> {
        let (value, failure) = {
            let mut backend = self.inner.backend.borrow_mut();
            let value = f(&mut **backend);
            (value, backend.take_error())
        };
        match failure {
            Some(failure) => Err(self.report(failure)),
            None => Ok(value),
        }
    }

    /// Run a backend constructor; `None` becomes [`WindowError::CreationFailed`]
    pub(crate) fn create<R>(
        &self,
        resource: &'static str,
        f: impl FnOnce(&mut dyn NativeWindowing) -> Option<R>,
    ) -> WindowResult<R> {
        let (value, failure) = {
            let mut backend = self.inner.backend.borrow_mut();
            let value = f(&mut **backend);
            (value, backend.take_error())
        };
        let failure = failure.map(|failure| {
            self.report(failure.clone());
            failure
        });
        match (value, failure) {
            (Some(value), None) => Ok(value),
            (Some(value), Some(failure)) => {
                log::warn!("Created {resource} despite error: {}", failure.description);
                Ok(value)
            }
            (None, failure) => {
                let failure = failure.unwrap_or_else(|| {
                    NativeFailure::new(ErrorCode::Unknown, "no error was reported")
                });
                Err(WindowError::CreationFailed {
                    resource,
                    code: failure.code,
                    description: failure.description,
                })
            }
        }
    }

    fn report(&self, failure: NativeFailure) -> WindowError {
        log::debug!("Native error ({}): {}", failure.code, failure.description);
        self.invoke_library(|c| &mut c.error, |cb| cb(failure.code, &failure.description));
        failure.into()
    }

    #[cfg(test)]
    pub(crate) fn has_callbacks(&self, window: WindowId) -> bool {
        self.inner.callbacks.borrow().contains_key(&window)
    }

    /// Version string of the native library
    pub fn version_string(&self) -> String {
        self.inner.backend.borrow().version_string()
    }

    /// Reset every window hint to its default
    pub fn default_window_hints(&self) -> WindowResult<()> {
        self.call(|b| b.default_window_hints())
    }

    /// Set a hint for the windows created after this call
    pub fn window_hint(&self, hint: WindowHint) -> WindowResult<()> {
        self.call(|b| b.window_hint(hint))
    }

    /// Process pending events and run their callbacks, without blocking
    pub fn poll_events(&self) -> WindowResult<()> {
        let (events, failure) = self.drain(|b| b.poll_events());
        self.finish_events(events, failure)
    }

    /// Sleep until at least one event arrives, then process events
    pub fn wait_events(&self) -> WindowResult<()> {
        let (events, failure) = self.drain(|b| b.wait_events(None));
        self.finish_events(events, failure)
    }

    /// Like [`Platform::wait_events`], giving up after `seconds`
    pub fn wait_events_timeout(&self, seconds: f64) -> WindowResult<()> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(WindowError::InvalidArgument(format!(
                "wait timeout must be positive, got {seconds}"
            )));
        }
        let (events, failure) = self.drain(|b| b.wait_events(Some(seconds)));
        self.finish_events(events, failure)
    }

    fn drain(
        &self,
        f: impl FnOnce(&mut dyn NativeWindowing) -> Vec<NativeEvent>,
    ) -> (Vec<NativeEvent>, Option<NativeFailure>) {
        let mut backend = self.inner.backend.borrow_mut();
        let events = f(&mut **backend);
        (events, backend.take_error())
    }

    /// Callbacks run even when the same call also recorded an error
    fn finish_events(&self, events: Vec<NativeEvent>, failure: Option<NativeFailure>) -> WindowResult<()> {
        for event in events {
            self.dispatch(event);
        }
        failure.map_or(Ok(()), |failure| Err(self.report(failure)))
    }

    /// Wake a thread blocked in [`Platform::wait_events`]
    pub fn post_empty_event(&self) -> WindowResult<()> {
        self.call(|b| b.post_empty_event())
    }

    /// Detach the current context from the calling thread
    pub fn clear_current_context(&self) -> WindowResult<()> {
        self.call(|b| b.make_context_current(None))
    }

    /// Window whose context is current on the calling thread
    pub fn current_context(&self) -> WindowResult<Option<WindowId>> {
        self.call(|b| b.current_context())
    }

    /// Frames to wait before swapping buffers on the current context
    pub fn set_swap_interval(&self, interval: i32) -> WindowResult<()> {
        self.call(|b| b.set_swap_interval(interval))
    }

    /// Whether the current context supports an API extension
    pub fn extension_supported(&self, name: &str) -> WindowResult<bool> {
        self.call(|b| b.extension_supported(name))
    }

    /// Connected monitors, primary first
    pub fn monitors(&self) -> WindowResult<Vec<Monitor>> {
        let ids = self.call(|b| b.monitors())?;
        Ok(ids.into_iter().map(|id| Monitor::new(self.clone(), id)).collect())
    }

    /// Primary monitor, if any monitor is connected
    pub fn primary_monitor(&self) -> WindowResult<Option<Monitor>> {
        let id = self.call(|b| b.primary_monitor())?;
        Ok(id.map(|id| Monitor::new(self.clone(), id)))
    }

    /// Layout-specific name of a printable key; `KeyCode::Unknown` uses the scancode
    pub fn key_name(&self, key: KeyCode, scancode: i32) -> WindowResult<Option<String>> {
        self.call(|b| b.key_name(key.raw(), scancode))
    }

    /// Whether a joystick is connected
    pub fn joystick_present(&self, joystick: Joystick) -> WindowResult<bool> {
        self.call(|b| b.joystick_present(joystick.raw()))
    }

    /// Axis values of a joystick, empty when it isn't connected
    pub fn joystick_axes(&self, joystick: Joystick) -> WindowResult<Vec<f32>> {
        self.call(|b| b.joystick_axes(joystick.raw()))
    }

    /// Button states of a joystick, empty when it isn't connected
    pub fn joystick_buttons(&self, joystick: Joystick) -> WindowResult<Vec<InputAction>> {
        let raw = self.call(|b| b.joystick_buttons(joystick.raw()))?;
        Ok(raw.into_iter().map(InputAction::from_raw).collect())
    }

    /// Name of a joystick
    pub fn joystick_name(&self, joystick: Joystick) -> WindowResult<Option<String>> {
        self.call(|b| b.joystick_name(joystick.raw()))
    }

    /// Seconds since initialization
    pub fn time(&self) -> WindowResult<f64> {
        self.call(|b| b.time())
    }

    /// Reset the library timer
    pub fn set_time(&self, seconds: f64) -> WindowResult<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(WindowError::InvalidArgument(format!(
                "timer value must be non-negative, got {seconds}"
            )));
        }
        self.call(|b| b.set_time(seconds))
    }

    /// Raw timer ticks
    pub fn timer_value(&self) -> WindowResult<u64> {
        self.call(|b| b.timer_value())
    }

    /// Raw timer ticks per second
    pub fn timer_frequency(&self) -> WindowResult<u64> {
        self.call(|b| b.timer_frequency())
    }

    /// Called for every native error, in addition to the error being returned
    pub fn set_error_callback(&self, callback: impl FnMut(ErrorCode, &str) + 'static) {
        let callback: Box<ErrorCallback> = Box::new(callback);
        self.set_library_callback(|c| &mut c.error, callback);
    }

    /// Stop reporting errors through a callback
    pub fn unset_error_callback(&self) {
        self.unset_library_callback(|c| &mut c.error);
    }

    /// Called when a monitor is connected or disconnected
    pub fn set_monitor_callback(&self, callback: impl FnMut(&Monitor, ConnectionEvent) + 'static) {
        let callback: Box<MonitorCallback> = Box::new(callback);
        self.set_library_callback(|c| &mut c.monitor, callback);
    }

    /// Stop monitor notifications
    pub fn unset_monitor_callback(&self) {
        self.unset_library_callback(|c| &mut c.monitor);
    }

    /// Called when a joystick is connected or disconnected
    pub fn set_joystick_callback(&self, callback: impl FnMut(Joystick, ConnectionEvent) + 'static) {
        let callback: Box<JoystickCallback> = Box::new(callback);
        self.set_library_callback(|c| &mut c.joystick, callback);
    }

    /// Stop joystick notifications
    pub fn unset_joystick_callback(&self) {
        self.unset_library_callback(|c| &mut c.joystick);
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("windows", &self.inner.callbacks.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    use super::mock::{MockJoystick, MockWindowing};
    use super::*;

    #[test]
    fn test_shared_context_is_reused_while_alive() {
        let cache = RefCell::new(Weak::new());
        let first_backend = MockWindowing::new();
        let first = Platform::shared(&cache, || Platform::new(first_backend.clone())).unwrap();

        let unused = MockWindowing::new();
        let second = Platform::shared(&cache, || Platform::new(unused.clone())).unwrap();
        assert!(Rc::ptr_eq(&first.inner, &second.inner));
        assert_eq!(unused.state().init_calls, 0);

        let window = Window::new(&second, 640, 480, "shared").unwrap();
        drop(first);
        assert_eq!(first_backend.state().terminate_calls, 0);
        assert!(!window.should_close().unwrap());

        drop(window);
        drop(second);
        assert_eq!(first_backend.state().terminate_calls, 1);

        let next_backend = MockWindowing::new();
        let _next = Platform::shared(&cache, || Platform::new(next_backend.clone())).unwrap();
        assert_eq!(next_backend.state().init_calls, 1);
    }

    #[test]
    fn test_library_terminates_after_last_owner() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        let window = Window::new(&platform, 640, 480, "last").unwrap();
        assert!(mock.state().initialized);

        drop(platform);
        assert_eq!(mock.state().terminate_calls, 0);
        assert!(window.size().is_ok());

        drop(window);
        let state = mock.state();
        assert_eq!(state.terminate_calls, 1);
        assert_eq!(state.windows_destroyed, 1);
        assert!(!state.initialized);
    }

    #[test]
    fn test_initialization_is_idempotent() {
        let mock = MockWindowing::new();
        let mut backend = mock.clone();
        backend.init().unwrap();
        let platform = Platform::new(mock.clone()).unwrap();
        assert_eq!(mock.state().init_calls, 2);
        assert!(mock.state().initialized);
        drop(platform);
    }

    #[test]
    fn test_initialization_failure() {
        let mock = MockWindowing::new();
        mock.state_mut().fail_init = true;
        assert!(matches!(
            Platform::new(mock),
            Err(WindowError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_error_callback_sees_failures() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        platform.set_error_callback(move |code, message| sink.borrow_mut().push((code, message.to_string())));
        mock.inject_error(ErrorCode::InvalidEnum, "bad hint");
        assert!(platform.window_hint(WindowHint::Visible(false)).is_err());

        platform.unset_error_callback();
        mock.inject_error(ErrorCode::InvalidEnum, "ignored");
        assert!(platform.default_window_hints().is_err());

        assert_eq!(*seen.borrow(), vec![(ErrorCode::InvalidEnum, "bad hint".to_string())]);
    }

    #[test]
    fn test_monitor_and_joystick_callbacks() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&events);
        platform.set_monitor_callback(move |monitor, event| {
            let name = monitor.name().ok().flatten();
            sink.borrow_mut().push(format!("{name:?} {event:?}"));
        });
        let sink = Rc::clone(&events);
        platform.set_joystick_callback(move |joystick, event| {
            sink.borrow_mut().push(format!("joystick {} {event:?}", joystick.raw()));
        });

        platform.poll_events().unwrap();
        mock.push_event(NativeEvent::Joystick {
            joystick: 3,
            event: ConnectionEvent::DISCONNECTED,
        });
        platform.poll_events().unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                "Some(\"Mock Display\") Connected".to_string(),
                "joystick 3 Disconnected".to_string(),
            ]
        );
    }

    #[test]
    fn test_wait_events_timeout_validation() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        assert!(platform.wait_events_timeout(0.0).is_err());
        platform.wait_events_timeout(0.5).unwrap();
        platform.wait_events().unwrap();
        platform.post_empty_event().unwrap();

        let state = mock.state();
        assert_eq!(state.waits, vec![Some(0.5), None]);
        assert_eq!(state.empty_events_posted, 1);
    }

    #[test]
    fn test_swap_interval_needs_context() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        assert_eq!(
            platform.set_swap_interval(1).unwrap_err().code(),
            Some(ErrorCode::NoCurrentContext)
        );

        let window = Window::new(&platform, 640, 480, "vsync").unwrap();
        window.make_context_current().unwrap();
        platform.set_swap_interval(1).unwrap();
        assert_eq!(platform.current_context().unwrap(), window.handle());
        assert_eq!(mock.state().swap_interval, Some(1));

        platform.clear_current_context().unwrap();
        assert_eq!(platform.current_context().unwrap(), None);
    }

    #[test]
    fn test_joystick_and_timer_queries() {
        let mock = MockWindowing::new();
        mock.state_mut().joysticks.insert(
            0,
            MockJoystick {
                name: "Pad".to_string(),
                axes: vec![0.5, -1.0],
                buttons: vec![1, 0],
            },
        );
        let platform = Platform::new(mock.clone()).unwrap();
        let pad = Joystick::new(0).unwrap();

        assert!(platform.joystick_present(pad).unwrap());
        assert!(!platform.joystick_present(Joystick::new(1).unwrap()).unwrap());
        assert_eq!(platform.joystick_name(pad).unwrap().as_deref(), Some("Pad"));
        assert_eq!(
            platform.joystick_buttons(pad).unwrap(),
            vec![InputAction::Press, InputAction::Release]
        );
        approx::assert_relative_eq!(platform.joystick_axes(pad).unwrap()[0], 0.5);

        platform.set_time(2.5).unwrap();
        approx::assert_relative_eq!(platform.time().unwrap(), 2.5);
        assert_eq!(platform.timer_value().unwrap(), 2_500_000);
        assert!(platform.set_time(-1.0).is_err());
        assert_eq!(platform.key_name(KeyCode::W, 0).unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn test_callbacks_forgotten_with_window() {
        let mock = MockWindowing::new();
        let platform = Platform::new(mock.clone()).unwrap();
        let window = Window::new(&platform, 640, 480, "gone").unwrap();
        let id = window.handle().unwrap();
        let fired = Rc::new(Cell::new(false));

        let flag = Rc::clone(&fired);
        window.set_close_callback(move |_| flag.set(true)).unwrap();
        assert!(platform.has_callbacks(id));
        drop(window);
        assert!(!platform.has_callbacks(id));

        mock.push_event(NativeEvent::Close { window: id });
        platform.poll_events().unwrap();
        assert!(!fired.get());
    }
}
