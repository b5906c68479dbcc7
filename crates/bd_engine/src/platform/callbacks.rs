//! Per-window callback registry and event routing
//!
//! The native library allows one callback registration per event type per
//! window. Closures live here, keyed by window handle; the native side only
//! learns whether an event type is enabled. When events come back from the
//! backend they are translated into typed values and handed to the closure
//! together with a non-owning [`WindowRef`].
//!
//! A closure is taken out of its slot while it runs. That lets it replace or
//! remove itself (or call anything else on the window) without a re-entrant
//! borrow. It goes back into the slot afterwards unless the slot was touched
//! in the meantime.

use std::path::PathBuf;

use super::backend::{NativeEvent, WindowId};
use super::error::{ErrorCode, WindowError, WindowResult};
use super::monitor::Monitor;
use super::types::{
    ConnectionEvent, EventKind, InputAction, Joystick, KeyCode, KeyModifiers, MouseButton,
};
use super::window::WindowRef;
use super::Platform;

/// Window moved, new position of the content area
pub type WindowPosCallback = dyn FnMut(&WindowRef, i32, i32);
/// Window resized, new size in screen coordinates
pub type WindowSizeCallback = dyn FnMut(&WindowRef, i32, i32);
/// User asked to close the window
pub type WindowCloseCallback = dyn FnMut(&WindowRef);
/// Contents need redrawing
pub type WindowRefreshCallback = dyn FnMut(&WindowRef);
/// Focus gained (`true`) or lost
pub type WindowFocusCallback = dyn FnMut(&WindowRef, bool);
/// Iconified (`true`) or restored
pub type WindowIconifyCallback = dyn FnMut(&WindowRef, bool);
/// Framebuffer resized, new size in pixels
pub type FramebufferSizeCallback = dyn FnMut(&WindowRef, i32, i32);
/// Key, platform scancode, action and modifiers
pub type KeyCallback = dyn FnMut(&WindowRef, KeyCode, i32, InputAction, KeyModifiers);
/// Unicode character input
pub type CharCallback = dyn FnMut(&WindowRef, char);
/// Unicode character input with modifiers
pub type CharModsCallback = dyn FnMut(&WindowRef, char, KeyModifiers);
/// Mouse button, action and modifiers
pub type MouseButtonCallback = dyn FnMut(&WindowRef, MouseButton, InputAction, KeyModifiers);
/// Cursor moved, position relative to the content area
pub type CursorPosCallback = dyn FnMut(&WindowRef, f64, f64);
/// Cursor entered (`true`) or left the content area
pub type CursorEnterCallback = dyn FnMut(&WindowRef, bool);
/// Scroll offsets
pub type ScrollCallback = dyn FnMut(&WindowRef, f64, f64);
/// Paths dropped onto the window
pub type DropCallback = dyn FnMut(&WindowRef, &[PathBuf]);

/// Any error recorded by the native library
pub type ErrorCallback = dyn FnMut(ErrorCode, &str);
/// Monitor connected or disconnected
pub type MonitorCallback = dyn FnMut(&Monitor, ConnectionEvent);
/// Joystick connected or disconnected
pub type JoystickCallback = dyn FnMut(Joystick, ConnectionEvent);

/// Storage for one callback
pub(crate) struct Slot<F: ?Sized> {
    callback: Option<Box<F>>,
    generation: u64,
    registered: bool,
}

impl<F: ?Sized> Default for Slot<F> {
    fn default() -> Self {
        Self {
            callback: None,
            generation: 0,
            registered: false,
        }
    }
}

impl<F: ?Sized> Slot<F> {
    /// Store a closure; returns true while the native side is not registered yet
    fn store(&mut self, callback: Box<F>) -> bool {
        self.callback = Some(callback);
        self.generation += 1;
        !self.registered
    }

    /// Drop the closure; returns true when the native registration must be removed
    fn clear(&mut self) -> bool {
        self.callback = None;
        self.generation += 1;
        std::mem::replace(&mut self.registered, false)
    }

    fn take(&mut self) -> Option<(Box<F>, u64)> {
        self.callback.take().map(|callback| (callback, self.generation))
    }

    fn restore(&mut self, callback: Box<F>, generation: u64) {
        if self.generation == generation && self.callback.is_none() {
            self.callback = Some(callback);
        }
    }

    pub(crate) const fn is_set(&self) -> bool {
        self.callback.is_some()
    }
}

/// Every callback slot of one window
#[derive(Default)]
pub(crate) struct WindowCallbacks {
    pub(crate) window_pos: Slot<WindowPosCallback>,
    pub(crate) window_size: Slot<WindowSizeCallback>,
    pub(crate) close: Slot<WindowCloseCallback>,
    pub(crate) refresh: Slot<WindowRefreshCallback>,
    pub(crate) focus: Slot<WindowFocusCallback>,
    pub(crate) iconify: Slot<WindowIconifyCallback>,
    pub(crate) framebuffer_size: Slot<FramebufferSizeCallback>,
    pub(crate) key: Slot<KeyCallback>,
    pub(crate) char: Slot<CharCallback>,
    pub(crate) char_mods: Slot<CharModsCallback>,
    pub(crate) mouse_button: Slot<MouseButtonCallback>,
    pub(crate) cursor_pos: Slot<CursorPosCallback>,
    pub(crate) cursor_enter: Slot<CursorEnterCallback>,
    pub(crate) scroll: Slot<ScrollCallback>,
    pub(crate) drop: Slot<DropCallback>,
}

/// Library-wide callbacks
#[derive(Default)]
pub(crate) struct LibraryCallbacks {
    pub(crate) error: Slot<ErrorCallback>,
    pub(crate) monitor: Slot<MonitorCallback>,
    pub(crate) joystick: Slot<JoystickCallback>,
}

/// Picks one slot out of a window's callbacks
pub(crate) type WindowSlot<F> = fn(&mut WindowCallbacks) -> &mut Slot<F>;

/// Picks one slot out of the library callbacks
pub(crate) type LibrarySlot<F> = fn(&mut LibraryCallbacks) -> &mut Slot<F>;

impl Platform {
    pub(crate) fn set_window_callback<F: ?Sized>(
        &self,
        window: WindowId,
        kind: EventKind,
        slot: WindowSlot<F>,
        callback: Box<F>,
    ) -> WindowResult<()> {
        let (previous, needs_registration) = {
            let mut registry = self.inner.callbacks.borrow_mut();
            let callbacks = registry
                .get_mut(&window)
                .ok_or(WindowError::EmptyHandle("window"))?;
            let slot = slot(callbacks);
            (slot.callback.take(), slot.store(callback))
        };
        drop(previous);
        if needs_registration {
            if let Err(e) = self.call(|backend| backend.set_event_enabled(window, kind, true)) {
                let rejected = self
                    .inner
                    .callbacks
                    .borrow_mut()
                    .get_mut(&window)
                    .and_then(|callbacks| slot(callbacks).callback.take());
                drop(rejected);
                return Err(e);
            }
            if let Some(callbacks) = self.inner.callbacks.borrow_mut().get_mut(&window) {
                slot(callbacks).registered = true;
            }
        }
        Ok(())
    }

    pub(crate) fn unset_window_callback<F: ?Sized>(
        &self,
        window: WindowId,
        kind: EventKind,
        slot: WindowSlot<F>,
    ) -> WindowResult<()> {
        let (previous, was_registered) = match self.inner.callbacks.borrow_mut().get_mut(&window) {
            Some(callbacks) => {
                let slot = slot(callbacks);
                (slot.callback.take(), slot.clear())
            }
            None => (None, false),
        };
        drop(previous);
        if was_registered {
            self.call(|backend| backend.set_event_enabled(window, kind, false))?;
        }
        Ok(())
    }

    pub(crate) fn has_window_callback<F: ?Sized>(&self, window: WindowId, slot: WindowSlot<F>) -> bool {
        self.inner
            .callbacks
            .borrow_mut()
            .get_mut(&window)
            .is_some_and(|callbacks| slot(callbacks).is_set())
    }

    /// Start tracking callbacks for a freshly created window
    pub(crate) fn track_window(&self, window: WindowId) {
        self.inner
            .callbacks
            .borrow_mut()
            .insert(window, WindowCallbacks::default());
    }

    /// Drop every closure of a window that is going away
    pub(crate) fn forget_window(&self, window: WindowId) {
        // Closures may own values with their own Drop, so release the borrow first
        let removed = self.inner.callbacks.borrow_mut().remove(&window);
        drop(removed);
    }

    pub(crate) fn set_library_callback<F: ?Sized>(&self, slot: LibrarySlot<F>, callback: Box<F>) {
        let previous = {
            let mut library = self.inner.library.borrow_mut();
            let slot = slot(&mut library);
            let previous = slot.callback.take();
            slot.store(callback);
            previous
        };
        drop(previous);
    }

    pub(crate) fn unset_library_callback<F: ?Sized>(&self, slot: LibrarySlot<F>) {
        let previous = {
            let mut library = self.inner.library.borrow_mut();
            let slot = slot(&mut library);
            let previous = slot.callback.take();
            slot.clear();
            previous
        };
        drop(previous);
    }

    fn invoke_window<F: ?Sized>(
        &self,
        window: WindowId,
        slot: WindowSlot<F>,
        invoke: impl FnOnce(&mut F, &WindowRef),
    ) {
        let taken = self
            .inner
            .callbacks
            .borrow_mut()
            .get_mut(&window)
            .and_then(|callbacks| slot(callbacks).take());
        let Some((mut callback, generation)) = taken else {
            return;
        };

        let window_ref = WindowRef::borrowed(self.clone(), window);
        invoke(&mut *callback, &window_ref);

        if let Some(callbacks) = self.inner.callbacks.borrow_mut().get_mut(&window) {
            slot(callbacks).restore(callback, generation);
        }
    }

    pub(crate) fn invoke_library<F: ?Sized>(&self, slot: LibrarySlot<F>, invoke: impl FnOnce(&mut F)) {
        let taken = slot(&mut self.inner.library.borrow_mut()).take();
        let Some((mut callback, generation)) = taken else {
            return;
        };
        invoke(&mut *callback);
        slot(&mut self.inner.library.borrow_mut()).restore(callback, generation);
    }

    /// Route one native event to the closure registered for it
    pub(crate) fn dispatch(&self, event: NativeEvent) {
        match event {
            NativeEvent::WindowPos { window, x, y } => {
                self.invoke_window(window, |c| &mut c.window_pos, |cb, w| cb(w, x, y));
            }
            NativeEvent::WindowSize { window, width, height } => {
                self.invoke_window(window, |c| &mut c.window_size, |cb, w| cb(w, width, height));
            }
            NativeEvent::Close { window } => {
                self.invoke_window(window, |c| &mut c.close, |cb, w| cb(w));
            }
            NativeEvent::Refresh { window } => {
                self.invoke_window(window, |c| &mut c.refresh, |cb, w| cb(w));
            }
            NativeEvent::Focus { window, focused } => {
                self.invoke_window(window, |c| &mut c.focus, |cb, w| cb(w, focused != 0));
            }
            NativeEvent::Iconify { window, iconified } => {
                self.invoke_window(window, |c| &mut c.iconify, |cb, w| cb(w, iconified != 0));
            }
            NativeEvent::FramebufferSize { window, width, height } => {
                self.invoke_window(window, |c| &mut c.framebuffer_size, |cb, w| {
                    cb(w, width, height);
                });
            }
            NativeEvent::Key {
                window,
                key,
                scancode,
                action,
                mods,
            } => {
                self.invoke_window(window, |c| &mut c.key, |cb, w| {
                    cb(
                        w,
                        KeyCode::from_raw(key),
                        scancode,
                        InputAction::from_raw(action),
                        KeyModifiers::from_bits_truncate(mods),
                    );
                });
            }
            NativeEvent::Char { window, codepoint } => {
                let Some(ch) = char::from_u32(codepoint) else {
                    log::warn!("Dropping invalid code point {codepoint:#x}");
                    return;
                };
                self.invoke_window(window, |c| &mut c.char, |cb, w| cb(w, ch));
            }
            NativeEvent::CharMods {
                window,
                codepoint,
                mods,
            } => {
                let Some(ch) = char::from_u32(codepoint) else {
                    log::warn!("Dropping invalid code point {codepoint:#x}");
                    return;
                };
                let mods = KeyModifiers::from_bits_truncate(mods);
                self.invoke_window(window, |c| &mut c.char_mods, |cb, w| cb(w, ch, mods));
            }
            NativeEvent::MouseButton {
                window,
                button,
                action,
                mods,
            } => {
                self.invoke_window(window, |c| &mut c.mouse_button, |cb, w| {
                    cb(
                        w,
                        MouseButton::from_raw(button),
                        InputAction::from_raw(action),
                        KeyModifiers::from_bits_truncate(mods),
                    );
                });
            }
            NativeEvent::CursorPos { window, x, y } => {
                self.invoke_window(window, |c| &mut c.cursor_pos, |cb, w| cb(w, x, y));
            }
            NativeEvent::CursorEnter { window, entered } => {
                self.invoke_window(window, |c| &mut c.cursor_enter, |cb, w| cb(w, entered != 0));
            }
            NativeEvent::Scroll { window, x, y } => {
                self.invoke_window(window, |c| &mut c.scroll, |cb, w| cb(w, x, y));
            }
            NativeEvent::Drop { window, paths } => {
                self.invoke_window(window, |c| &mut c.drop, |cb, w| cb(w, &paths));
            }
            NativeEvent::Monitor { monitor, event } => {
                let monitor = Monitor::new(self.clone(), monitor);
                let event = ConnectionEvent::from_raw(event);
                self.invoke_library(|c| &mut c.monitor, |cb| cb(&monitor, event));
            }
            NativeEvent::Joystick { joystick, event } => {
                let Some(joystick) = Joystick::new(joystick) else {
                    log::warn!("Ignoring event for unknown joystick {joystick}");
                    return;
                };
                let event = ConnectionEvent::from_raw(event);
                self.invoke_library(|c| &mut c.joystick, |cb| cb(joystick, event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Counter = dyn FnMut(&mut u32);

    #[test]
    fn test_slot_registration_flags() {
        let mut slot: Slot<Counter> = Slot::default();
        assert!(slot.store(Box::new(|n: &mut u32| *n += 1)));
        slot.registered = true;
        assert!(!slot.store(Box::new(|n: &mut u32| *n += 2)));
        assert!(slot.clear());
        assert!(!slot.clear());
        assert!(!slot.is_set());
    }

    #[test]
    fn test_slot_restore_respects_replacement() {
        let mut slot: Slot<Counter> = Slot::default();
        slot.store(Box::new(|n: &mut u32| *n += 1));

        let (mut first, generation) = slot.take().unwrap();
        slot.store(Box::new(|n: &mut u32| *n += 10));
        slot.restore(Box::new(|n: &mut u32| *n += 100), generation);

        let mut value = 0;
        first(&mut value);
        let (mut current, _) = slot.take().unwrap();
        current(&mut value);
        assert_eq!(value, 11);
    }

    #[test]
    fn test_slot_restore_after_untouched_dispatch() {
        let mut slot: Slot<Counter> = Slot::default();
        slot.store(Box::new(|n: &mut u32| *n += 1));
        let (callback, generation) = slot.take().unwrap();
        assert!(!slot.is_set());
        slot.restore(callback, generation);
        assert!(slot.is_set());
    }
}
