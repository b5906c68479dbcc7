//! Typed values exchanged with the native windowing library
//!
//! The native layer speaks raw integers. Trampolines translate them into the
//! enums below before user callbacks see them.

use bitflags::bitflags;

macro_rules! key_codes {
    ($($name:ident = $value:literal),* $(,)?) => {
        /// Keyboard keys, using the native key code values
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum KeyCode {
            $($name = $value,)*
        }

        impl KeyCode {
            /// Translate a raw native key code, falling back to [`KeyCode::Unknown`]
            pub fn from_raw(raw: i32) -> Self {
                match raw {
                    $($value => Self::$name,)*
                    _ => Self::Unknown,
                }
            }
        }
    };
}

key_codes! {
    Unknown = -1,
    Space = 32, Apostrophe = 39, Comma = 44, Minus = 45, Period = 46, Slash = 47,
    Num0 = 48, Num1 = 49, Num2 = 50, Num3 = 51, Num4 = 52,
    Num5 = 53, Num6 = 54, Num7 = 55, Num8 = 56, Num9 = 57,
    Semicolon = 59, Equal = 61,
    A = 65, B = 66, C = 67, D = 68, E = 69, F = 70, G = 71, H = 72, I = 73,
    J = 74, K = 75, L = 76, M = 77, N = 78, O = 79, P = 80, Q = 81, R = 82,
    S = 83, T = 84, U = 85, V = 86, W = 87, X = 88, Y = 89, Z = 90,
    LeftBracket = 91, Backslash = 92, RightBracket = 93, GraveAccent = 96,
    World1 = 161, World2 = 162,
    Escape = 256, Enter = 257, Tab = 258, Backspace = 259, Insert = 260, Delete = 261,
    Right = 262, Left = 263, Down = 264, Up = 265,
    PageUp = 266, PageDown = 267, Home = 268, End = 269,
    CapsLock = 280, ScrollLock = 281, NumLock = 282, PrintScreen = 283, Pause = 284,
    F1 = 290, F2 = 291, F3 = 292, F4 = 293, F5 = 294, F6 = 295, F7 = 296, F8 = 297,
    F9 = 298, F10 = 299, F11 = 300, F12 = 301, F13 = 302, F14 = 303, F15 = 304,
    F16 = 305, F17 = 306, F18 = 307, F19 = 308, F20 = 309, F21 = 310, F22 = 311,
    F23 = 312, F24 = 313, F25 = 314,
    Kp0 = 320, Kp1 = 321, Kp2 = 322, Kp3 = 323, Kp4 = 324,
    Kp5 = 325, Kp6 = 326, Kp7 = 327, Kp8 = 328, Kp9 = 329,
    KpDecimal = 330, KpDivide = 331, KpMultiply = 332, KpSubtract = 333,
    KpAdd = 334, KpEnter = 335, KpEqual = 336,
    LeftShift = 340, LeftControl = 341, LeftAlt = 342, LeftSuper = 343,
    RightShift = 344, RightControl = 345, RightAlt = 346, RightSuper = 347,
    Menu = 348,
}

impl KeyCode {
    /// Raw native key code
    pub const fn raw(self) -> i32 {
        self as i32
    }
}

/// State change reported for a key or mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Released
    Release,
    /// Pressed
    Press,
    /// Held down until it repeated
    Repeat,
}

impl InputAction {
    /// Translate a raw native action; unknown values read as a release
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Press,
            2 => Self::Repeat,
            _ => Self::Release,
        }
    }

    /// Human readable past tense used in key logs
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Release => "released",
            Self::Press => "pressed",
            Self::Repeat => "repeated",
        }
    }
}

bitflags! {
    /// Modifier keys held during a key, char or mouse button event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: i32 {
        /// Either shift key
        const SHIFT = 0x0001;
        /// Either control key
        const CONTROL = 0x0002;
        /// Either alt key
        const ALT = 0x0004;
        /// Either super key
        const SUPER = 0x0008;
        /// Caps lock is enabled
        const CAPS_LOCK = 0x0010;
        /// Num lock is enabled
        const NUM_LOCK = 0x0020;
    }
}

/// Mouse buttons, numbered as the native library numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Middle button
    Middle,
    /// Extra buttons 4 through 8
    Extra(u8),
}

impl MouseButton {
    /// Translate a raw native button index
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Middle,
            n => Self::Extra(u8::try_from(n + 1).unwrap_or(u8::MAX)),
        }
    }

    /// Raw native button index
    pub fn raw(self) -> i32 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
            Self::Extra(n) => i32::from(n) - 1,
        }
    }
}

/// One of the sixteen joystick slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Joystick(i32);

impl Joystick {
    /// Number of joystick slots the library tracks
    pub const COUNT: i32 = 16;

    /// Joystick slot by index (0-based)
    pub const fn new(index: i32) -> Option<Self> {
        if index >= 0 && index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Every joystick slot
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self)
    }

    /// Raw native joystick id
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Device connection change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEvent {
    /// The device was connected
    Connected,
    /// The device was disconnected
    Disconnected,
}

impl ConnectionEvent {
    /// Raw native value for a connection
    pub const CONNECTED: i32 = 0x0004_0001;
    /// Raw native value for a disconnection
    pub const DISCONNECTED: i32 = 0x0004_0002;

    /// Translate a raw native connection event
    pub const fn from_raw(raw: i32) -> Self {
        if raw == Self::CONNECTED {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    /// Raw native value
    pub const fn raw(self) -> i32 {
        match self {
            Self::Connected => Self::CONNECTED,
            Self::Disconnected => Self::DISCONNECTED,
        }
    }
}

/// Standard cursor shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    /// Regular arrow
    Arrow,
    /// Text input I-beam
    IBeam,
    /// Crosshair
    Crosshair,
    /// Hand
    Hand,
    /// Horizontal resize arrows
    HResize,
    /// Vertical resize arrows
    VResize,
}

/// Cursor behaviour for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CursorMode {
    /// Visible and unrestricted
    Normal = 0x0003_4001,
    /// Hidden while over the window
    Hidden = 0x0003_4002,
    /// Hidden and locked to the window
    Disabled = 0x0003_4003,
}

impl CursorMode {
    /// Translate a raw native cursor mode
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0x0003_4002 => Self::Hidden,
            0x0003_4003 => Self::Disabled,
            _ => Self::Normal,
        }
    }
}

/// Per-window input options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum InputMode {
    /// Cursor mode, see [`CursorMode`]
    Cursor = 0x0003_3001,
    /// Keep key presses until queried
    StickyKeys = 0x0003_3002,
    /// Keep mouse button presses until queried
    StickyMouseButtons = 0x0003_3003,
}

/// Queryable window and context attributes
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum WindowAttribute {
    Focused = 0x0002_0001,
    Iconified = 0x0002_0002,
    Resizable = 0x0002_0003,
    Visible = 0x0002_0004,
    Decorated = 0x0002_0005,
    AutoIconify = 0x0002_0006,
    Floating = 0x0002_0007,
    Maximized = 0x0002_0008,
    ClientApi = 0x0002_2001,
    ContextVersionMajor = 0x0002_2002,
    ContextVersionMinor = 0x0002_2003,
    ContextRevision = 0x0002_2004,
    ContextRobustness = 0x0002_2005,
    OpenGlForwardCompat = 0x0002_2006,
    OpenGlDebugContext = 0x0002_2007,
    OpenGlProfile = 0x0002_2008,
}

/// OpenGL profile requested through [`WindowHint::OpenGlProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenGlProfile {
    /// Let the driver decide
    Any,
    /// Core profile
    Core,
    /// Compatibility profile
    Compat,
}

/// Hints applied to the next window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowHint {
    /// Whether the user can resize the window
    Resizable(bool),
    /// Whether the window is initially visible
    Visible(bool),
    /// Whether the window has decorations
    Decorated(bool),
    /// Whether the window gets input focus on creation
    Focused(bool),
    /// Whether a full screen window iconifies on focus loss
    AutoIconify(bool),
    /// Whether the window floats above others
    Floating(bool),
    /// Whether the window starts maximized
    Maximized(bool),
    /// Multisample count, `None` for don't care
    Samples(Option<u32>),
    /// Whether the framebuffer is double buffered
    DoubleBuffer(bool),
    /// Requested context version (major, minor)
    ContextVersion(u32, u32),
    /// Requested OpenGL profile
    OpenGlProfile(OpenGlProfile),
    /// Forward compatible context
    OpenGlForwardCompat(bool),
    /// Debug context
    OpenGlDebugContext(bool),
}

/// Event types that can carry a per-window callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Window moved
    WindowPos,
    /// Window resized (screen coordinates)
    WindowSize,
    /// User asked to close the window
    Close,
    /// Contents need redrawing
    Refresh,
    /// Focus gained or lost
    Focus,
    /// Iconified or restored
    Iconify,
    /// Framebuffer resized (pixels)
    FramebufferSize,
    /// Physical key
    Key,
    /// Unicode character
    Char,
    /// Unicode character with modifiers
    CharMods,
    /// Mouse button
    MouseButton,
    /// Cursor moved
    CursorPos,
    /// Cursor entered or left the window
    CursorEnter,
    /// Scroll wheel or touchpad scroll
    Scroll,
    /// Files dropped onto the window
    Drop,
}

/// Window state changes with no arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowCommand {
    /// Minimize
    Iconify,
    /// Undo iconify or maximize
    Restore,
    /// Maximize
    Maximize,
    /// Make visible
    Show,
    /// Hide
    Hide,
    /// Bring to front and focus
    Focus,
}

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point2D<T> {
    /// Horizontal coordinate
    pub x: T,
    /// Vertical coordinate
    pub y: T,
}

impl<T> Point2D<T> {
    /// Create a point
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Width and height of a window or framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size2D {
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Size2D {
    /// Create a size
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero or negative (e.g. an iconified window)
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Edges of an area, e.g. the window frame around the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Area2D {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl Area2D {
    /// Create an area from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal extent
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Vertical extent
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A monitor video mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VideoMode {
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
    /// Red channel depth
    pub red_bits: u32,
    /// Green channel depth
    pub green_bits: u32,
    /// Blue channel depth
    pub blue_bits: u32,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
}

/// Snapshot of a connected monitor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorInfo {
    /// Human readable name
    pub name: Option<String>,
    /// Position of the monitor's viewport on the virtual screen
    pub position: Point2D<i32>,
    /// Physical size in millimetres
    pub physical_size_mm: Size2D,
    /// All supported video modes
    pub video_modes: Vec<VideoMode>,
    /// Current video mode
    pub video_mode: Option<VideoMode>,
}

/// Per-channel gamma ramp of a monitor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GammaRamp {
    /// Red channel response
    pub red: Vec<u16>,
    /// Green channel response
    pub green: Vec<u16>,
    /// Blue channel response
    pub blue: Vec<u16>,
}

impl GammaRamp {
    /// Ramp for a plain power curve with the given exponent, the same for all
    /// channels
    pub fn from_exponent(gamma: f32, size: usize) -> Self {
        let last = size.saturating_sub(1).max(1) as f32;
        let channel: Vec<u16> = (0..size)
            .map(|i| {
                let value = (i as f32 / last).powf(1.0 / gamma) * 65535.0 + 0.5;
                value.min(65535.0) as u16
            })
            .collect();
        Self {
            red: channel.clone(),
            green: channel.clone(),
            blue: channel,
        }
    }

    /// Entries per channel, `None` when the channels differ in length
    pub fn size(&self) -> Option<usize> {
        let size = self.red.len();
        (self.green.len() == size && self.blue.len() == size).then_some(size)
    }
}

/// Tightly packed 8-bit RGBA pixels, as used for cursors and icons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaPixels {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height * 4` bytes, rows top to bottom
    pub data: Vec<u8>,
}
