//! Foundation module - logging setup and frame timing

pub mod logging;
pub mod time;
