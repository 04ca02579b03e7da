//! Tabula engine crate.
//!
//! Owns the platform + GPU runtime pieces the whiteboard is built on.

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
