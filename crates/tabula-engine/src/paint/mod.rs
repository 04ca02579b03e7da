//! Color types for clear/draw configuration.

mod color;

pub use color::Color;
