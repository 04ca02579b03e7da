//! Coordinate and geometry types shared by the engine and the board.
//!
//! Spaces:
//! - Screen: logical pixels, origin top-left, +Y down.
//! - NDC: [-1, 1] on both axes, +Y up.
//! - World: whiteboard space; the camera (a `Mat3`) maps world to NDC.

mod mat3;
mod vec2;
mod viewport;

pub use mat3::Mat3;
pub use vec2::Vec2;
pub use viewport::Viewport;
