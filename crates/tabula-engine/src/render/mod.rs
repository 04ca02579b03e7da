//! Renderer-facing context types.
//!
//! Renderers record GPU commands through these; the runtime owns frame
//! acquisition and submission.
//!
//! Convention:
//! - CPU geometry is in world space.
//! - The vertex shader converts to NDC via a camera uniform.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
