//! Tabula: a GPU whiteboard.
//!
//! Draw with the left mouse button. Pan with the right button (or hold Space
//! and drag). Zoom with the mouse wheel, anchored at the cursor. Drop an
//! image file onto the window, or press V to paste one from the clipboard.

mod app;
mod batch;
mod camera;
mod picture;
mod pipeline;
mod renderer;
mod stroke;

use std::time::Duration;

use anyhow::Result;
use winit::dpi::LogicalSize;

use tabula_engine::device::GpuInit;
use tabula_engine::logging::{init_logging, LoggingConfig};
use tabula_engine::window::{Runtime, RuntimeConfig};

use crate::app::BoardApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Tabula".to_string(),
        initial_size: LogicalSize::new(1280.0, 800.0),
        frame_interval: Duration::from_millis(100),
    };

    Runtime::run(config, GpuInit::default(), BoardApp::new())
}
