//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else goes through the
//! standard `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
