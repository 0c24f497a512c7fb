//! Drive engine for kvdrive
//!
//! This crate ties the lower layers into a serving drive:
//! - Drive: connections, single-key and batch operations, command dispatch
//! - DriveConfig: `kvdrive.toml` loading and validation
//! - StatusReporter: drive outcomes to protocol status codes
//!
//! The engine is the only component that knows about:
//! - Connection lifecycle (auto-abort on disconnect)
//! - Configuration files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod drive;
pub mod status;

pub use command::{Command, Output};
pub use config::{DriveConfig, CONFIG_FILE_NAME};
pub use drive::Drive;
pub use status::{ProtocolStatusReporter, StatusCode, StatusReport, StatusReporter};
