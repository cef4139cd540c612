// Rust guideline compliant 2026-02-09

//! Tabula CLI library.
//!
//! This library exposes the CLI modules for use in tests and external code.

pub mod logging;
pub mod payload;
pub mod workspace;

pub use logging::{init_tracing, parse_log_level};
pub use payload::read_payload;
pub use workspace::{is_ok, Workspace, WorkspaceOptions};
