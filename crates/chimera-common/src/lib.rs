//! ---
//! chimera_section: "03-common-runtime"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Shared configuration and logging for telemetry tools."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Shared primitives for the Chimera telemetry tools.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the workspace binaries.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ExportConfig, LoadedAppConfig, LoggingConfig, StreamConfig};
pub use logging::{init, init_tracing, LogFormat};
