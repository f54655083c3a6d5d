//! ---
//! chimera_section: "03-common-runtime"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Shared configuration and logging for telemetry tools."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "CHIMERA_LOG";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
static STDERR_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Available console log formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    StructuredJson,
    #[default]
    Pretty,
}

/// Baseline subscriber for quick tooling and tests: stderr, `info` unless
/// `RUST_LOG` says otherwise.
pub fn init() {
    let _ = Registry::default()
        .with(resolve_filter(std::env::var("RUST_LOG").ok()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize the tracing subscriber based on configuration and environment variables.
///
/// * `CHIMERA_LOG` overrides the filter (e.g. `debug,chimera_wire=trace`). When unset
///   the standard `RUST_LOG` variable is honoured, finally defaulting to `info`.
/// * Console output goes to stderr so decoded samples on stdout stay machine readable.
/// * With `file_enabled` a rolling daily JSON log is written under `directory`.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let filter = resolve_filter(directive);

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    let _ = STDERR_GUARD.set(stderr_guard);

    let console_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .json()
            .with_writer(stderr_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_writer(stderr_writer)
            .boxed(),
    };

    let file_layer = if config.file_enabled {
        std::fs::create_dir_all(&config.directory)?;
        let prefix = config
            .file_prefix
            .clone()
            .unwrap_or_else(|| service_name.to_owned());
        let file_appender = daily(&config.directory, format!("{}.log", prefix));
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        let _ = FILE_GUARD.set(file_guard);
        Some(
            fmt::layer()
                .with_target(true)
                .json()
                .with_writer(file_writer)
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    info!(
        service = %service_name,
        log_dir = %config.directory.display(),
        file_enabled = config.file_enabled,
        format = ?config.format,
        "tracing initialised"
    );
    Ok(())
}

fn resolve_filter(directive: Option<String>) -> EnvFilter {
    match directive.filter(|d| !d.trim().is_empty()) {
        Some(directive) => EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid log filter {:?} ({}); defaulting to info logging",
                directive, err
            );
            EnvFilter::new("info")
        }),
        None => EnvFilter::new("info"),
    }
}
