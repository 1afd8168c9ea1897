//! # Logging Initialization
//!
//! `init_logging()` installs the global `tracing` subscriber once per process.
//!
//! - The filter comes from `RUST_LOG`, defaulting to the requested level with
//!   `debug` for this crate.
//! - By default logs go to a daily rolling file in the user cache directory
//!   (`directories`), written through a non-blocking `tracing_appender` writer
//!   without ANSI colors.
//! - With `log_to_file = false`, or when the cache directory is missing or not
//!   writable, logs go to stderr with colors.
//! - With the `opentelemetry` feature, spans are also exported over OTLP/HTTP
//!   to `OTEL_EXPORTER_OTLP_ENDPOINT`. Setting only `SHEETS_TRACING` exports to
//!   a collector on localhost.

use anyhow::Result;
use directories::ProjectDirs;
#[cfg(feature = "opentelemetry")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "opentelemetry")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "opentelemetry")]
use opentelemetry_sdk::{
    Resource,
    trace::{self as sdktrace, SdkTracerProvider},
};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{EnvFilter, fmt::layer, fmt::writer::BoxMakeWriter, prelude::*};

static INIT: Once = Once::new();

const LOG_FILE_NAME: &str = "sheets_backend.log";

#[cfg(any(feature = "opentelemetry", test))]
const LOCAL_COLLECTOR: &str = "http://localhost:4318";

pub fn default_filter(log_level: &str) -> String {
    format!("{log_level},sheets_backend=debug")
}

/// Initializes the global subscriber. Later calls are no-ops.
pub fn init_logging(log_level: &str, log_to_file: bool) -> Result<()> {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

        let file = if log_to_file {
            log_directory().and_then(|dir| rolling_file(&dir))
        } else {
            None
        };
        let (writer, ansi) = match file {
            Some(file) => (BoxMakeWriter::new(file), false),
            None => (BoxMakeWriter::new(std::io::stderr), true),
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(layer().with_writer(writer).with_ansi(ansi));

        #[cfg(feature = "opentelemetry")]
        let subscriber = subscriber.with(otel_layer());

        subscriber.init();
    });

    Ok(())
}

fn log_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "GoogleSheets", "sheets_backend")
        .map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Non-blocking daily log file in `dir`, if the directory is usable.
fn rolling_file(dir: &Path) -> Option<NonBlocking> {
    if !is_writable_dir(dir) {
        return None;
    }
    // rolling::daily panics when it cannot open the file.
    let appender = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        tracing_appender::rolling::daily(dir, LOG_FILE_NAME)
    }))
    .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // The guard must live as long as the process.
    std::mem::forget(guard);
    Some(writer)
}

/// Creates `dir` if needed and checks a file can be written there.
fn is_writable_dir(dir: &Path) -> bool {
    let marker = dir.join(".sheets_log_test");
    let writable = std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&marker, b"ok"))
        .is_ok();
    if writable {
        let _ = std::fs::remove_file(&marker);
    }
    writable
}

/// OTLP/HTTP traces URL. An explicit base endpoint wins; otherwise tracing
/// must be switched on and the local collector is used.
#[cfg(any(feature = "opentelemetry", test))]
fn otlp_traces_url(endpoint: Option<String>, tracing_requested: bool) -> Option<String> {
    let base = match endpoint.filter(|e| !e.trim().is_empty()) {
        Some(endpoint) => endpoint,
        None if tracing_requested => LOCAL_COLLECTOR.to_string(),
        None => return None,
    };
    let base = base.trim().trim_end_matches('/');
    if base.ends_with("/v1/traces") {
        Some(base.to_string())
    } else {
        Some(format!("{base}/v1/traces"))
    }
}

#[cfg(feature = "opentelemetry")]
fn otel_layer<S>() -> Option<tracing_opentelemetry::OpenTelemetryLayer<S, sdktrace::Tracer>>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let url = otlp_traces_url(
        std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        std::env::var_os("SHEETS_TRACING").is_some(),
    )?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(url)
        .build()
        .ok()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name("sheets_backend").build())
        .with_batch_exporter(exporter)
        .build();

    Some(tracing_opentelemetry::layer().with_tracer(provider.tracer("sheets_backend")))
}
