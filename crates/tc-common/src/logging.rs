//! Structured Logging Configuration
//!
//! - JSON output for production (LOG_FORMAT=json)
//! - Human-readable output for development (default)
//!
//! # Usage
//!
//! ```rust,ignore
//! use tc_common::logging::init_logging;
//!
//! fn main() {
//!     init_logging("tc-platform-server");
//!     tracing::info!(user_id = %id, "User logged in");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: Set to "json" for JSON output, anything else for text (default: text)
//! - `RUST_LOG`: Standard log level filter (default: info)
//!   Examples: `RUST_LOG=debug`, `RUST_LOG=tc_platform=debug,tower_http=info`

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Default filter when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

/// Output format selected from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Initialize logging for the given service.
///
/// Reads LOG_FORMAT to pick JSON or text output and RUST_LOG for filtering.
/// The service name is attached to the startup event so aggregated logs can
/// be told apart.
pub fn init_logging(service_name: &str) {
    let format = LogFormat::from_env_value(&std::env::var("LOG_FORMAT").unwrap_or_default());

    match format {
        LogFormat::Json => init_json_logging(build_filter()),
        LogFormat::Text => init_text_logging(build_filter()),
    }

    tracing::info!(service = service_name, format = ?format, "Logging initialized");
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize JSON logging for production.
fn init_json_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .init();
}

/// Initialize human-readable text logging for development.
fn init_text_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .init();
}
