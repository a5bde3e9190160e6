//! Logging initialization module
//!
//! Provides the single initialization point for the logging facility.

use crate::errors::{ExError, ExErrorKind, Result};
use std::path::Path;
use std::str::FromStr;
use std::sync::Once;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "formwatch=debug,info",
            Profile::Production | Profile::Test => "formwatch=info,warn",
        }
    }
}

impl FromStr for Profile {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(ExError::new(ExErrorKind::Config)
                .with_op("parse_log_profile")
                .with_message(format!("unknown logging profile '{}'", other))),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at process startup; later calls are no-ops.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Bare registry, events are captured via `init_test_capture()`
///
/// # Example
///
/// ```
/// use formwatch_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| install(profile, None));
}

/// Initialize the logging facility and mirror every event into `path`
///
/// Events are appended without ANSI colours by a background writer thread.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the writer.
///
/// # Errors
///
/// Returns `ExErrorKind::Io` if `path` names no file or the log file cannot
/// be opened.
pub fn init_with_file(profile: Profile, path: &Path) -> Result<WorkerGuard> {
    let file_name = path.file_name().ok_or_else(|| {
        ExError::new(ExErrorKind::Io)
            .with_op("init_log_file")
            .with_message(format!("log path {} names no file", path.display()))
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("init_log_file")
                .with_message(format!("cannot open {}: {}", path.display(), e))
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    INIT_ONCE.call_once(|| install(profile, Some(writer)));
    Ok(guard)
}

fn install(profile: Profile, file: Option<NonBlocking>) {
    if profile == Profile::Test {
        // Test capture is initialized separately via init_test_capture()
        let _ = tracing_subscriber::registry().try_init();
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
    let file_layer = file.map(|writer| fmt::layer().with_ansi(false).with_writer(writer).boxed());

    // A subscriber may already be installed by an embedding process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(profile))
        .with(file_layer)
        .try_init();
}

fn console_layer<S>(profile: Profile) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match profile {
        Profile::Production => fmt::layer().json().with_current_span(true).boxed(),
        _ => fmt::layer().boxed(),
    }
}
