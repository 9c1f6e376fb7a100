//! Test utilities for rolegraph
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests:
//! - [`MockHost`] / [`MockProject`] - an in-memory GitLab with role and play projects
//! - [`init_test_logging`] - one-time tracing setup honouring `RUST_LOG`
//! - [`test_settings`] - settings with filters and an output directory, image rendering off

pub mod mock_host;

pub use mock_host::{MockHost, MockProject};

use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; without either, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=rolegraph=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// Quiet settings for `https://gitlab.example.com` writing into `output_dir`.
///
/// # Panics
///
/// Panics if a filter is not a valid regex.
#[must_use]
pub fn test_settings(filters: &[&str], output_dir: &Path) -> Settings {
    let mut settings = Settings::default()
        .with_filters(filters)
        .unwrap_or_else(|e| panic!("invalid test filter: {e}"));
    settings.output_dir = output_dir.to_path_buf();
    settings.render_image = false;
    settings.quiet = true;
    settings
}
