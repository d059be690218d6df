use tracing_forest::ForestLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global tracing subscriber used by tests, benches and
/// embedding binaries.
///
/// Spans are rendered as a forest, filtered by `RUST_LOG` (`info` when
/// unset). With the `tracing-profile` or `perfetto` features the profiling
/// layer is installed instead. Calling it again once a subscriber is set is
/// a no-op.
pub fn init_logger() {
    if cfg!(feature = "tracing-profile") || cfg!(feature = "perfetto") {
        if tracing_profile::init_tracing().is_err() {
            eprintln!("tracing-profile layer could not be installed");
        }
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(ForestLayer::default())
        .try_init();
    if installed.is_ok() {
        tracing::debug!("trace logger installed");
    }
}
