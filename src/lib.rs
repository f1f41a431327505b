//! Sueo - Korean sign language to speech
//!
//! Recognises sign gestures from detector output, assembles the recognised
//! words into a sentence with a language model and speaks it aloud.

pub mod accumulator;
pub mod config;
pub mod recognition;
pub mod sentence;
pub mod speech;
pub mod translator;

/// Set up logging to stdout and `~/.sueo/logs/sueo.log`
///
/// The level defaults to `info` and can be overridden with `RUST_LOG`.
/// Returns false if another global subscriber was already installed.
pub fn init_logging() -> bool {
    use tracing_subscriber::prelude::*;

    /// Format timestamps using the system's local time via chrono
    struct LocalTimer;
    impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
        fn format_time(
            &self,
            w: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        }
    }

    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let log_dir = config::get_data_dir().join("logs");
    let log_file = std::fs::create_dir_all(&log_dir).ok().and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("sueo.log"))
            .ok()
    });

    let installed = if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        let stdout_layer = tracing_subscriber::fmt::layer().with_timer(LocalTimer);
        tracing_subscriber::registry()
            .with(env_filter())
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_timer(LocalTimer)
            .try_init()
            .is_ok()
    };

    // A host application may have installed its own subscriber already
    if !installed {
        tracing::debug!("Global tracing subscriber already set, keeping it");
    }
    installed
}
