use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_FILTER: &str = "parlay_terminal=info,warn";

/// Logs to stderr, filtered by `RUST_LOG` or `default_filter`.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// For full-screen terminal use: stays silent unless `RUST_LOG` asks for output.
pub fn init_quiet() {
    if std::env::var_os("RUST_LOG").is_some() {
        init("off");
    }
}
