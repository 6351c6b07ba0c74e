use tracing_subscriber::{filter::EnvFilter, fmt::format::FmtSpan};

/// Logs go to stderr so stdout carries nothing but the JSON result.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .init();
}
