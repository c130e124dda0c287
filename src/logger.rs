use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Initialise logging using the tracing crate. `RUST_LOG` wins over the
/// crate-level debug default.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
