//! Tracing setup shared by the binary and embedding applications

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `default_filter`
fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    use crate::context::SocketContext;

    #[test]
    fn test_filter_directives() {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("http_socket_client=debug"))
            .with(fmt::layer().with_test_writer());

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "http_socket_client::context", Level::DEBUG));
            assert!(!tracing::enabled!(target: "http_socket_client::context", Level::TRACE));
            assert!(!tracing::enabled!(target: "hyper::client", Level::DEBUG));

            // Emits through the scoped subscriber only
            SocketContext::new().close();
        });
    }
}
