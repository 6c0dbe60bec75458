//! Completion delivery for connect attempts

use tracing::debug;

use crate::error::ConnectError;
use crate::socket::HttpSocket;

/// Sink for a successfully connected socket
pub type OnConnect = Box<dyn FnOnce(HttpSocket) + Send + 'static>;

/// Sink for a failed attempt
pub type OnError = Box<dyn FnOnce(ConnectError) + Send + 'static>;

/// Single completion handler receiving the attempt's result
pub type OnComplete = Box<dyn FnOnce(Result<HttpSocket, ConnectError>) + Send + 'static>;

/// How the outcome of an attempt is handed back to the caller
pub enum Completion {
    /// Separate optional sinks; an absent sink silently drops its outcome
    Split {
        on_connect: Option<OnConnect>,
        on_error: Option<OnError>,
    },
    /// One handler for both outcomes
    Single(OnComplete),
}

impl Completion {
    /// Deliver `result` to exactly one sink
    pub fn complete(self, result: Result<HttpSocket, ConnectError>) {
        match self {
            Completion::Split { on_connect, on_error } => match result {
                Ok(socket) => {
                    if let Some(on_connect) = on_connect {
                        debug!("Calling on_connect for {}", socket.id());
                        on_connect(socket);
                    }
                }
                Err(e) => {
                    if let Some(on_error) = on_error {
                        debug!("Calling on_error");
                        on_error(e);
                    }
                }
            },
            Completion::Single(on_complete) => on_complete(result),
        }
    }
}
