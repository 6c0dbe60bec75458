//! HTTP socket client
//!
//! # Example
//!
//! ```rust,no_run
//! use http_socket_client::{ClientConfig, HttpSocketClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpSocketClient::new(ClientConfig::default())?;
//!
//! client.connect_with("https://relay.example/socket", |result| match result {
//!     Ok(socket) => println!("connected: {}", socket.id()),
//!     Err(e) => eprintln!("connect failed: {}", e),
//! })?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::callback::{Completion, OnConnect, OnError};
use crate::config::ClientConfig;
use crate::context::SocketContext;
use crate::dispatcher::Dispatcher;
use crate::error::{ConnectError, DispatchError};
use crate::handshake;
use crate::socket::HttpSocket;

/// Client side of bidirectional messaging over HTTP
pub struct HttpSocketClient {
    context: Arc<SocketContext>,
    dispatcher: Dispatcher,
    http: Client,
    config: ClientConfig,
}

impl HttpSocketClient {
    /// Create a client with its own context
    pub fn new(config: ClientConfig) -> Result<Self, ConnectError> {
        Self::with_context(config, SocketContext::new())
    }

    /// Create a client registering sockets into an existing context
    pub fn with_context(config: ClientConfig, context: Arc<SocketContext>) -> Result<Self, ConnectError> {
        let http = handshake::http_client(&config)?;
        let dispatcher = Dispatcher::new(&config)?;

        Ok(Self {
            context,
            dispatcher,
            http,
            config,
        })
    }

    /// Asynchronously connect to `endpoint`.
    ///
    /// Returns once the attempt is scheduled. Exactly one of `on_connect` or
    /// `on_error` is then called from a worker thread; an absent sink is skipped.
    /// Fails only if the dispatcher cannot schedule the attempt, in which case
    /// neither sink is called.
    pub fn connect(
        &self,
        endpoint: impl Into<String>,
        on_connect: Option<OnConnect>,
        on_error: Option<OnError>,
    ) -> Result<(), DispatchError> {
        self.dispatch(endpoint.into(), Completion::Split { on_connect, on_error })
    }

    /// Asynchronously connect, delivering the outcome to a single handler
    pub fn connect_with<F>(&self, endpoint: impl Into<String>, on_complete: F) -> Result<(), DispatchError>
    where
        F: FnOnce(Result<HttpSocket, ConnectError>) + Send + 'static,
    {
        self.dispatch(endpoint.into(), Completion::Single(Box::new(on_complete)))
    }

    fn dispatch(&self, endpoint: String, completion: Completion) -> Result<(), DispatchError> {
        let context = Arc::clone(&self.context);
        let http = self.http.clone();

        debug!("Scheduling connect to {}", endpoint);
        self.dispatcher.submit(async move {
            let result = handshake::perform(&context, &http, &endpoint).await;
            completion.complete(result);
        })
    }

    pub fn context(&self) -> &Arc<SocketContext> {
        &self.context
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dispose of the dispatcher, then close all sockets
    pub fn close(&self) {
        self.dispatcher.dispose();
        self.context.close();
    }
}
