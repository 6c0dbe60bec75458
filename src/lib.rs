//! Client for bidirectional messaging tunneled over HTTP
//!
//! Used where raw sockets are unavailable (restrictive proxies, locked-down
//! networks). A connection starts with a handshake: the client POSTs
//! `action=connect` to the endpoint and the server replies with a
//! `<connection id="…"/>` document naming the new session.
//!
//! [`HttpSocketClient::connect`] schedules that handshake on a background
//! [`Dispatcher`] and returns immediately; the resulting [`HttpSocket`] is
//! registered in the client's [`SocketContext`] and handed to the caller's
//! callback.
//!
//! # Example
//!
//! ```rust,no_run
//! use http_socket_client::{ClientConfig, HttpSocketClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpSocketClient::new(ClientConfig::default())?;
//!
//! client.connect(
//!     "https://relay.example/socket",
//!     Some(Box::new(|socket: http_socket_client::HttpSocket| println!("connected: {}", socket.id()))),
//!     Some(Box::new(|e: http_socket_client::ConnectError| eprintln!("connect failed: {}", e))),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod handshake;
pub mod identifier;
pub mod logging;
pub mod socket;

// Re-export main types
pub use callback::{Completion, OnComplete, OnConnect, OnError};
pub use client::HttpSocketClient;
pub use config::ClientConfig;
pub use context::{ContextEvent, SocketContext};
pub use dispatcher::Dispatcher;
pub use document::{DocumentParser, RootElement, XmlDocumentParser};
pub use error::{ConfigError, ConnectError, DispatchError, ErrorKind, ProtocolError, Result};
pub use identifier::Identifier;
pub use socket::HttpSocket;
