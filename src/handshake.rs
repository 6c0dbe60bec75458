//! Connect handshake
//!
//! One attempt is a single POST of `action=connect` to the endpoint. The
//! server answers `200 OK` with a `connection` document carrying the new
//! session identifier:
//!
//! ```text
//! POST /socket HTTP/1.1
//! Content-Type: application/x-www-form-urlencoded
//! Content-Length: 14
//!
//! action=connect
//!
//! HTTP/1.1 200 OK
//!
//! <connection id="hN4tVzq8RbGkY2mPwXc7Ja"/>
//! ```
//!
//! On success the socket is registered with the context before it is
//! returned. Any failure leaves the context untouched.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use reqwest::{header, redirect, Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::context::SocketContext;
use crate::error::{ConnectError, ProtocolError, Result};
use crate::identifier::Identifier;
use crate::socket::HttpSocket;

/// Fixed request body
pub const CONNECT_REQUEST: &[u8] = b"action=connect";

/// Required root element of the reply
pub const CONNECTION_ELEMENT: &str = "connection";

/// Attribute of the root element holding the session identifier
pub const ID_ATTRIBUTE: &str = "id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Progress of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Built,
    Sent,
    AwaitingResponse,
    Parsed,
    Succeeded,
    Failed,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Build the HTTP client used for handshakes.
///
/// Redirects are never followed and both connect and read phases are bounded
/// by the configured ceilings.
pub fn http_client(config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .redirect(redirect::Policy::none());

    if let Some(ref user_agent) = config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build()
}

/// Parse an endpoint string into an absolute HTTP(S) URL
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| ConnectError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConnectError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme: {}", other),
        }),
    }
}

/// Perform one connect attempt against `endpoint`.
///
/// Registers the resulting socket in `context` only when every step succeeds.
pub async fn perform(context: &Arc<SocketContext>, http: &Client, endpoint: &str) -> Result<HttpSocket> {
    let mut attempt = Attempt::new(endpoint);

    let result = match attempt.run(context, http).await {
        Ok(socket) => context.add_socket(socket.clone()).map(|()| socket),
        Err(e) => Err(e),
    };

    match result {
        Ok(socket) => {
            attempt.advance(HandshakeState::Succeeded);
            Ok(socket)
        }
        Err(e) => {
            let failed_in = attempt.state;
            attempt.advance(HandshakeState::Failed);
            warn!(endpoint, state = %failed_in, error = %e, "Handshake failed");
            Err(e)
        }
    }
}

struct Attempt<'a> {
    endpoint: &'a str,
    state: HandshakeState,
}

impl<'a> Attempt<'a> {
    fn new(endpoint: &'a str) -> Self {
        trace!(endpoint, state = %HandshakeState::Built, "Handshake request built");
        Self {
            endpoint,
            state: HandshakeState::Built,
        }
    }

    fn advance(&mut self, state: HandshakeState) {
        trace!(endpoint = self.endpoint, from = %self.state, to = %state, "Handshake state");
        self.state = state;
    }

    async fn run(&mut self, context: &Arc<SocketContext>, http: &Client) -> Result<HttpSocket> {
        // Creation time of the socket, taken before any network activity
        let connect_time = Utc::now();
        let endpoint = parse_endpoint(self.endpoint)?;

        debug!("Connecting to {}", endpoint);
        let pending = http
            .post(endpoint.clone())
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(CONNECT_REQUEST)
            .send();
        self.advance(HandshakeState::Sent);

        let response = pending.await?;
        self.advance(HandshakeState::AwaitingResponse);

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ConnectError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        debug!("Got connection response from {}", endpoint);

        let body = response.text().await?;
        let root = context.parser().parse_root(&body)?;
        if root.name != CONNECTION_ELEMENT {
            return Err(ProtocolError::UnexpectedRoot(root.name).into());
        }

        let id = match root.attribute(ID_ATTRIBUTE) {
            Some(value) => Identifier::parse(value)?,
            None => return Err(ProtocolError::MissingId.into()),
        };
        self.advance(HandshakeState::Parsed);
        debug!("Got id={} from {}", id, endpoint);

        Ok(HttpSocket::new(context, id, connect_time, endpoint))
    }
}
