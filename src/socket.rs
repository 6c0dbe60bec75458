//! Connection handle produced by a successful handshake
//!
//! Message traffic over the socket is handled elsewhere; this type only
//! carries the identity established by the handshake and its registration
//! with the owning context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use crate::context::SocketContext;
use crate::identifier::Identifier;

/// An established HTTP socket
///
/// Clones share identity: closing one closes them all.
#[derive(Clone)]
pub struct HttpSocket {
    inner: Arc<Inner>,
}

struct Inner {
    context: Weak<SocketContext>,
    id: Identifier,
    connect_time: DateTime<Utc>,
    endpoint: Url,
    closed: AtomicBool,
}

impl HttpSocket {
    pub fn new(
        context: &Arc<SocketContext>,
        id: Identifier,
        connect_time: DateTime<Utc>,
        endpoint: Url,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                context: Arc::downgrade(context),
                id,
                connect_time,
                endpoint,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Session identifier issued by the server
    pub fn id(&self) -> Identifier {
        self.inner.id
    }

    /// When the connect attempt started (before the request was sent)
    pub fn connect_time(&self) -> DateTime<Utc> {
        self.inner.connect_time
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Owning context, if it is still alive
    pub fn context(&self) -> Option<Arc<SocketContext>> {
        self.inner.context.upgrade()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Close the socket and remove it from its context
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(context) = self.context() {
            context.deregister(self);
        }
        debug!("Socket {} closed", self.inner.id);
    }

    pub(crate) fn ptr_eq(&self, other: &HttpSocket) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for HttpSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSocket")
            .field("id", &self.inner.id)
            .field("connect_time", &self.inner.connect_time)
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_deregisters() {
        let context = SocketContext::new();
        let socket = HttpSocket::new(
            &context,
            Identifier::random(),
            Utc::now(),
            Url::parse("https://relay.example/socket").unwrap(),
        );
        context.add_socket(socket.clone()).unwrap();

        socket.close();

        assert!(socket.is_closed());
        assert!(context.get_socket(&socket.id()).is_none());
    }

    #[test]
    fn test_close_stale_socket_keeps_replacement() {
        let context = SocketContext::new();
        let id = Identifier::random();
        let url = Url::parse("https://relay.example/socket").unwrap();
        let stale = HttpSocket::new(&context, id, Utc::now(), url.clone());
        let fresh = HttpSocket::new(&context, id, Utc::now(), url);

        context.add_socket(stale.clone()).unwrap();
        context.add_socket(fresh.clone()).unwrap();
        stale.close();

        let registered = context.get_socket(&id).unwrap();
        assert!(registered.ptr_eq(&fresh));
    }

    #[test]
    fn test_outlives_context() {
        let context = SocketContext::new();
        let socket = HttpSocket::new(
            &context,
            Identifier::random(),
            Utc::now(),
            Url::parse("http://localhost/socket").unwrap(),
        );
        drop(context);

        assert!(socket.context().is_none());
        socket.close();
        assert!(socket.is_closed());
    }
}
