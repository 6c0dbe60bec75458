//! Client context: live-connection registry
//!
//! Every socket established by a handshake is registered here under its
//! session identifier. The registry is a [`DashMap`], so worker threads can
//! insert concurrently while other subsystems read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::document::{DocumentParser, XmlDocumentParser};
use crate::error::ConnectError;
use crate::identifier::Identifier;
use crate::socket::HttpSocket;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Registry lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    /// A socket finished its handshake and was registered
    SocketAdded(Identifier),
    /// A socket was closed and removed
    SocketRemoved(Identifier),
    /// The context was closed
    Closed,
}

/// Owner of established sockets and of the reply document parser
pub struct SocketContext {
    sockets: DashMap<Identifier, HttpSocket>,
    parser: Box<dyn DocumentParser>,
    events: broadcast::Sender<ContextEvent>,
    closed: AtomicBool,
}

impl SocketContext {
    /// Create a context using the XML reply parser
    pub fn new() -> Arc<Self> {
        Self::with_parser(XmlDocumentParser)
    }

    /// Create a context with a custom reply parser
    pub fn with_parser(parser: impl DocumentParser + 'static) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            sockets: DashMap::new(),
            parser: Box::new(parser),
            events,
            closed: AtomicBool::new(false),
        })
    }

    pub fn parser(&self) -> &dyn DocumentParser {
        self.parser.as_ref()
    }

    /// Register a newly connected socket.
    ///
    /// Fails with [`ConnectError::ContextClosed`] once [`close`](Self::close)
    /// has been called; the socket is then not registered.
    pub fn add_socket(&self, socket: HttpSocket) -> Result<(), ConnectError> {
        if self.is_closed() {
            return Err(ConnectError::ContextClosed);
        }

        let id = socket.id();
        let registered = socket.clone();
        if let Some(previous) = self.sockets.insert(id, socket) {
            // Server reissued a live id; the newer socket replaces it
            warn!("Replaced existing socket {} (connected at {})", id, previous.connect_time());
        }

        // close() may have run between the check and the insert
        if self.is_closed() {
            self.sockets.remove_if(&id, |_, s| s.ptr_eq(&registered));
            return Err(ConnectError::ContextClosed);
        }

        info!("Registered socket {}", id);
        let _ = self.events.send(ContextEvent::SocketAdded(id));
        Ok(())
    }

    pub fn get_socket(&self, id: &Identifier) -> Option<HttpSocket> {
        self.sockets.get(id).map(|s| s.clone())
    }

    /// Remove a socket from the registry, returning it if present
    pub fn remove_socket(&self, id: &Identifier) -> Option<HttpSocket> {
        let (_, socket) = self.sockets.remove(id)?;
        debug!("Removed socket {}", id);
        let _ = self.events.send(ContextEvent::SocketRemoved(*id));
        Some(socket)
    }

    /// Remove `socket` only if it is still the registered instance for its id
    pub(crate) fn deregister(&self, socket: &HttpSocket) {
        let id = socket.id();
        if self.sockets.remove_if(&id, |_, s| s.ptr_eq(socket)).is_some() {
            debug!("Removed socket {}", id);
            let _ = self.events.send(ContextEvent::SocketRemoved(id));
        }
    }

    /// Snapshot of all live sockets
    pub fn sockets(&self) -> Vec<HttpSocket> {
        self.sockets.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Subscribe to registry events
    pub fn subscribe(&self) -> broadcast::Receiver<ContextEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close every registered socket and mark the context closed
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let ids: Vec<Identifier> = self.sockets.iter().map(|entry| *entry.key()).collect();
        for id in &ids {
            if let Some(socket) = self.get_socket(id) {
                socket.close();
            }
        }

        info!("Socket context closed ({} sockets)", ids.len());
        let _ = self.events.send(ContextEvent::Closed);
    }
}

impl std::fmt::Debug for SocketContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketContext")
            .field("sockets", &self.sockets.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use url::Url;

    fn socket(context: &Arc<SocketContext>) -> HttpSocket {
        HttpSocket::new(
            context,
            Identifier::random(),
            Utc::now(),
            Url::parse("http://localhost:8080/socket").unwrap(),
        )
    }

    #[test]
    fn test_add_and_get() {
        let context = SocketContext::new();
        let socket = socket(&context);
        let id = socket.id();

        context.add_socket(socket).unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context.get_socket(&id).unwrap().id(), id);
    }

    #[test]
    fn test_remove() {
        let context = SocketContext::new();
        let socket = socket(&context);
        let id = socket.id();
        context.add_socket(socket).unwrap();

        assert!(context.remove_socket(&id).is_some());
        assert!(context.remove_socket(&id).is_none());
        assert!(context.is_empty());
    }

    #[test]
    fn test_events() {
        let context = SocketContext::new();
        let mut events = context.subscribe();
        let socket = socket(&context);
        let id = socket.id();

        context.add_socket(socket).unwrap();
        context.close();

        assert_eq!(events.try_recv().unwrap(), ContextEvent::SocketAdded(id));
        assert_eq!(events.try_recv().unwrap(), ContextEvent::SocketRemoved(id));
        assert_eq!(events.try_recv().unwrap(), ContextEvent::Closed);
    }

    #[test]
    fn test_close_closes_sockets() {
        let context = SocketContext::new();
        let a = socket(&context);
        let b = socket(&context);
        context.add_socket(a.clone()).unwrap();
        context.add_socket(b.clone()).unwrap();

        context.close();
        context.close();

        assert!(context.is_closed());
        assert!(context.is_empty());
        assert!(a.is_closed());
        assert!(b.is_closed());
    }

    #[test]
    fn test_add_after_close_rejected() {
        let context = SocketContext::new();
        let mut events = context.subscribe();
        context.close();

        let socket = socket(&context);
        let id = socket.id();
        let err = context.add_socket(socket).unwrap_err();

        assert!(matches!(err, ConnectError::ContextClosed));
        assert!(context.get_socket(&id).is_none());
        assert_eq!(events.try_recv().unwrap(), ContextEvent::Closed);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_insert() {
        let context = SocketContext::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let context = Arc::clone(&context);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let s = socket(&context);
                        context.add_socket(s).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(context.len(), 400);
    }
}
