//! HTTP server implementation
//!
//! `HttpServer` handles a single connection: one request in, one response
//! out. `Listener` accepts connections and gives each its own thread.

use super::{
    decode_request, Error, FrameParser, HttpRequest, HttpResponse, HttpSession, Result, Router,
    SessionOps, DEFAULT_MAX_MESSAGE_BYTES,
};
use super::session::FdSessionOps;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const LISTEN_BACKLOG: i32 = 128;

/// HTTP server side of one connection
///
/// Provides methods for receiving a request and sending the response.
pub struct HttpServer<S: SessionOps> {
    session: HttpSession<S>,
    framer: FrameParser,
}

impl<S: SessionOps> HttpServer<S> {
    /// Create a new HTTP server with a session
    pub fn new(session: S) -> Self {
        HttpServer::with_max_message_bytes(session, DEFAULT_MAX_MESSAGE_BYTES)
    }

    /// Create a server that rejects requests larger than `max_message_bytes`
    pub fn with_max_message_bytes(session: S, max_message_bytes: usize) -> Self {
        HttpServer {
            session: HttpSession::new(session),
            framer: FrameParser::new(max_message_bytes),
        }
    }

    /// Receive an HTTP request
    pub fn receive_request(&mut self) -> Result<HttpRequest> {
        self.framer.reset();
        let frame = self.session.read_frame(&mut self.framer)?;
        Ok(decode_request(&frame))
    }

    /// Send an HTTP response
    pub fn send_response(&mut self, response: &HttpResponse) -> Result<()> {
        self.session.write_all(&response.to_wire())
    }

    /// Receive one request, route it and send the response back
    pub fn respond(&mut self, router: &Router) -> Result<HttpResponse> {
        let request = self.receive_request()?;
        let response = router.handle(&request)?;
        tracing::info!(
            %request,
            accept = request.accept(),
            accept_encoding = request.accept_encoding(),
            status = response.status(),
            content_length = response.content_length(),
            "request handled"
        );
        self.send_response(&response)?;
        Ok(response)
    }

    /// Close the connection
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }
}

/// Serve exactly one exchange on `stream`, then close it
pub fn serve_connection(stream: TcpStream, router: &Router, max_message_bytes: usize) -> Result<()> {
    let mut server = HttpServer::with_max_message_bytes(FdSessionOps::new(stream), max_message_bytes);
    server.respond(router)?;
    server.close()
}

/// Decrements the in-flight counter when a connection thread ends
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Accepting side of the server
///
/// Every accepted connection is served on its own thread. With
/// `max_connections` set, connections beyond the limit are closed right
/// away; without it there is no limit.
pub struct Listener {
    listener: TcpListener,
    max_connections: Option<usize>,
    max_message_bytes: usize,
    active: Arc<AtomicUsize>,
}

impl Listener {
    /// Bind to `host:port`
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Resolve(format!("{}:{}", host, port)))?;
        Listener::bind_addr(addr)
    }

    /// Bind to a resolved socket address
    pub fn bind_addr(addr: SocketAddr) -> Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(LISTEN_BACKLOG)?;

        let listener: TcpListener = socket.into();
        tracing::info!(addr = %listener.local_addr()?, "listening");

        Ok(Listener {
            listener,
            max_connections: None,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Limit the number of connections served at once
    pub fn max_connections(mut self, limit: Option<usize>) -> Self {
        self.max_connections = limit;
        self
    }

    /// Limit the size of a single request
    pub fn max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Accept connections forever
    ///
    /// Accept failures are logged and the loop carries on.
    pub fn run(&self, router: Arc<Router>) -> Result<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer, &router),
                Err(e) => tracing::error!(error = %e, "failed to accept connection"),
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr, router: &Arc<Router>) {
        let active = self.active.fetch_add(1, Ordering::AcqRel);
        let guard = ConnectionGuard(Arc::clone(&self.active));

        if let Some(limit) = self.max_connections {
            if active >= limit {
                tracing::warn!(%peer, limit, "connection limit reached, closing");
                return;
            }
        }

        let router = Arc::clone(router);
        let max_message_bytes = self.max_message_bytes;
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                let span = tracing::info_span!("connection", %peer);
                let _enter = span.enter();

                if let Err(e) = serve_connection(stream, &router, max_message_bytes) {
                    tracing::error!(error = %e, "exchange failed");
                }
            });

        if let Err(e) = spawned {
            tracing::error!(%peer, error = %e, "failed to spawn connection thread");
        }
    }
}
