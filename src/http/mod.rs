//! HTTP/1.1 message exchange over plain TCP
//!
//! This module provides the request/response model, the wire framing in both
//! directions, content-encoding negotiation and the two-route greeting server.
//!
//! # Architecture
//!
//! - `message` holds the request/response records and their wire encoders
//! - `parser` decodes wire bytes back into records and frames incoming reads
//! - `encoding` compresses response bodies (server) and reverses it (client)
//! - `routes` maps a decoded request to a response
//! - `session` abstracts the transport so client and server code never touch
//!   the socket directly
//!
//! # Examples
//!
//! ```no_run
//! use greet_http::http::{HttpClient, HttpRequest};
//! use greet_http::http::session::FdSessionOps;
//! use std::net::TcpStream;
//!
//! let stream = TcpStream::connect("127.0.0.1:7481").unwrap();
//! let mut client = HttpClient::new(FdSessionOps::new(stream));
//!
//! let request = HttpRequest::builder()
//!     .uri("/greet/2306217481?name=Budi")
//!     .host("127.0.0.1:7481")
//!     .accept("application/json")
//!     .accept_encoding("gzip")
//!     .build();
//!
//! let response = client.fetch(&request).unwrap();
//! assert_eq!(response.status_code(), Some(200));
//! ```

pub mod client;
pub mod encoding;
pub mod message;
pub mod parser;
pub mod routes;
pub mod server;
pub mod session;

pub use client::HttpClient;
pub use encoding::{ContentCoding, Negotiator};
pub use message::{HttpRequest, HttpResponse};
pub use parser::{decode_request, decode_response, parse_response, FrameParser};
pub use routes::{GreetConfig, GreetResponse, Router, Student};
pub use server::{HttpServer, Listener};
pub use session::{HttpSession, SessionOps};

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Cannot resolve address: {0}")]
    Resolve(String),

    #[error("Message exceeds {0} bytes")]
    MessageTooLarge(usize),

    #[error("Timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,
}

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Sentinel for "no content-encoding requested or applied"
pub const NO_ENCODING: &str = "none";

/// The only protocol version this crate speaks
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Default upper bound for a single framed message
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;
