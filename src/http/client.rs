//! HTTP client implementation
//!
//! One request, one response, then the connection is done.

use super::{
    decode_response, Error, FrameParser, HttpRequest, HttpResponse, HttpSession, Result,
    SessionOps, DEFAULT_MAX_MESSAGE_BYTES,
};
use url::Url;

/// Build a GET request for `url`
///
/// The URI is the path plus query, the Host header is `host[:port]` exactly
/// as written in the URL.
pub fn request_for_url(url: &str, accept: &str, accept_encoding: &str) -> Result<HttpRequest> {
    let raw = url;
    let url = Url::parse(raw)?;
    if url.host_str().is_none() {
        return Err(Error::MissingHost(url.to_string()));
    }

    // Url drops a port equal to the scheme default, the raw authority keeps it
    let host = authority(raw.trim());
    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    Ok(HttpRequest::builder()
        .uri(uri)
        .host(host)
        .accept(accept)
        .accept_encoding(accept_encoding)
        .build())
}

/// `host[:port]` of an absolute URL, without userinfo
fn authority(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    authority.rsplit_once('@').map_or(authority, |(_, host)| host)
}

/// Socket address to dial for `url`, defaulting the port from its scheme
pub fn connect_addr(url: &str) -> Result<String> {
    let url = Url::parse(url)?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::MissingHost(url.to_string()))?;
    let port = url.port_or_known_default().unwrap_or(80);
    Ok(format!("{}:{}", host, port))
}

/// HTTP client
///
/// Provides methods for sending a request and receiving the response.
pub struct HttpClient<S: SessionOps> {
    session: HttpSession<S>,
    framer: FrameParser,
}

impl<S: SessionOps> HttpClient<S> {
    /// Create a new HTTP client with a session
    pub fn new(session: S) -> Self {
        HttpClient::with_max_message_bytes(session, DEFAULT_MAX_MESSAGE_BYTES)
    }

    /// Create a client that rejects responses larger than `max_message_bytes`
    pub fn with_max_message_bytes(session: S, max_message_bytes: usize) -> Self {
        HttpClient {
            session: HttpSession::new(session),
            framer: FrameParser::new(max_message_bytes),
        }
    }

    /// Send an HTTP request
    pub fn send_request(&mut self, request: &HttpRequest) -> Result<()> {
        tracing::debug!(%request, "sending request");
        self.session.write_all(&request.to_wire())
    }

    /// Receive an HTTP response, body already decompressed
    pub fn receive_response(&mut self) -> Result<HttpResponse> {
        self.framer.reset();
        let frame = self.session.read_frame(&mut self.framer)?;
        Ok(decode_response(&frame))
    }

    /// Send `request` and wait for its response
    pub fn fetch(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        self.send_request(request)?;
        self.receive_response()
    }

    /// Close the connection
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }
}
