//! HTTP message types
//!
//! This module defines the request and response records shared by the client
//! and the server, together with their wire encoders.

use super::{CRLF, HTTP_VERSION, NO_ENCODING};
use std::fmt;

/// HTTP request
///
/// Only the fields the exchange actually uses are modelled. A field that was
/// missing on the wire is an empty string, except `accept_encoding`, which
/// falls back to [`NO_ENCODING`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpRequest {
    pub(crate) method: String,
    pub(crate) uri: String,
    pub(crate) version: String,
    pub(crate) host: String,
    pub(crate) accept: String,
    pub(crate) accept_encoding: String,
}

impl HttpRequest {
    /// Create a builder for constructing requests
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Get the request method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request URI (path plus optional query)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the HTTP version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the Host header value
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the Accept header value
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// Get the Accept-Encoding value, `"none"` when not requested
    pub fn accept_encoding(&self) -> &str {
        &self.accept_encoding
    }

    /// Convert the request to wire format
    ///
    /// No field is validated. The Accept-Encoding line is written unless the
    /// value is exactly `"none"`.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        // Request line
        buf.extend_from_slice(self.method.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.uri.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.version.as_bytes());
        buf.extend_from_slice(CRLF.as_bytes());

        push_header(&mut buf, "Host", &self.host);
        push_header(&mut buf, "Accept", &self.accept);
        if self.accept_encoding != NO_ENCODING {
            push_header(&mut buf, "Accept-Encoding", &self.accept_encoding);
        }

        // Empty line, GET carries no body
        buf.extend_from_slice(CRLF.as_bytes());

        buf
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.uri, self.version)
    }
}

/// Builder for HTTP requests
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: String,
    uri: String,
    version: String,
    host: String,
    accept: String,
    accept_encoding: String,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        HttpRequestBuilder {
            method: "GET".to_string(),
            uri: "/".to_string(),
            version: HTTP_VERSION.to_string(),
            host: String::new(),
            accept: String::new(),
            accept_encoding: NO_ENCODING.to_string(),
        }
    }
}

impl HttpRequestBuilder {
    /// Set the HTTP method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the URI
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Set the HTTP version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the Host header
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the Accept header
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    /// Set the Accept-Encoding header
    ///
    /// An empty value is normalized to `"none"`.
    pub fn accept_encoding(mut self, accept_encoding: impl Into<String>) -> Self {
        let value = accept_encoding.into();
        self.accept_encoding = if value.is_empty() {
            NO_ENCODING.to_string()
        } else {
            value
        };
        self
    }

    /// Build the request
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            uri: self.uri,
            version: self.version,
            host: self.host,
            accept: self.accept,
            accept_encoding: self.accept_encoding,
        }
    }
}

/// HTTP response
///
/// `status` is kept as text: a decoded response carries the reason phrase
/// too (`"200 OK"`), a server-built one only the code (`"200"`).
///
/// `content_encoding` has two distinct "nothing" values. `"none"` is what the
/// decoder reports when the header was absent; `""` is what negotiation sets
/// when the client asked for no encoding. Neither is written to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub(crate) version: String,
    pub(crate) status: String,
    pub(crate) content_type: String,
    pub(crate) content_encoding: String,
    pub(crate) content_length: usize,
    pub(crate) data: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with only a status line
    pub fn new(status: impl Into<String>) -> Self {
        HttpResponse {
            version: HTTP_VERSION.to_string(),
            status: status.into(),
            ..Default::default()
        }
    }

    /// `404` with no headers and no body
    pub fn not_found() -> Self {
        HttpResponse::new("404")
    }

    /// Create a builder for constructing responses
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }

    /// Get the HTTP version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the status text, possibly including the reason phrase
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Numeric status code, if the status text starts with one
    pub fn status_code(&self) -> Option<u16> {
        self.status.split(' ').next()?.parse().ok()
    }

    /// Get the Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Get the Content-Encoding
    pub fn content_encoding(&self) -> &str {
        &self.content_encoding
    }

    /// Get the Content-Length, the size of the body as sent on the wire
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Get the body
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the body
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Replace the body and its encoding tag, recomputing Content-Length
    pub fn set_encoded_body(&mut self, data: Vec<u8>, content_encoding: impl Into<String>) {
        self.content_length = data.len();
        self.content_encoding = content_encoding.into();
        self.data = data;
    }

    /// Convert the response to wire format
    ///
    /// Content-Type is written when non-empty, Content-Encoding when neither
    /// empty nor `"none"`, Content-Length when greater than zero.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + self.data.len());

        // Status line
        buf.extend_from_slice(self.version.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.status.as_bytes());
        buf.extend_from_slice(CRLF.as_bytes());

        if !self.content_type.is_empty() {
            push_header(&mut buf, "Content-Type", &self.content_type);
        }
        if !self.content_encoding.is_empty() && self.content_encoding != NO_ENCODING {
            push_header(&mut buf, "Content-Encoding", &self.content_encoding);
        }
        if self.content_length > 0 {
            push_header(&mut buf, "Content-Length", &self.content_length.to_string());
        }

        buf.extend_from_slice(CRLF.as_bytes());
        buf.extend_from_slice(&self.data);

        buf
    }
}

/// Builder for HTTP responses
#[derive(Debug, Default)]
pub struct HttpResponseBuilder {
    version: Option<String>,
    status: Option<String>,
    content_type: String,
    content_encoding: String,
    data: Vec<u8>,
}

impl HttpResponseBuilder {
    /// Set the HTTP version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the status text
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the Content-Type
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the Content-Encoding of an already encoded body
    pub fn content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.content_encoding = content_encoding.into();
        self
    }

    /// Set the body
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Build the response, Content-Length follows the body
    pub fn build(self) -> HttpResponse {
        HttpResponse {
            version: self.version.unwrap_or_else(|| HTTP_VERSION.to_string()),
            status: self.status.unwrap_or_else(|| "200".to_string()),
            content_type: self.content_type,
            content_encoding: self.content_encoding,
            content_length: self.data.len(),
            data: self.data,
        }
    }
}

fn push_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(CRLF.as_bytes());
}
