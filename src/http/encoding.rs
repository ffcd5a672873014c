//! Content-Encoding negotiation and resolution
//!
//! The server picks a coding from the request's Accept-Encoding and
//! compresses the response body with it. The client reverses whatever coding
//! the response declares.

use super::{HttpResponse, Result, NO_ENCODING};
use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use std::fmt;
use std::io::{Read, Write};

/// Compression level used for deflate unless configured otherwise
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

/// Content codings the server can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
    Deflate,
    Identity,
}

impl ContentCoding {
    /// Select a coding from an Accept-Encoding value
    ///
    /// Only the exact tokens `gzip`, `deflate` and `none` are understood.
    /// Anything else, including an empty value, selects gzip.
    pub fn negotiate(accept_encoding: &str) -> Self {
        match accept_encoding {
            "gzip" => ContentCoding::Gzip,
            "deflate" => ContentCoding::Deflate,
            NO_ENCODING => ContentCoding::Identity,
            _ => ContentCoding::Gzip,
        }
    }

    /// Value for the Content-Encoding header
    ///
    /// Identity maps to the empty string so the header is left out.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Identity => "",
        }
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentCoding::Identity => write!(f, "identity"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Applies the negotiated coding to response bodies
#[derive(Debug, Clone, Copy)]
pub struct Negotiator {
    deflate_level: Compression,
}

impl Negotiator {
    /// Create a negotiator with the given deflate level (0-9)
    pub fn new(deflate_level: u32) -> Self {
        Negotiator {
            deflate_level: Compression::new(deflate_level.min(9)),
        }
    }

    /// Compress `response` according to `accept_encoding`
    ///
    /// The body is replaced with its encoded form, and Content-Encoding and
    /// Content-Length are updated to match.
    pub fn apply(&self, accept_encoding: &str, response: &mut HttpResponse) -> Result<ContentCoding> {
        let coding = ContentCoding::negotiate(accept_encoding);
        let body = std::mem::take(&mut response.data);
        let encoded = self.encode(coding, body)?;

        tracing::debug!(
            %coding,
            accept_encoding,
            encoded_len = encoded.len(),
            "applied content coding"
        );
        response.set_encoded_body(encoded, coding.as_str());

        Ok(coding)
    }

    /// Encode a body with `coding`
    pub fn encode(&self, coding: ContentCoding, body: Vec<u8>) -> Result<Vec<u8>> {
        let encoded = match coding {
            ContentCoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&body)?;
                encoder.finish()?
            }
            ContentCoding::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), self.deflate_level);
                encoder.write_all(&body)?;
                encoder.finish()?
            }
            ContentCoding::Identity => body,
        };
        Ok(encoded)
    }
}

impl Default for Negotiator {
    fn default() -> Self {
        Negotiator::new(DEFAULT_DEFLATE_LEVEL)
    }
}

/// Reverse a Content-Encoding
///
/// `gzip` and `deflate` are decompressed, anything else passes through.
/// A corrupt stream is not fatal: the diagnostic is logged and the bytes are
/// returned as received.
pub fn resolve(content_encoding: &str, data: Vec<u8>) -> Vec<u8> {
    let mut decoded = Vec::new();
    let result = match content_encoding {
        "gzip" => GzDecoder::new(&data[..]).read_to_end(&mut decoded),
        "deflate" => DeflateDecoder::new(&data[..]).read_to_end(&mut decoded),
        _ => return data,
    };

    match result {
        Ok(_) => decoded,
        Err(e) => {
            tracing::warn!(
                content_encoding,
                error = %e,
                "failed to decompress body, keeping encoded bytes"
            );
            data
        }
    }
}
