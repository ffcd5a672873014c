//! HTTP message parsing
//!
//! This module decodes wire bytes into requests and responses, and frames
//! incoming reads so a message split across several reads is reassembled
//! before decoding.
//!
//! Decoding is lenient: malformed or missing fields keep their zero value and
//! never abort the decode.

use super::encoding;
use super::{Error, HttpRequest, HttpResponse, Result, CRLF, NO_ENCODING};
use bytes::{Bytes, BytesMut};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Find the end of the message head (the blank line)
fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

/// Value of a header line if it starts with `prefix` (case-sensitive)
fn header_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(str::trim)
}

/// Content-Length announced in a message head, 0 when absent or malformed
fn head_content_length(head: &str) -> usize {
    head.split(CRLF)
        .skip(1)
        .find_map(|line| header_value(line, "Content-Length:"))
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Decode a request head
///
/// The request line must split on single spaces into exactly three tokens,
/// otherwise method, URI and version all stay empty. Only `Host:`, `Accept:`
/// and `Accept-Encoding:` are recognised; header parsing stops at the first
/// empty line.
pub fn decode_request(bytes: &[u8]) -> HttpRequest {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.split(CRLF);

    let mut req = HttpRequest {
        accept_encoding: NO_ENCODING.to_string(),
        ..Default::default()
    };

    if let Some(request_line) = lines.next() {
        let parts: Vec<&str> = request_line.split(' ').collect();
        if let [method, uri, version] = parts[..] {
            req.method = method.to_string();
            req.uri = uri.to_string();
            req.version = version.to_string();
        }
    }

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(value) = header_value(line, "Host:") {
            req.host = value.to_string();
        } else if let Some(value) = header_value(line, "Accept:") {
            req.accept = value.to_string();
        } else if let Some(value) = header_value(line, "Accept-Encoding:") {
            req.accept_encoding = value.to_string();
        }
    }

    req
}

/// Parse a response without touching its body encoding
///
/// The status line splits into at most three tokens; a reason phrase is kept
/// on the status (`"200 OK"`). Everything after the first blank line is the
/// body, byte for byte, so compressed data containing CRLF survives intact.
/// Without a blank line there is no body.
pub fn parse_response(bytes: &[u8]) -> HttpResponse {
    let (head, body) = match find_head_end(bytes) {
        Some(pos) => (&bytes[..pos], &bytes[pos + HEAD_TERMINATOR.len()..]),
        None => (bytes, &[][..]),
    };

    let text = String::from_utf8_lossy(head);
    let mut lines = text.split(CRLF);

    let mut res = HttpResponse {
        content_encoding: NO_ENCODING.to_string(),
        ..Default::default()
    };

    if let Some(status_line) = lines.next() {
        let parts: Vec<&str> = status_line.splitn(3, ' ').collect();
        if parts.len() >= 2 {
            res.version = parts[0].to_string();
            res.status = parts[1..].join(" ");
        }
    }

    for line in lines {
        if let Some(value) = header_value(line, "Content-Type:") {
            res.content_type = value.to_string();
        } else if let Some(value) = header_value(line, "Content-Encoding:") {
            res.content_encoding = value.to_string();
        } else if let Some(value) = header_value(line, "Content-Length:") {
            if let Ok(length) = value.parse() {
                res.content_length = length;
            }
        }
    }

    res.data = body.to_vec();
    res
}

/// Parse a response and reverse its Content-Encoding
///
/// Content-Length keeps the on-wire size; only the body is decompressed.
pub fn decode_response(bytes: &[u8]) -> HttpResponse {
    let mut res = parse_response(bytes);
    if !res.data.is_empty() {
        res.data = encoding::resolve(&res.content_encoding, res.data);
    }
    res
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameState {
    Head,
    Body { frame_len: usize },
    Complete,
}

/// Incremental message framer
///
/// Buffers reads until the head terminator is seen, then until the number of
/// body bytes announced by `Content-Length` has arrived. Works for both
/// requests and responses since only the framing headers are inspected.
#[derive(Debug)]
pub struct FrameParser {
    state: FrameState,
    buffer: BytesMut,
    max_len: usize,
}

impl FrameParser {
    /// Create a framer that rejects messages larger than `max_len`
    pub fn new(max_len: usize) -> Self {
        FrameParser {
            state: FrameState::Head,
            buffer: BytesMut::with_capacity(4096),
            max_len,
        }
    }

    /// Feed data to the framer
    ///
    /// Returns Ok(Some(frame)) once a complete message is buffered,
    /// Ok(None) if more data is needed, or Err if the message is too large.
    pub fn push(&mut self, data: &[u8]) -> Result<Option<Bytes>> {
        if self.state == FrameState::Complete {
            return Ok(None);
        }
        self.buffer.extend_from_slice(data);

        if self.state == FrameState::Head {
            match find_head_end(&self.buffer) {
                Some(pos) => {
                    let head = String::from_utf8_lossy(&self.buffer[..pos]);
                    let frame_len = (pos + HEAD_TERMINATOR.len())
                        .checked_add(head_content_length(&head))
                        .filter(|&len| len <= self.max_len)
                        .ok_or(Error::MessageTooLarge(self.max_len))?;
                    tracing::debug!(head_len = pos, frame_len, "message head complete");
                    self.state = FrameState::Body { frame_len };
                }
                None if self.buffer.len() > self.max_len => {
                    return Err(Error::MessageTooLarge(self.max_len));
                }
                None => return Ok(None),
            }
        }

        let state = self.state;
        match state {
            FrameState::Body { frame_len } if self.buffer.len() >= frame_len => {
                self.state = FrameState::Complete;
                Ok(Some(self.buffer.split_to(frame_len).freeze()))
            }
            _ => Ok(None),
        }
    }

    /// Hand out whatever is buffered after the peer closed the connection
    ///
    /// Returns None if nothing was received or the frame was already taken.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.state == FrameState::Complete || self.buffer.is_empty() {
            return None;
        }
        self.state = FrameState::Complete;
        Some(self.buffer.split().freeze())
    }

    /// Reset the framer for reuse
    pub fn reset(&mut self) {
        self.state = FrameState::Head;
        self.buffer.clear();
    }
}
