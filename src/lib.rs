//! greet-http - minimal HTTP/1.1 greeting client and server
//!
//! This crate provides hand-rolled HTTP/1.1 message framing over plain TCP,
//! gzip/deflate content-encoding negotiation, and a two-route greeting
//! server with its matching client.

pub mod config;
pub mod http;
pub mod logging;
