//! Immutable value objects for HTTP message interchange.
//!
//! This crate models HTTP requests, responses and server-originated
//! requests as immutable values, matching the widely adopted interface
//! model for HTTP message interchange: every mutation is a `with_*`
//! derivation that returns a new instance and leaves the receiver
//! observably unchanged. It is meant for code that builds, inspects and
//! forwards messages without binding to any particular transport.
//!
//! # Features
//!
//! - Copy-on-derive message values (protocol version, headers, body)
//! - Exact-match, insertion-ordered header multimap
//! - URI component model with scheme/port normalization (http/https)
//! - Byte stream abstraction with mode-based capability gating
//! - Server requests built from an explicit environment snapshot
//! - Clean error handling split into invalid-argument and runtime failures
//!
//! # Example
//!
//! ```
//! use http_message::error::Error;
//! use http_message::request::Request;
//! use http_message::response::Response;
//! use http_message::stream::Stream;
//! use http_message::uri::Uri;
//!
//! fn main() -> Result<(), Error> {
//!     let uri = Uri::parse("http://example.com:80/items")?;
//!     // 80 is the http default, so it is suppressed
//!     assert_eq!(uri.port(), None);
//!
//!     let request = Request::new("GET", uri).with_header("Accept", "application/json");
//!
//!     // the derivation leaves `request` untouched
//!     let posted = request.with_method("POST");
//!     assert_eq!(request.method(), "GET");
//!     assert_eq!(posted.method(), "POST");
//!
//!     let response = Response::builder()
//!         .status(404)
//!         .header("Content-Type", "text/plain")
//!         .body(Stream::from_bytes(&b"not found"[..]))
//!         .build()?;
//!     assert_eq!(response.reason_phrase(), "Not Found");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized leaf-first:
//!
//! - [`stream`]: the byte stream over an owned I/O handle, and the shared
//!   handle form messages carry as their body
//! - [`uri`]: the URI component model and its normalization rules
//! - [`message`]: the message core (version, headers, body) embedded by
//!   every concrete message type
//! - [`request`], [`response`], [`server`]: the concrete message types
//! - [`error`]: the two-family error taxonomy
//!
//! # Scope
//!
//! Wire parsing and serialization, connection handling, TLS, content
//! negotiation and multipart decoding are deliberately out of scope;
//! surrounding code supplies an environment snapshot
//! ([`server::ServerEnv`]) and byte handles, and this crate supplies the
//! value model.

pub mod error;
pub mod message;
pub mod request;
pub mod response;
pub mod server;
pub mod stream;
pub mod uri;

mod utils;
pub(crate) use utils::ensure;
