//! Core message value type and its building blocks.
//!
//! [`Message`] is the common capability core of every HTTP message:
//! protocol version, ordered header multimap and a body stream. It is
//! never used on its own — [`Request`](crate::request::Request),
//! [`Response`](crate::response::Response) and
//! [`ServerRequest`](crate::server::ServerRequest) embed it and re-expose
//! its contract next to their own.
//!
//! Every `with_*` derivation builds a new value from the receiver's fields
//! plus the overridden one; the receiver is observably unchanged
//! afterwards. The body is the only inner object that stays structurally
//! shared across derivations (see [`SharedStream`]).

mod headers;
pub use headers::HeaderValues;
pub use headers::Headers;

mod version;
pub use version::ProtocolVersion;

use crate::error::InvalidArgumentError;
use crate::stream::SharedStream;

/// Protocol version, headers and body — the value core shared by all
/// message types.
#[derive(Debug, Clone)]
pub struct Message {
    protocol_version: ProtocolVersion,
    headers: Headers,
    body: SharedStream,
}

impl Message {
    pub(crate) fn new(protocol_version: ProtocolVersion, headers: Headers, body: SharedStream) -> Self {
        Self { protocol_version, headers, body }
    }

    /// The protocol version in its string form (`"1.0"`, `"1.1"`, `"2"`).
    pub fn protocol_version(&self) -> &str {
        self.protocol_version.as_str()
    }

    /// Returns a new message with only the protocol version changed.
    pub fn with_protocol_version(&self, version: &str) -> Result<Self, InvalidArgumentError> {
        let protocol_version = ProtocolVersion::try_from(version)?;

        let mut new = self.clone();
        new.protocol_version = protocol_version;

        Ok(new)
    }

    /// Read-only view of the full header listing.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Exact-match presence check on the header name.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// The value sequence for `name`, empty when absent.
    pub fn header(&self, name: &str) -> &[String] {
        self.headers.get(name)
    }

    /// The values for `name` joined with `,`.
    pub fn header_line(&self, name: &str) -> String {
        self.headers.line(name)
    }

    /// Returns a new message in which the whole value sequence for `name`
    /// is replaced.
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        let mut new = self.clone();
        new.headers.set(name, value);

        new
    }

    /// Returns a new message in which the values are appended to any
    /// existing sequence for `name`.
    pub fn with_added_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        let mut new = self.clone();
        new.headers.append(name, value);

        new
    }

    /// Returns a new message without any entry for `name`.
    pub fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.headers.remove(name);

        new
    }

    /// The body stream handle.
    pub fn body(&self) -> &SharedStream {
        &self.body
    }

    /// Returns a new message with the body replaced wholesale.
    pub fn with_body(&self, body: impl Into<SharedStream>) -> Self {
        let mut new = self.clone();
        new.body = body.into();

        new
    }
}
