//! Client-side request value type.
//!
//! A [`Request`] composes the [`Message`] core with a request target, a
//! method and a [`Uri`]. The base request stores the method verbatim and
//! applies no validation to it — method allow-listing belongs to concrete
//! message types that need it, such as
//! [`ServerRequest`](crate::server::ServerRequest).

use crate::error::InvalidArgumentError;
use crate::message::{HeaderValues, Headers, Message, ProtocolVersion};
use crate::stream::{SharedStream, Stream};
use crate::uri::Uri;

/// An immutable HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    request_target: String,
    method: String,
    uri: Uri,
}

impl Request {
    /// Creates a request with protocol version 1.1, no headers and an
    /// empty in-memory body.
    pub fn new(method: impl Into<String>, uri: Uri) -> Self {
        Self {
            message: Message::new(ProtocolVersion::Http11, Headers::new(), Stream::temp().into()),
            request_target: String::new(),
            method: method.into(),
            uri,
        }
    }

    pub(crate) fn from_parts(message: Message, request_target: String, method: String, uri: Uri) -> Self {
        Self { message, request_target, method, uri }
    }

    fn map_message(&self, f: impl FnOnce(&Message) -> Message) -> Self {
        let mut new = self.clone();
        new.message = f(&self.message);

        new
    }

    // message contract

    pub fn protocol_version(&self) -> &str {
        self.message.protocol_version()
    }

    pub fn with_protocol_version(&self, version: &str) -> Result<Self, InvalidArgumentError> {
        let mut new = self.clone();
        new.message = self.message.with_protocol_version(version)?;

        Ok(new)
    }

    pub fn headers(&self) -> &Headers {
        self.message.headers()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.message.has_header(name)
    }

    pub fn header(&self, name: &str) -> &[String] {
        self.message.header(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.message.header_line(name)
    }

    pub fn with_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.map_message(|message| message.with_header(name, value))
    }

    pub fn with_added_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.map_message(|message| message.with_added_header(name, value))
    }

    pub fn without_header(&self, name: &str) -> Self {
        self.map_message(|message| message.without_header(name))
    }

    pub fn body(&self) -> &SharedStream {
        self.message.body()
    }

    pub fn with_body(&self, body: impl Into<SharedStream>) -> Self {
        self.map_message(|message| message.with_body(body))
    }

    // request specifics

    /// The request target, `/` when none has been set.
    pub fn request_target(&self) -> &str {
        if self.request_target.is_empty() { "/" } else { &self.request_target }
    }

    /// Stores the target verbatim, no validation.
    pub fn with_request_target(&self, request_target: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.request_target = request_target.into();

        new
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Stores the method verbatim, no validation.
    pub fn with_method(&self, method: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.method = method.into();

        new
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns a new request with the URI replaced.
    ///
    /// Unless `preserve_host` is set and a non-empty `Host` header already
    /// exists, the `Host` header is rewritten from the new URI's host,
    /// with `:port` appended when the URI carries an explicit port. A URI
    /// without a host leaves the headers untouched.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut new = self.clone();
        new.uri = uri;

        if preserve_host && new.has_header("Host") && !new.header_line("Host").is_empty() {
            return new;
        }

        let host = new.uri.host().to_string();
        if host.is_empty() {
            return new;
        }

        let header_host = match new.uri.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        new.with_header("Host", vec![header_host])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new("GET", Uri::parse("http://example.com/items").unwrap())
    }

    #[test]
    fn request_target_defaults_to_the_root_form() {
        let request = request();

        assert_eq!(request.request_target(), "/");
        assert_eq!(request.with_request_target("/items?page=2").request_target(), "/items?page=2");
        // stored verbatim, odd forms included
        assert_eq!(request.with_request_target("*").request_target(), "*");
    }

    #[test]
    fn method_is_stored_verbatim() {
        let request = request().with_method("brew");

        assert_eq!(request.method(), "brew");
    }

    #[test]
    fn with_uri_sets_the_host_header() {
        let request = request();

        let derived = request.with_uri(Uri::parse("http://other.test/x").unwrap(), false);
        assert_eq!(derived.header("Host"), ["other.test"]);

        let derived = request.with_uri(Uri::parse("http://other.test:8080/x").unwrap(), false);
        assert_eq!(derived.header("Host"), ["other.test:8080"]);
    }

    #[test]
    fn with_uri_overwrites_an_existing_host_by_default() {
        let request = request().with_header("Host", "stale.test");

        let derived = request.with_uri(Uri::parse("http://fresh.test/").unwrap(), false);
        assert_eq!(derived.header("Host"), ["fresh.test"]);
    }

    #[test]
    fn preserve_host_keeps_a_non_empty_host_header() {
        let request = request().with_header("Host", "pinned.test");

        let derived = request.with_uri(Uri::parse("http://fresh.test/").unwrap(), true);
        assert_eq!(derived.header("Host"), ["pinned.test"]);
    }

    #[test]
    fn preserve_host_still_fills_a_missing_host_header() {
        let request = request().without_header("Host");

        let derived = request.with_uri(Uri::parse("http://fresh.test/").unwrap(), true);
        assert_eq!(derived.header("Host"), ["fresh.test"]);
    }

    #[test]
    fn a_uri_without_host_leaves_headers_alone() {
        let request = request().with_header("Host", "kept.test");

        let derived = request.with_uri(Uri::default(), false);
        assert_eq!(derived.header("Host"), ["kept.test"]);
    }

    #[test]
    fn derivations_leave_the_receiver_unchanged() {
        let request = request();
        let derived = request
            .with_method("POST")
            .with_header("Accept", "text/html")
            .with_uri(Uri::parse("https://other.test/").unwrap(), false);

        assert_eq!(request.method(), "GET");
        assert!(!request.has_header("Accept"));
        assert_eq!(request.uri().host(), "example.com");
        assert_eq!(derived.method(), "POST");
        assert_eq!(derived.uri().scheme(), "https");
    }

    #[test]
    fn message_contract_is_exposed() {
        let request = request().with_header("Accept", vec!["a/b", "c/d"]);

        assert_eq!(request.protocol_version(), "1.1");
        assert_eq!(request.header_line("Accept"), "a/b,c/d");
        assert!(request.with_protocol_version("9").is_err());
        assert_eq!(request.with_protocol_version("1.0").unwrap().protocol_version(), "1.0");
    }
}
