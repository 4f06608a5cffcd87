//! Response value type and its builder.
//!
//! A [`Response`] composes the [`Message`] core with a status code and a
//! reason phrase. The status code is range-checked once, at construction;
//! [`Response::with_status`] afterwards stores whatever it is given, and
//! [`Response::reason_phrase`] falls back to the canonical phrase for the
//! code when no explicit phrase is stored.

use http::StatusCode;

use crate::ensure;
use crate::error::InvalidArgumentError;
use crate::message::{HeaderValues, Headers, Message, ProtocolVersion};
use crate::stream::{SharedStream, Stream};

/// An immutable HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status_code: u16,
    reason_phrase: String,
}

impl Response {
    /// Status code a built response carries when none is given.
    pub const DEFAULT_STATUS_CODE: u16 = 200;

    /// Creates a response with the given status code, protocol version
    /// 1.1, no headers and an empty in-memory body.
    pub fn new(status_code: u16) -> Result<Self, InvalidArgumentError> {
        Self::builder().status(status_code).build()
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
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

    // response specifics

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns a new response with status code and reason phrase replaced.
    ///
    /// No range check here; validation happens at construction only.
    pub fn with_status(&self, code: u16, reason_phrase: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.status_code = code;
        new.reason_phrase = reason_phrase.into();

        new
    }

    /// The stored reason phrase if non-empty, else the canonical phrase
    /// for the status code, else `""`.
    pub fn reason_phrase(&self) -> &str {
        if !self.reason_phrase.is_empty() {
            return &self.reason_phrase;
        }

        StatusCode::from_u16(self.status_code).ok().and_then(|status| status.canonical_reason()).unwrap_or("")
    }
}

/// Builder assembling a [`Response`] from explicit parts and defaults.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    protocol_version: Option<String>,
    headers: Headers,
    body: Option<SharedStream>,
    status_code: Option<u16>,
    reason_phrase: Option<String>,
}

impl ResponseBuilder {
    /// Protocol version in string form; 1.1 when not set.
    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    /// Appends one header entry, keeping earlier values for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the whole header listing.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Body stream; an empty in-memory stream when not set.
    pub fn body(mut self, body: impl Into<SharedStream>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Status code; [`Response::DEFAULT_STATUS_CODE`] when not set.
    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn reason_phrase(mut self, reason_phrase: impl Into<String>) -> Self {
        self.reason_phrase = Some(reason_phrase.into());
        self
    }

    /// Validates and assembles the response.
    pub fn build(self) -> Result<Response, InvalidArgumentError> {
        let protocol_version = match self.protocol_version.as_deref() {
            Some(version) => ProtocolVersion::try_from(version)?,
            None => ProtocolVersion::Http11,
        };

        let status_code = self.status_code.unwrap_or(Response::DEFAULT_STATUS_CODE);
        ensure!(
            (100..=599).contains(&status_code),
            InvalidArgumentError::status_code_out_of_range(status_code)
        );

        let body = self.body.unwrap_or_else(|| Stream::temp().into());

        Ok(Response {
            message: Message::new(protocol_version, self.headers, body),
            status_code,
            reason_phrase: self.reason_phrase.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_200_ok_on_protocol_1_1() {
        let response = Response::builder().build().unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert_eq!(response.protocol_version(), "1.1");
        assert!(response.headers().is_empty());
    }

    #[test]
    fn construction_validates_the_status_range() {
        assert!(Response::new(99).is_err());
        assert!(Response::new(600).is_err());
        assert!(matches!(
            Response::new(600).unwrap_err(),
            InvalidArgumentError::StatusCodeOutOfRange { code: 600 }
        ));

        assert!(Response::new(100).is_ok());
        assert!(Response::new(599).is_ok());
    }

    #[test]
    fn reason_phrase_falls_back_to_the_canonical_table() {
        let response = Response::new(404).unwrap();
        assert_eq!(response.reason_phrase(), "Not Found");

        let custom = response.with_status(404, "Custom");
        assert_eq!(custom.reason_phrase(), "Custom");
        // the receiver keeps the canonical phrase
        assert_eq!(response.reason_phrase(), "Not Found");
    }

    #[test]
    fn unmapped_code_without_a_phrase_yields_the_empty_string() {
        let response = Response::new(200).unwrap().with_status(599, "");

        assert_eq!(response.status_code(), 599);
        assert_eq!(response.reason_phrase(), "");
    }

    #[test]
    fn with_status_skips_range_validation() {
        let response = Response::new(200).unwrap().with_status(999, "");

        assert_eq!(response.status_code(), 999);
        assert_eq!(response.reason_phrase(), "");
    }

    #[test]
    fn builder_collects_headers_in_order() {
        let response = Response::builder()
            .status(201)
            .header("Location", "/items/7")
            .header("X-Tag", "a")
            .header("X-Tag", "b")
            .build()
            .unwrap();

        assert_eq!(response.header("Location"), ["/items/7"]);
        assert_eq!(response.header("X-Tag"), ["a", "b"]);
    }

    #[test]
    fn builder_rejects_a_bad_protocol_version() {
        let result = Response::builder().protocol_version("0.9").build();

        assert!(matches!(result.unwrap_err(), InvalidArgumentError::UnsupportedProtocolVersion { .. }));
    }

    #[test]
    fn derivations_leave_the_receiver_unchanged() {
        let response = Response::new(200).unwrap();
        let derived = response.with_status(503, "Down").with_header("Retry-After", "30");

        assert_eq!(response.status_code(), 200);
        assert!(!response.has_header("Retry-After"));
        assert_eq!(derived.status_code(), 503);
    }
}
