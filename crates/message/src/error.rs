//! Error taxonomy for the message value objects.
//!
//! Two failure families exist: [`InvalidArgumentError`] for caller-supplied
//! values that violate a domain constraint, and [`RuntimeError`] for
//! environment or resource failures that are not attributable to the shape
//! of the caller's input. Both are detected synchronously and surface to the
//! immediate caller; nothing is retried or suppressed.

use std::io;
use thiserror::Error;

/// Top-level error type covering both failure families.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {source}")]
    InvalidArgument {
        #[from]
        source: InvalidArgumentError,
    },

    #[error("runtime error: {source}")]
    Runtime {
        #[from]
        source: RuntimeError,
    },
}

/// A caller-supplied value violates a domain constraint.
///
/// Callers should treat this as "fix your input": the same call with a
/// conforming value succeeds.
#[derive(Error, Debug)]
pub enum InvalidArgumentError {
    #[error("protocol version '{version}' not supported, must be one of '1.0', '1.1', '2'")]
    UnsupportedProtocolVersion { version: String },

    #[error("scheme '{scheme}' not supported, must be 'http' or 'https'")]
    UnsupportedScheme { scheme: String },

    #[error("port {port} not supported, must be in range [1..65535]")]
    PortOutOfRange { port: u32 },

    #[error("status code {code} not supported, must be in range [100..599]")]
    StatusCodeOutOfRange { code: u16 },

    #[error("parsed body must be absent, an array or an object, got {kind}")]
    InvalidParsedBody { kind: &'static str },
}

impl InvalidArgumentError {
    pub fn unsupported_protocol_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedProtocolVersion { version: version.to_string() }
    }

    pub fn unsupported_scheme<S: ToString>(scheme: S) -> Self {
        Self::UnsupportedScheme { scheme: scheme.to_string() }
    }

    pub fn port_out_of_range(port: u32) -> Self {
        Self::PortOutOfRange { port }
    }

    pub fn status_code_out_of_range(code: u16) -> Self {
        Self::StatusCodeOutOfRange { code }
    }

    pub fn invalid_parsed_body(kind: &'static str) -> Self {
        Self::InvalidParsedBody { kind }
    }
}

/// An environment or resource failure.
///
/// Covers missing ambient data during server-request construction, URI
/// parse failures and every stream I/O failure, including use of a
/// detached handle.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("parse uri '{uri}' error: {source}")]
    UriParse { uri: String, source: url::ParseError },

    #[error("server protocol not defined")]
    ServerProtocolNotDefined,

    #[error("server protocol version not defined")]
    ProtocolVersionNotDefined,

    #[error("request target not defined")]
    RequestTargetNotDefined,

    #[error("request method not defined")]
    RequestMethodNotDefined,

    #[error("method '{method}' not supported")]
    MethodNotSupported { method: String },

    #[error("stream detached")]
    Detached,

    #[error("stream '{target}' not seekable")]
    NotSeekable { target: String },

    #[error("stream '{target}' not readable")]
    NotReadable { target: String },

    #[error("stream '{target}' not writable")]
    NotWritable { target: String },

    #[error("stream mode '{mode}' not supported")]
    UnsupportedMode { mode: String },

    #[error("uploaded file has no spooled data")]
    UploadUnavailable,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RuntimeError {
    pub fn uri_parse<S: ToString>(uri: S, source: url::ParseError) -> Self {
        Self::UriParse { uri: uri.to_string(), source }
    }

    pub fn method_not_supported<S: ToString>(method: S) -> Self {
        Self::MethodNotSupported { method: method.to_string() }
    }

    pub fn not_seekable<S: ToString>(target: S) -> Self {
        Self::NotSeekable { target: target.to_string() }
    }

    pub fn not_readable<S: ToString>(target: S) -> Self {
        Self::NotReadable { target: target.to_string() }
    }

    pub fn not_writable<S: ToString>(target: S) -> Self {
        Self::NotWritable { target: target.to_string() }
    }

    pub fn unsupported_mode<S: ToString>(mode: S) -> Self {
        Self::UnsupportedMode { mode: mode.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
