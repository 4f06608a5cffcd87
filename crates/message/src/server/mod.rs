//! Server-originated request value type.
//!
//! A [`ServerRequest`] is a [`Request`](crate::request::Request) enriched
//! with the data the serving environment contributes: server, cookie and
//! query parameter mappings, uploaded-file descriptors, an optional
//! pre-parsed body and a request-scoped attribute store.
//!
//! Construction goes through [`ServerRequest::builder`] over an explicit
//! [`ServerEnv`] snapshot: every part can be overridden, everything else
//! resolves from the snapshot, and required parts that resolve from
//! neither fail construction. Unlike the base request, the method is
//! checked against [`ServerRequest::SUPPORTED_METHODS`] here.

mod env;
pub use env::Params;
pub use env::ServerEnv;

mod upload;
pub use upload::UploadedFile;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::ensure;
use crate::error::{Error, InvalidArgumentError, RuntimeError};
use crate::message::{HeaderValues, Headers, Message, ProtocolVersion};
use crate::request::Request;
use crate::stream::{SharedStream, Stream};
use crate::uri::Uri;

/// Uploaded-file descriptors keyed by field name.
pub type UploadedFiles = BTreeMap<String, UploadedFile>;

/// An immutable server-originated HTTP request.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    request: Request,
    server_params: Params,
    cookie_params: Params,
    query_params: Params,
    uploaded_files: UploadedFiles,
    parsed_body: Option<Value>,
    attributes: Params,
}

impl ServerRequest {
    /// Methods accepted at construction.
    pub const SUPPORTED_METHODS: [&'static str; 7] =
        ["GET", "HEAD", "POST", "PATCH", "PUT", "DELETE", "OPTIONS"];

    /// Starts a builder over an environment snapshot.
    pub fn builder(env: &ServerEnv) -> ServerRequestBuilder<'_> {
        ServerRequestBuilder::new(env)
    }

    /// Builds a request entirely from the snapshot, no overrides.
    pub fn from_env(env: &ServerEnv) -> Result<Self, Error> {
        Self::builder(env).build()
    }

    fn map_request(&self, f: impl FnOnce(&Request) -> Request) -> Self {
        let mut new = self.clone();
        new.request = f(&self.request);

        new
    }

    // message contract

    pub fn protocol_version(&self) -> &str {
        self.request.protocol_version()
    }

    pub fn with_protocol_version(&self, version: &str) -> Result<Self, InvalidArgumentError> {
        let mut new = self.clone();
        new.request = self.request.with_protocol_version(version)?;

        Ok(new)
    }

    pub fn headers(&self) -> &Headers {
        self.request.headers()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.request.has_header(name)
    }

    pub fn header(&self, name: &str) -> &[String] {
        self.request.header(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.request.header_line(name)
    }

    pub fn with_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.map_request(|request| request.with_header(name, value))
    }

    pub fn with_added_header(&self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.map_request(|request| request.with_added_header(name, value))
    }

    pub fn without_header(&self, name: &str) -> Self {
        self.map_request(|request| request.without_header(name))
    }

    pub fn body(&self) -> &SharedStream {
        self.request.body()
    }

    pub fn with_body(&self, body: impl Into<SharedStream>) -> Self {
        self.map_request(|request| request.with_body(body))
    }

    // request contract

    pub fn request_target(&self) -> &str {
        self.request.request_target()
    }

    pub fn with_request_target(&self, request_target: impl Into<String>) -> Self {
        self.map_request(|request| request.with_request_target(request_target))
    }

    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// Stores the method verbatim; the allow-list applies at construction
    /// only.
    pub fn with_method(&self, method: impl Into<String>) -> Self {
        self.map_request(|request| request.with_method(method))
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        self.map_request(|request| request.with_uri(uri, preserve_host))
    }

    // server request specifics

    pub fn server_params(&self) -> &Params {
        &self.server_params
    }

    pub fn server_param(&self, name: &str) -> Option<&Value> {
        self.server_params.get(name)
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    pub fn cookie_param(&self, name: &str) -> Option<&Value> {
        self.cookie_params.get(name)
    }

    pub fn with_cookie_params(&self, cookies: Params) -> Self {
        let mut new = self.clone();
        new.cookie_params = cookies;

        new
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query_params.get(name)
    }

    pub fn with_query_params(&self, query: Params) -> Self {
        let mut new = self.clone();
        new.query_params = query;

        new
    }

    pub fn uploaded_files(&self) -> &UploadedFiles {
        &self.uploaded_files
    }

    pub fn with_uploaded_files(&self, uploaded_files: UploadedFiles) -> Self {
        let mut new = self.clone();
        new.uploaded_files = uploaded_files;

        new
    }

    /// The pre-parsed body, when one exists.
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Entry lookup into an object-shaped parsed body.
    pub fn parsed_body_param(&self, name: &str) -> Option<&Value> {
        match self.parsed_body.as_ref()? {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    /// Returns a new request with the parsed body replaced.
    ///
    /// Only absent, array or object data is accepted; an explicit null
    /// counts as absent. Scalar data fails with [`InvalidArgumentError`].
    pub fn with_parsed_body(&self, data: Option<Value>) -> Result<Self, InvalidArgumentError> {
        let data = data.filter(|value| !value.is_null());

        if let Some(value) = &data {
            ensure!(
                matches!(value, Value::Array(_) | Value::Object(_)),
                InvalidArgumentError::invalid_parsed_body(value_kind(value))
            );
        }

        let mut new = self.clone();
        new.parsed_body = data;

        Ok(new)
    }

    /// The request-scoped attribute store.
    pub fn attributes(&self) -> &Params {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns a new request with the attribute set.
    pub fn with_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut new = self.clone();
        new.attributes.insert(name.into(), value.into());

        new
    }

    /// Returns a new request without the attribute. No-op when absent.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.attributes.remove(name);

        new
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builder resolving a [`ServerRequest`] from explicit overrides plus a
/// [`ServerEnv`] snapshot.
#[derive(Debug)]
pub struct ServerRequestBuilder<'a> {
    env: &'a ServerEnv,
    protocol_version: Option<String>,
    headers: Option<Headers>,
    body: Option<SharedStream>,
    request_target: Option<String>,
    method: Option<String>,
    uri: Option<Uri>,
    server_params: Option<Params>,
    cookie_params: Option<Params>,
    query_params: Option<Params>,
    uploaded_files: Option<UploadedFiles>,
    parsed_body: Option<Value>,
    attributes: Params,
}

impl<'a> ServerRequestBuilder<'a> {
    fn new(env: &'a ServerEnv) -> Self {
        Self {
            env,
            protocol_version: None,
            headers: None,
            body: None,
            request_target: None,
            method: None,
            uri: None,
            server_params: None,
            cookie_params: None,
            query_params: None,
            uploaded_files: None,
            parsed_body: None,
            attributes: Params::new(),
        }
    }

    /// Protocol version in string form, overriding `SERVER_PROTOCOL`.
    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn body(mut self, body: impl Into<SharedStream>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn request_target(mut self, request_target: impl Into<String>) -> Self {
        self.request_target = Some(request_target.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    pub fn server_params(mut self, server_params: Params) -> Self {
        self.server_params = Some(server_params);
        self
    }

    pub fn cookie_params(mut self, cookie_params: Params) -> Self {
        self.cookie_params = Some(cookie_params);
        self
    }

    pub fn query_params(mut self, query_params: Params) -> Self {
        self.query_params = Some(query_params);
        self
    }

    pub fn uploaded_files(mut self, uploaded_files: UploadedFiles) -> Self {
        self.uploaded_files = Some(uploaded_files);
        self
    }

    /// Parsed body override; the snapshot's form data applies otherwise.
    pub fn parsed_body(mut self, data: Value) -> Self {
        self.parsed_body = Some(data);
        self
    }

    /// Seeds one attribute; attributes default to empty, never to
    /// snapshot data.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Resolves every part and assembles the request.
    ///
    /// Required parts that neither an override nor the snapshot supplies
    /// (protocol, target, method) fail with a [`RuntimeError`]; a method
    /// outside the allow-list fails likewise.
    pub fn build(self) -> Result<ServerRequest, Error> {
        let protocol_version = match self.protocol_version.as_deref() {
            Some(version) => ProtocolVersion::try_from(version).map_err(Error::from)?,
            None => {
                let line = self.env.protocol_line().ok_or(RuntimeError::ServerProtocolNotDefined)?;
                ProtocolVersion::from_protocol_line(line)?
            }
        };

        let headers = self.headers.unwrap_or_else(|| self.env.headers.clone());

        let body = self.body.unwrap_or_else(|| Stream::read_only(self.env.input.clone()).into());

        let request_target = match self.request_target {
            Some(target) => target,
            None => self.env.request_uri().ok_or(RuntimeError::RequestTargetNotDefined)?.to_string(),
        };

        let method = match self.method {
            Some(method) => method,
            None => self.env.request_method().ok_or(RuntimeError::RequestMethodNotDefined)?.to_string(),
        };
        ensure!(
            ServerRequest::SUPPORTED_METHODS.contains(&method.as_str()),
            Error::from(RuntimeError::method_not_supported(&method))
        );

        let uri = match self.uri {
            Some(uri) => uri,
            None => self.env.derive_uri()?,
        };

        debug!(method = %method, request_target = %request_target, "server request built from environment snapshot");

        Ok(ServerRequest {
            request: Request::from_parts(
                Message::new(protocol_version, headers, body),
                request_target,
                method,
                uri,
            ),
            server_params: self.server_params.unwrap_or_else(|| self.env.server.clone()),
            cookie_params: self.cookie_params.unwrap_or_else(|| self.env.cookies.clone()),
            query_params: self.query_params.unwrap_or_else(|| self.env.query.clone()),
            uploaded_files: self.uploaded_files.unwrap_or_else(|| self.env.uploaded_files.clone()),
            parsed_body: self.parsed_body.or_else(|| self.env.form.clone()),
            attributes: self.attributes,
        })
    }
}
