use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::message::Headers;
use crate::uri::Uri;

use super::upload::UploadedFile;

/// String-keyed mapping of loosely typed parameter values.
pub type Params = serde_json::Map<String, Value>;

/// Point-in-time snapshot of the ambient request environment.
///
/// Surrounding transport glue fills one of these in and hands it to
/// [`ServerRequest::builder`](super::ServerRequest::builder). The core
/// never reads process-wide state, which keeps server-request
/// construction deterministic and testable.
///
/// `server` uses the conventional upper-case parameter keys
/// (`SERVER_PROTOCOL`, `REQUEST_METHOD`, `REQUEST_URI`, `QUERY_STRING`,
/// `REQUEST_SCHEME`, `HTTPS`, `HTTP_HOST`, `SERVER_PORT`) where the
/// derivations below look for them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerEnv {
    /// Server parameter mapping, protocol and target keys included.
    pub server: Params,
    /// Header listing as received, name order preserved.
    pub headers: Headers,
    pub cookies: Params,
    pub query: Params,
    /// Uploaded-file descriptors keyed by field name.
    pub uploaded_files: BTreeMap<String, UploadedFile>,
    /// Pre-parsed form body, when the transport decoded one.
    pub form: Option<Value>,
    /// Raw request input bytes.
    pub input: Vec<u8>,
}

impl ServerEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert into the server parameter mapping.
    pub fn with_server_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.server.insert(key.into(), value.into());
        self
    }

    /// Chainable append to the header listing.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value.into());
        self
    }

    pub fn with_cookie_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cookies.insert(key.into(), value.into());
        self
    }

    pub fn with_query_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_uploaded_file(mut self, field: impl Into<String>, file: UploadedFile) -> Self {
        self.uploaded_files.insert(field.into(), file);
        self
    }

    pub fn with_form(mut self, form: Value) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = input.into();
        self
    }

    fn server_str(&self, key: &str) -> Option<&str> {
        self.server.get(key).and_then(Value::as_str)
    }

    /// `"NAME/VERSION"` protocol line, when the snapshot carries one.
    pub(crate) fn protocol_line(&self) -> Option<&str> {
        self.server_str("SERVER_PROTOCOL")
    }

    pub(crate) fn request_uri(&self) -> Option<&str> {
        self.server_str("REQUEST_URI")
    }

    pub(crate) fn request_method(&self) -> Option<&str> {
        self.server_str("REQUEST_METHOD")
    }

    /// Derives the request [`Uri`] the way the environment reports it:
    /// explicit `REQUEST_SCHEME`, else `HTTPS=on`, else plain http; host
    /// from `HTTP_HOST`; port from `SERVER_PORT` when non-zero; path and
    /// query split out of `REQUEST_URI`/`QUERY_STRING`.
    pub(crate) fn derive_uri(&self) -> Result<Uri, Error> {
        let scheme = match self.server_str("REQUEST_SCHEME") {
            Some(scheme) => scheme.to_ascii_lowercase(),
            None if self.server_str("HTTPS").is_some_and(|v| v.eq_ignore_ascii_case("on")) => {
                "https".to_string()
            }
            None => "http".to_string(),
        };

        let host = self.server_str("HTTP_HOST").unwrap_or_default();
        let path = match self.request_uri() {
            Some(uri) => uri.split_once('?').map_or(uri, |(path, _)| path),
            None => "",
        };
        let query = self.server_str("QUERY_STRING").unwrap_or_default();

        let uri = Uri::default()
            .with_scheme(&scheme)?
            .with_host(host)
            .with_port(self.server_port().map(u32::from))?
            .with_path(path)
            .with_query(query);

        Ok(uri)
    }

    /// `SERVER_PORT`, accepting both string and numeric forms; zero and
    /// empty values count as absent.
    fn server_port(&self) -> Option<u16> {
        let port = match self.server.get("SERVER_PORT")? {
            Value::String(s) => s.parse().ok()?,
            Value::Number(n) => u16::try_from(n.as_u64()?).ok()?,
            _ => return None,
        };

        (port != 0).then_some(port)
    }
}
