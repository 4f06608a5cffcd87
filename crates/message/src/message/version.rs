use std::fmt;

use crate::error::{Error, InvalidArgumentError, RuntimeError};

/// Protocol versions a message may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    Http10,
    Http11,
    H2,
}

impl ProtocolVersion {
    /// The version in its message string form (`"1.0"`, `"1.1"`, `"2"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
            Self::H2 => "2",
        }
    }

    /// Resolves the version from a `"NAME/VERSION"` protocol line, the form
    /// an ambient environment reports (e.g. `"HTTP/1.1"`).
    ///
    /// A line without a version part is a [`RuntimeError`]; a version
    /// outside the supported set is an [`InvalidArgumentError`].
    pub fn from_protocol_line(line: &str) -> Result<Self, Error> {
        let version = line.split('/').nth(1).ok_or(RuntimeError::ProtocolVersionNotDefined)?;

        Ok(Self::try_from(version)?)
    }
}

impl TryFrom<&str> for ProtocolVersion {
    type Error = InvalidArgumentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "1.0" => Ok(Self::Http10),
            "1.1" => Ok(Self::Http11),
            "2" => Ok(Self::H2),
            _ => Err(InvalidArgumentError::unsupported_protocol_version(value)),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
