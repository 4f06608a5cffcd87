use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::stream::Stream;

/// Descriptor of one uploaded file as reported by the environment.
///
/// Carries what the transport knows about the upload: the client-supplied
/// file name and media type (both untrusted), the spooled size, the
/// temporary path the payload was written to and the transport's error
/// code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub client_filename: Option<String>,
    pub client_media_type: Option<String>,
    pub size: Option<u64>,
    pub tmp_path: Option<PathBuf>,
    pub error: u8,
}

impl UploadedFile {
    /// Error code of a fully received upload.
    pub const ERR_OK: u8 = 0;

    /// True when the transport reported no upload error.
    pub fn is_ok(&self) -> bool {
        self.error == Self::ERR_OK
    }

    /// Opens a read-only stream over the spooled payload.
    pub fn open(&self) -> Result<Stream, RuntimeError> {
        let path = self.tmp_path.as_ref().ok_or(RuntimeError::UploadUnavailable)?;

        Stream::open(path, "rb")
    }
}
