//! Byte stream abstraction over an owned I/O handle.
//!
//! A [`Stream`] wraps exactly one byte-oriented handle (a file or an
//! in-memory cursor) and gates reads and writes through the fopen-style
//! mode it was opened with. Size and position are live queries against the
//! handle, never cached. Releasing the handle, via [`Stream::close`] or
//! [`Stream::detach`], is terminal: a detached stream reports absence from
//! its queries and fails every I/O call.
//!
//! [`SharedStream`] is the handle form installed into messages: message
//! derivation clones the handle, not the stream, so an unchanged body stays
//! structurally shared between the old and the new instance.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

use bytes::Bytes;
use serde_json::Value;
use tracing::trace;

use crate::ensure;
use crate::error::RuntimeError;

/// Byte-oriented handle a [`Stream`] can wrap.
///
/// Blanket-implemented for everything that can read, write and seek, so
/// both files and in-memory cursors qualify. Capability gating happens at
/// the [`Stream`] level through the open mode, not through this trait.
pub trait Handle: Read + Write + Seek + fmt::Debug {}

impl<T: Read + Write + Seek + fmt::Debug> Handle for T {}

/// Parsed fopen-style mode string.
///
/// Writable when the mode contains any of `w`, `a`, `x`, `c`, `+`;
/// readable when it contains `r` or `+`. The `b`/`t` flags are accepted
/// and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mode {
    raw: String,
}

impl Mode {
    fn new(raw: &str) -> Self {
        Self { raw: raw.to_string() }
    }

    fn as_str(&self) -> &str {
        &self.raw
    }

    fn readable(&self) -> bool {
        self.raw.contains('r') || self.raw.contains('+')
    }

    fn writable(&self) -> bool {
        ['w', 'a', 'x', 'c', '+'].iter().any(|flag| self.raw.contains(*flag))
    }

    /// Maps the primary mode character onto [`OpenOptions`]; `+` upgrades
    /// the handle to read-write.
    fn open_options(&self) -> Result<OpenOptions, RuntimeError> {
        let plus = self.raw.contains('+');
        let mut options = OpenOptions::new();

        match self.raw.chars().next() {
            Some('r') => {
                options.read(true).write(plus);
            }
            Some('w') => {
                options.read(plus).write(true).create(true).truncate(true);
            }
            Some('a') => {
                options.read(plus).append(true).create(true);
            }
            Some('x') => {
                options.read(plus).write(true).create_new(true);
            }
            Some('c') => {
                options.read(plus).write(true).create(true);
            }
            _ => return Err(RuntimeError::unsupported_mode(&self.raw)),
        }

        Ok(options)
    }
}

/// A byte stream over exactly one underlying I/O handle.
///
/// The stream starts *attached*. [`close`](Stream::close) and
/// [`detach`](Stream::detach) release the handle and transition the stream
/// into the terminal *detached* state: [`size`](Stream::size) and
/// [`metadata`](Stream::metadata) report `None`, [`eof`](Stream::eof)
/// reports `true`, and every I/O call fails with
/// [`RuntimeError::Detached`].
#[derive(Debug)]
pub struct Stream {
    handle: Option<Box<dyn Handle>>,
    mode: Mode,
    target: String,
    reached_eof: bool,
}

impl Stream {
    /// Opens `path` with an fopen-style `mode` string.
    ///
    /// The mode decides both the [`OpenOptions`] used against the
    /// filesystem and the capability gating of the resulting stream.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, RuntimeError> {
        let mode = Mode::new(mode);
        let target = path.as_ref().display().to_string();
        let file = mode.open_options()?.open(path.as_ref())?;

        trace!(stream = %target, mode = %mode.as_str(), "stream opened");

        Ok(Self { handle: Some(Box::new(file)), mode, target, reached_eof: false })
    }

    /// In-memory read-write scratch stream.
    pub fn temp() -> Self {
        Self::in_memory(Vec::new(), "w+b")
    }

    /// In-memory read-write stream pre-filled with `bytes`, positioned at
    /// the start.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::in_memory(bytes.into(), "w+b")
    }

    /// Read-only in-memory stream over raw input bytes.
    pub fn read_only(bytes: impl Into<Vec<u8>>) -> Self {
        Self::in_memory(bytes.into(), "rb")
    }

    fn in_memory(bytes: Vec<u8>, mode: &str) -> Self {
        Self {
            handle: Some(Box::new(Cursor::new(bytes))),
            mode: Mode::new(mode),
            target: "memory".to_string(),
            reached_eof: false,
        }
    }

    /// Size of the underlying handle in bytes.
    ///
    /// Queried live by seeking to the end and restoring the position.
    /// `None` when detached or when any step of the query fails.
    pub fn size(&mut self) -> Option<u64> {
        let handle = self.handle.as_mut()?;

        let position = handle.stream_position().ok()?;
        let end = handle.seek(SeekFrom::End(0)).ok()?;
        handle.seek(SeekFrom::Start(position)).ok()?;

        Some(end)
    }

    /// Current position of the handle.
    pub fn tell(&mut self) -> Result<u64, RuntimeError> {
        let handle = self.handle.as_mut().ok_or(RuntimeError::Detached)?;
        Ok(handle.stream_position()?)
    }

    /// True when detached, or once a read has hit the end of the stream.
    /// Seeking clears the flag.
    pub fn eof(&self) -> bool {
        self.handle.is_none() || self.reached_eof
    }

    pub fn is_seekable(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.handle.is_some() && self.mode.readable()
    }

    pub fn is_writable(&self) -> bool {
        self.handle.is_some() && self.mode.writable()
    }

    /// Repositions the handle.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<(), RuntimeError> {
        ensure!(self.handle.is_some(), RuntimeError::Detached);
        ensure!(self.is_seekable(), RuntimeError::not_seekable(&self.target));

        let handle = self.handle.as_mut().ok_or(RuntimeError::Detached)?;
        handle.seek(pos)?;
        self.reached_eof = false;

        Ok(())
    }

    /// Seeks back to the start of the stream.
    pub fn rewind(&mut self) -> Result<(), RuntimeError> {
        self.seek(SeekFrom::Start(0))
    }

    /// Writes all of `bytes`, returning the number of bytes written.
    ///
    /// A short write surfaces as an error, never as a partial count.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, RuntimeError> {
        ensure!(self.handle.is_some(), RuntimeError::Detached);
        ensure!(self.is_writable(), RuntimeError::not_writable(&self.target));

        let handle = self.handle.as_mut().ok_or(RuntimeError::Detached)?;
        handle.write_all(bytes)?;

        Ok(bytes.len())
    }

    /// Reads up to `length` bytes from the current position.
    pub fn read(&mut self, length: usize) -> Result<Bytes, RuntimeError> {
        ensure!(self.handle.is_some(), RuntimeError::Detached);
        ensure!(self.is_readable(), RuntimeError::not_readable(&self.target));

        let handle = self.handle.as_mut().ok_or(RuntimeError::Detached)?;
        let mut buf = vec![0u8; length];
        let n = handle.read(&mut buf)?;

        if n == 0 && length > 0 {
            self.reached_eof = true;
        }
        buf.truncate(n);

        Ok(Bytes::from(buf))
    }

    /// Remaining bytes from the current position to the end.
    pub fn contents(&mut self) -> Result<Bytes, RuntimeError> {
        ensure!(self.handle.is_some(), RuntimeError::Detached);
        ensure!(self.is_readable(), RuntimeError::not_readable(&self.target));

        let handle = self.handle.as_mut().ok_or(RuntimeError::Detached)?;
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf)?;
        self.reached_eof = true;

        Ok(Bytes::from(buf))
    }

    /// Whole stream contents, rewinding first when the handle allows it.
    pub fn full_contents(&mut self) -> Result<Bytes, RuntimeError> {
        if self.is_seekable() {
            self.rewind()?;
        }

        self.contents()
    }

    /// Metadata of the live handle, `None` when detached.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        if self.handle.is_none() {
            return None;
        }

        Some(StreamMetadata {
            mode: self.mode.as_str().to_string(),
            seekable: true,
            uri: self.target.clone(),
            eof: self.reached_eof,
        })
    }

    /// Single metadata entry by key, `None` when detached or unknown.
    pub fn metadata_value(&self, key: &str) -> Option<Value> {
        self.metadata()?.get(key)
    }

    /// Releases and closes the handle. Idempotent.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            trace!(stream = %self.target, "stream closed");
        }
    }

    /// Releases ownership of the handle without closing it.
    ///
    /// The stream is unusable afterwards; the caller becomes responsible
    /// for the returned handle.
    pub fn detach(&mut self) -> Option<Box<dyn Handle>> {
        let handle = self.handle.take();
        if handle.is_some() {
            trace!(stream = %self.target, "stream detached");
        }

        handle
    }
}

/// Point-in-time view of a live stream's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    pub mode: String,
    pub seekable: bool,
    pub uri: String,
    pub eof: bool,
}

impl StreamMetadata {
    /// Keyed lookup mirroring a loosely typed metadata mapping.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "mode" => Some(Value::String(self.mode.clone())),
            "seekable" => Some(Value::Bool(self.seekable)),
            "uri" => Some(Value::String(self.uri.clone())),
            "eof" => Some(Value::Bool(self.eof)),
            _ => None,
        }
    }
}

/// Shared handle to a [`Stream`] installed as a message body.
///
/// Cloning shares the underlying stream instead of copying it, which is
/// how message derivation keeps an unchanged body common to the old and
/// the new instance. Single-threaded by design: the model guarantees value
/// semantics per message instance, not synchronization across instances
/// sharing one handle. Callers must not mutate a stream after installing
/// it into a message.
#[derive(Debug, Clone)]
pub struct SharedStream {
    inner: Rc<RefCell<Stream>>,
}

impl SharedStream {
    pub fn new(stream: Stream) -> Self {
        Self { inner: Rc::new(RefCell::new(stream)) }
    }

    /// Immutable borrow of the underlying stream.
    pub fn borrow(&self) -> Ref<'_, Stream> {
        self.inner.borrow()
    }

    /// Mutable borrow of the underlying stream for I/O calls.
    pub fn borrow_mut(&self) -> RefMut<'_, Stream> {
        self.inner.borrow_mut()
    }

    /// True when both handles refer to the same underlying stream.
    pub fn shares_with(&self, other: &SharedStream) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Stream> for SharedStream {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("http-message-{}-{name}", std::process::id()))
    }

    #[test]
    fn temp_stream_round_trip() {
        let mut stream = Stream::temp();

        assert!(stream.is_readable());
        assert!(stream.is_writable());
        assert!(stream.is_seekable());

        assert_eq!(stream.write(b"hello world").unwrap(), 11);
        assert_eq!(stream.tell().unwrap(), 11);
        assert_eq!(stream.size(), Some(11));
        // size query must not move the position
        assert_eq!(stream.tell().unwrap(), 11);

        stream.rewind().unwrap();
        assert_eq!(&stream.read(5).unwrap()[..], b"hello");
        assert_eq!(&stream.contents().unwrap()[..], b" world");
    }

    #[test]
    fn from_bytes_starts_at_origin() {
        let mut stream = Stream::from_bytes(&b"abc"[..]);

        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(&stream.contents().unwrap()[..], b"abc");
    }

    #[test]
    fn read_only_stream_rejects_writes() {
        let mut stream = Stream::read_only(&b"input"[..]);

        assert!(stream.is_readable());
        assert!(!stream.is_writable());

        let err = stream.write(b"nope").unwrap_err();
        assert!(matches!(err, RuntimeError::NotWritable { .. }));

        assert_eq!(&stream.read(5).unwrap()[..], b"input");
    }

    #[test]
    fn eof_tracks_reads_and_resets_on_seek() {
        let mut stream = Stream::from_bytes(&b"ab"[..]);

        assert!(!stream.eof());
        stream.read(2).unwrap();
        assert!(!stream.eof());
        stream.read(1).unwrap();
        assert!(stream.eof());

        stream.rewind().unwrap();
        assert!(!stream.eof());
    }

    #[test]
    fn close_is_terminal_and_idempotent() {
        let mut stream = Stream::temp();
        stream.write(b"x").unwrap();

        stream.close();
        stream.close();

        assert!(stream.eof());
        assert_eq!(stream.size(), None);
        assert!(stream.metadata().is_none());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());

        assert!(matches!(stream.read(1).unwrap_err(), RuntimeError::Detached));
        assert!(matches!(stream.tell().unwrap_err(), RuntimeError::Detached));
        assert!(matches!(stream.seek(SeekFrom::Start(0)).unwrap_err(), RuntimeError::Detached));
    }

    #[test]
    fn detach_hands_over_the_raw_handle() {
        let mut stream = Stream::from_bytes(&b"kept"[..]);

        let mut handle = stream.detach().unwrap();
        assert!(stream.detach().is_none());
        assert!(stream.eof());

        // the caller owns the handle now, it stays usable
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"kept");
    }

    #[test]
    fn full_contents_reads_from_the_start() {
        let mut stream = Stream::from_bytes(&b"payload"[..]);
        stream.read(3).unwrap();

        assert_eq!(&stream.full_contents().unwrap()[..], b"payload");
    }

    #[test]
    fn metadata_exposes_mode_and_target() {
        let stream = Stream::temp();
        let metadata = stream.metadata().unwrap();

        assert_eq!(metadata.mode, "w+b");
        assert!(metadata.seekable);
        assert_eq!(metadata.uri, "memory");

        assert_eq!(stream.metadata_value("mode"), Some(Value::String("w+b".to_string())));
        assert_eq!(stream.metadata_value("seekable"), Some(Value::Bool(true)));
        assert_eq!(stream.metadata_value("nope"), None);
    }

    #[test]
    fn open_write_then_read_back() {
        let path = scratch_path("round-trip");

        {
            let mut stream = Stream::open(&path, "wb").unwrap();
            assert!(stream.is_writable());
            assert!(!stream.is_readable());
            stream.write(b"on disk").unwrap();
            assert!(matches!(stream.read(1).unwrap_err(), RuntimeError::NotReadable { .. }));
            stream.close();
        }

        let mut stream = Stream::open(&path, "rb").unwrap();
        assert!(!stream.is_writable());
        assert_eq!(stream.size(), Some(7));
        assert_eq!(&stream.contents().unwrap()[..], b"on disk");
        stream.close();

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn open_rejects_unknown_mode() {
        let err = Stream::open(scratch_path("bad-mode"), "z").unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedMode { .. }));
    }

    #[test]
    fn open_missing_file_is_a_runtime_error() {
        let err = Stream::open(scratch_path("missing"), "rb").unwrap_err();
        assert!(matches!(err, RuntimeError::Io { .. }));
    }

    #[test]
    fn shared_stream_clones_share_the_handle() {
        let shared = SharedStream::new(Stream::temp());
        let clone = shared.clone();

        assert!(shared.shares_with(&clone));
        clone.borrow_mut().write(b"once").unwrap();
        assert_eq!(shared.borrow_mut().size(), Some(4));
    }
}
