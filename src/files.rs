//! Streams of openable files
//!
//! [`files`] and [`dir`] are ordinary producer stages whose values are
//! [`BoxFile`]s. Files that fail to open are skipped silently; only a
//! directory that cannot be listed at all is reported, and it is reported
//! before any stage is spawned.

use std::fmt;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::TryStreamExt;
use tokio::fs::DirEntry;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tokio_stream::wrappers::ReadDirStream;

use crate::error::{StreamError, StreamResult};
use crate::stream::Stream;
use crate::stream_configuration::BufferConfig;

/// A readable, seekable, closable resource with a name.
///
/// Reading and seeking go through tokio's `AsyncReadExt`/`AsyncSeekExt`.
/// After `close` every read, seek or further close fails.
pub trait File: AsyncRead + AsyncSeek + Send + Unpin {
    fn name(&self) -> &str;

    fn close(&mut self) -> io::Result<()>;
}

/// The value type of file streams
pub type BoxFile = Box<dyn File>;

fn closed_error() -> io::Error {
    io::Error::other("file already closed")
}

/// A file on disk, named by the path it was opened with
#[derive(Debug)]
pub struct OsFile {
    name: String,
    inner: Option<tokio::fs::File>,
}

impl OsFile {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let inner = tokio::fs::File::open(path).await?;
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            inner: Some(inner),
        })
    }
}

impl AsyncRead for OsFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut().inner.as_mut() {
            Some(file) => Pin::new(file).poll_read(cx, buf),
            None => Poll::Ready(Err(closed_error())),
        }
    }
}

impl AsyncSeek for OsFile {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        match self.get_mut().inner.as_mut() {
            Some(file) => Pin::new(file).start_seek(position),
            None => Err(closed_error()),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        match self.get_mut().inner.as_mut() {
            Some(file) => Pin::new(file).poll_complete(cx),
            None => Poll::Ready(Err(closed_error())),
        }
    }
}

impl File for OsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> io::Result<()> {
        // Read-only handle, nothing to flush.
        self.inner.take().map(drop).ok_or_else(closed_error)
    }
}

type CloseFn = Box<dyn FnOnce() -> io::Result<()> + Send>;

/// A [`File`] backed by an in-memory reader instead of a file descriptor.
///
/// `on_close` runs on the first `close()` and its result is returned, e.g.
/// to hand a buffer back to a pool.
pub struct FileBuffer<R> {
    reader: R,
    name: String,
    on_close: Option<CloseFn>,
}

impl<R> FileBuffer<R> {
    pub fn new<F>(reader: R, name: impl Into<String>, on_close: F) -> Self
    where
        F: FnOnce() -> io::Result<()> + Send + 'static,
    {
        Self {
            reader,
            name: name.into(),
            on_close: Some(Box::new(on_close)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.on_close.is_none()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    fn open_reader(&mut self) -> io::Result<&mut R> {
        if self.is_closed() {
            return Err(closed_error());
        }
        Ok(&mut self.reader)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for FileBuffer<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut().open_reader() {
            Ok(reader) => Pin::new(reader).poll_read(cx, buf),
            Err(err) => Poll::Ready(Err(err)),
        }
    }
}

impl<R: AsyncSeek + Unpin> AsyncSeek for FileBuffer<R> {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        Pin::new(self.get_mut().open_reader()?).start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        match self.get_mut().open_reader() {
            Ok(reader) => Pin::new(reader).poll_complete(cx),
            Err(err) => Poll::Ready(Err(err)),
        }
    }
}

impl<R> File for FileBuffer<R>
where
    R: AsyncRead + AsyncSeek + Send + Unpin,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> io::Result<()> {
        let on_close = self.on_close.take().ok_or_else(closed_error)?;
        on_close()
    }
}

impl<R> fmt::Debug for FileBuffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBuffer")
            .field("name", &self.name)
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

fn open_all(label: &'static str, paths: Vec<PathBuf>) -> Stream<BoxFile> {
    Stream::spawn(label, BufferConfig::default(), paths.len(), move |out| async move {
        for path in paths {
            let file = match OsFile::open(&path).await {
                Ok(file) => file,
                Err(err) => {
                    log::debug!("{}: skipping {}: {}", label, path.display(), err);
                    continue;
                }
            };
            if out.emit(Box::new(file) as BoxFile).await.is_err() {
                log::debug!("{} stage: consumer gone, stopping", label);
                break;
            }
        }
    })
}

/// Stream the files with the given names, in order.
///
/// Names that fail to open are skipped without trace in the stream.
pub fn files<I, P>(names: I) -> Stream<BoxFile>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let paths = names
        .into_iter()
        .map(|name| name.as_ref().to_path_buf())
        .collect();
    open_all("files", paths)
}

async fn is_directory(entry: &DirEntry) -> bool {
    match entry.file_type().await {
        Ok(file_type) if file_type.is_symlink() => tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false),
        Ok(file_type) => file_type.is_dir(),
        // let the open attempt decide
        Err(_) => false,
    }
}

/// Stream the regular files of a directory, in listing order.
///
/// Fails with [`StreamError::DirectoryUnreadable`] when the directory cannot
/// be listed; no stage is spawned in that case. Subdirectories and files
/// that fail to open are skipped.
pub async fn dir(path: impl AsRef<Path>) -> StreamResult<Stream<BoxFile>> {
    let path = path.as_ref();
    let unreadable = |source: io::Error| StreamError::DirectoryUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let listing = tokio::fs::read_dir(path).await.map_err(unreadable)?;
    let entries: Vec<DirEntry> = ReadDirStream::new(listing)
        .try_collect()
        .await
        .map_err(unreadable)?;

    let mut paths = Vec::with_capacity(entries.len());
    for entry in entries {
        if is_directory(&entry).await {
            log::trace!("dir: skipping subdirectory {}", entry.path().display());
            continue;
        }
        paths.push(entry.path());
    }

    Ok(open_all("dir", paths))
}
