//! # Archive Access
//!
//! This module defines the capability interface the traversal code uses to
//! read and mutate one physical archive file, plus the concrete back-ends that
//! implement it.
//!
//! ## Key Components
//!
//! - **[`ArchiveCodec`]**: opens archives and probes whether a file is one.
//! - **[`ArchiveHandle`]**: an open, mutable archive. Entries can be looked
//!   up, extracted to a file, deleted and added. Nothing reaches the disk until
//!   [`ArchiveHandle::commit`]; dropping a handle discards its changes.
//! - **[`Backend`]**: selects one of the built-in codecs by name.
//!
//! ## Back-ends
//!
//! - [`rewrite::RewriteCodec`] keeps the archive open and, on commit, streams a
//!   new archive next to it. Untouched entries are copied raw, without being
//!   decompressed or recompressed.
//! - [`memory::MemoryCodec`] decompresses every entry into memory when opened
//!   and re-encodes the whole archive on commit.

use std::fmt;
use std::fs::{self, File, Metadata};
use std::path::Path;
use std::time::SystemTime;

use log::debug;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::path::SEPARATOR;

pub mod memory;
pub mod rewrite;

pub use memory::MemoryCodec;
pub use rewrite::RewriteCodec;

/// How an entry's bytes are encoded inside the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Bytes are copied verbatim.
    Stored,
    /// Bytes are deflate-compressed.
    Deflated,
}

impl Compression {
    /// The codec default used when no method has been decided.
    pub const DEFAULT: Compression = Compression::Deflated;

    pub(crate) fn from_method(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => Compression::Stored,
            // Methods this build cannot write are re-encoded with deflate.
            _ => Compression::Deflated,
        }
    }

    pub(crate) fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Stored => write!(f, "stored"),
            Compression::Deflated => write!(f, "deflated"),
        }
    }
}

/// Whether an entry is a file or a directory marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Directory entries are exactly those whose name ends with a separator.
    pub fn of(name: &str) -> Self {
        if name.ends_with(SEPARATOR) {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// A member of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full internal name, using `/` as separator.
    pub name: String,
    pub kind: EntryKind,
    pub compression: Compression,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Last modification time as recorded in the archive (local time).
    pub modified: Option<DateTime>,
    /// Unix mode bits, when the archive records them.
    pub unix_mode: Option<u32>,
}

impl Entry {
    /// Describe a new entry whose content will be read from a file on disk.
    ///
    /// The entry takes the file's size, modification time and permissions.
    pub(crate) fn from_file(
        name: &str,
        compression: Option<Compression>,
        metadata: &Metadata,
    ) -> Self {
        Entry {
            name: name.to_string(),
            kind: EntryKind::of(name),
            compression: compression.unwrap_or(Compression::DEFAULT),
            size: metadata.len(),
            modified: metadata.modified().ok().and_then(zip_time),
            unix_mode: unix_mode(metadata),
        }
    }
}

/// Convert a file system timestamp into a zip timestamp.
///
/// Zip timestamps carry no zone and are written in local time. Times outside
/// the representable range (1980 to 2107) yield `None`.
pub(crate) fn zip_time(time: SystemTime) -> Option<DateTime> {
    let local = chrono::DateTime::<chrono::Local>::from(time).naive_local();
    DateTime::try_from(local).ok()
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

/// An open, mutable archive file.
///
/// Each handle exclusively owns its file until it is committed or dropped.
pub trait ArchiveHandle {
    /// The archive file this handle operates on.
    fn path(&self) -> &Path;

    /// Look up an entry by its exact name, reflecting pending changes.
    fn entry(&self, name: &str) -> Option<Entry>;

    /// Write the decompressed content of an entry to `destination`.
    fn extract_to(&mut self, name: &str, destination: &Path) -> Result<u64>;

    /// Remove an entry.
    fn delete(&mut self, name: &str) -> Result<()>;

    /// Add a file entry with the content of `source`.
    ///
    /// `None` selects the codec's default compression.
    fn add_from_file(
        &mut self,
        name: &str,
        source: &Path,
        compression: Option<Compression>,
    ) -> Result<()>;

    /// Write all pending changes to the archive file.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Opens archives of one format.
pub trait ArchiveCodec {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Open an existing archive for update.
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveHandle>>;

    /// Whether `path` can be read as an archive of this format.
    ///
    /// Only the archive directory is validated. Failure to open is an answer,
    /// not an error.
    fn is_archive(&self, path: &Path) -> bool {
        is_zip(path)
    }
}

/// Built-in archive back-ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// [`RewriteCodec`]
    #[default]
    Rewrite,
    /// [`MemoryCodec`]
    Memory,
}

impl Backend {
    pub fn codec(self) -> Box<dyn ArchiveCodec> {
        match self {
            Backend::Rewrite => Box::new(RewriteCodec),
            Backend::Memory => Box::new(MemoryCodec),
        }
    }
}

/// Check whether a file has a readable zip central directory.
pub fn is_zip(path: &Path) -> bool {
    File::open(path)
        .map(|file| ZipArchive::new(file).is_ok())
        .unwrap_or(false)
}

pub(crate) fn open_zip(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|e| Error::archive(path, e))
}

/// Writer options reproducing the recorded attributes of `entry`.
///
/// Missing timestamps fall back to the current time, missing modes to the
/// writer's defaults.
pub(crate) fn file_options(entry: &Entry) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(entry.compression.method())
        .large_file(entry.size >= u64::from(u32::MAX));
    if let Some(modified) = entry.modified {
        options = options.last_modified_time(modified);
    }
    if let Some(mode) = entry.unix_mode {
        options = options.unix_permissions(mode);
    }
    options
}

/// Build a replacement archive next to `path` and move it into place.
///
/// The original file is untouched unless `write` succeeds and the new archive
/// is complete. Symlinks are followed so the file they point to is replaced,
/// not the link. The archive `comment` and the permissions of the original
/// file are carried over.
pub(crate) fn replace_archive<F>(path: &Path, comment: &[u8], write: F) -> Result<()>
where
    F: FnOnce(&mut ZipWriter<&mut File>) -> Result<()>,
{
    let target = fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or(Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;

    {
        let mut writer = ZipWriter::new(staged.as_file_mut());
        writer
            .set_raw_comment(Box::from(comment))
            .map_err(|e| Error::archive(path, e))?;
        write(&mut writer)?;
        writer.finish().map_err(|e| Error::archive(path, e))?;
    }

    let permissions = fs::metadata(&target)?.permissions();
    fs::set_permissions(staged.path(), permissions)?;

    debug!("Replacing {} with {}", target.display(), staged.path().display());
    staged.persist(&target).map_err(|e| Error::Persist {
        archive: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
