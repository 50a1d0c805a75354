//! Entry resolution for one path segment
//!
//! A segment is tested first as a file entry (the bare accumulated name) and
//! only then as a directory entry (the name with a trailing separator). A
//! matched file entry is treated as a nested archive boundary; its content is
//! not inspected here.

use crate::archive::{ArchiveHandle, Entry};
use crate::error::{Error, Result};
use crate::path::EntryName;

/// What the accumulated name matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file entry, which is descended into as a nested archive.
    NestedArchive(Entry),
    /// A directory entry.
    Directory(Entry),
}

/// Look up an entry by its exact name.
pub fn resolve(handle: &dyn ArchiveHandle, candidate: &str) -> Option<Entry> {
    handle.entry(candidate)
}

/// Classify the accumulated name against the entries of `handle`.
pub fn resolve_segment(handle: &dyn ArchiveHandle, name: &EntryName) -> Result<Resolution> {
    if let Some(entry) = resolve(handle, name.as_file()) {
        return Ok(Resolution::NestedArchive(entry));
    }

    let directory = name.as_directory();
    match resolve(handle, &directory) {
        Some(entry) => Ok(Resolution::Directory(entry)),
        None => Err(Error::EntryNotFound {
            archive: handle.path().to_path_buf(),
            entry: directory,
        }),
    }
}
