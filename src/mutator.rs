//! # Nested Insertion
//!
//! [`NestedMutator`] copies a file into an archive at a logical path that may
//! pass through archives stored inside other archives, for example
//! `christmas/this_year.zip/new` inside `photos.zip`.
//!
//! ## Algorithm
//!
//! Each recursion level opens exactly one archive and walks the remaining path
//! one segment at a time:
//!
//! 1.  **Directory**: the segment names a directory entry. The accumulated
//!     entry name gains a trailing separator and the walk continues without
//!     touching the archive.
//! 2.  **Nested archive**: the segment names a file entry. Its content is
//!     extracted to a [`StagedCopy`], the rest of the path is applied to that
//!     copy by a recursive call, and the entry is replaced by the mutated copy
//!     using the entry's original compression method. Nothing after this
//!     segment is looked at on this level.
//! 3.  **Insertion**: the segments are exhausted. The source file is added as
//!     `<accumulated prefix><source file name>`.
//!
//! An archive is committed only after everything beneath it has succeeded. A
//! failure at any depth therefore leaves all enclosing archives unchanged.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::archive::{ArchiveCodec, ArchiveHandle, Compression, Entry};
use crate::config::InsertOptions;
use crate::error::{Error, Result};
use crate::path::{EntryName, LogicalPath, SEPARATOR};
use crate::resolver::{resolve, resolve_segment, Resolution};
use crate::staging::StagedCopy;

/// The file being copied into the archive.
#[derive(Debug, Clone)]
struct Source {
    path: PathBuf,
    file_name: String,
}

/// Drives the recursive walk over nested archives.
pub struct NestedMutator<'a> {
    codec: &'a dyn ArchiveCodec,
    options: InsertOptions,
}

impl<'a> NestedMutator<'a> {
    pub fn new(codec: &'a dyn ArchiveCodec, options: InsertOptions) -> Self {
        Self { codec, options }
    }

    /// Copy `source` into `archive` at `target_path`.
    ///
    /// `target_path` uses `/` as separator; an empty path (or `/`) names the
    /// archive root.
    pub fn insert(&self, source: &Path, archive: &Path, target_path: &str) -> Result<()> {
        if !source.is_file() {
            return Err(Error::SourceNotFound {
                path: absolute(source),
            });
        }
        if !archive.is_file() {
            return Err(Error::TargetNotFound {
                path: absolute(archive),
            });
        }

        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::SourceNotFound {
                path: absolute(source),
            })?;
        let source = Source {
            path: source.to_path_buf(),
            file_name,
        };

        debug!(
            "Copying {} into {} at '{}' using the {} backend",
            source.path.display(),
            archive.display(),
            target_path,
            self.codec.name()
        );
        self.process(&source, archive, LogicalPath::new(target_path), 0)
    }

    fn process(
        &self,
        source: &Source,
        archive: &Path,
        target: LogicalPath<'_>,
        depth: usize,
    ) -> Result<()> {
        let mut handle = self.codec.open(archive)?;
        let mut name = EntryName::new();

        for segment in target.segments() {
            name.push(segment.name);

            match resolve_segment(handle.as_ref(), &name)? {
                Resolution::Directory(_) => name.descend(),
                Resolution::NestedArchive(entry) => {
                    let remainder = target.remainder_after(&segment);
                    return self.replace_nested(handle, entry, source, remainder, depth);
                }
            }
        }

        self.insert_terminal(handle, source, &name, depth)
    }

    fn replace_nested(
        &self,
        handle: Box<dyn ArchiveHandle>,
        entry: Entry,
        source: &Source,
        remainder: LogicalPath<'_>,
        depth: usize,
    ) -> Result<()> {
        let staged = StagedCopy::new()?;
        let result = self.rebuild_nested(handle, &entry, &staged, source, remainder, depth);

        self.trace(depth, format_args!("Deleting {}...", staged.path().display()));
        result
    }

    fn rebuild_nested(
        &self,
        mut handle: Box<dyn ArchiveHandle>,
        entry: &Entry,
        staged: &StagedCopy,
        source: &Source,
        remainder: LogicalPath<'_>,
        depth: usize,
    ) -> Result<()> {
        let archive = handle.path().to_path_buf();

        self.trace(depth, format_args!("Processing nested zip {}...", entry.name));
        self.trace(
            depth,
            format_args!(
                "Extracting nested zip {} to {}...",
                qualified(&archive, &entry.name),
                staged.path().display()
            ),
        );
        handle.extract_to(&entry.name, staged.path())?;
        staged.apply_mode(entry.unix_mode)?;

        self.process(source, staged.path(), remainder, depth + 1)?;

        self.trace(
            depth,
            format_args!(
                "Deleting existing nested entry {}...",
                qualified(&archive, &entry.name)
            ),
        );
        handle.delete(&entry.name)?;

        self.trace(
            depth,
            format_args!(
                "Creating nested entry {} from {} ({})...",
                qualified(&archive, &entry.name),
                staged.path().display(),
                entry.compression
            ),
        );
        handle.add_from_file(&entry.name, staged.path(), Some(entry.compression))?;
        handle.commit()
    }

    fn insert_terminal(
        &self,
        mut handle: Box<dyn ArchiveHandle>,
        source: &Source,
        prefix: &EntryName,
        depth: usize,
    ) -> Result<()> {
        let archive = handle.path().to_path_buf();
        let entry_name = prefix.join(&source.file_name);

        let compression = match resolve(handle.as_ref(), &entry_name) {
            Some(existing) => {
                if self.options.no_overwrite {
                    return Err(Error::EntryExists {
                        archive,
                        entry: entry_name,
                    });
                }
                self.trace(
                    depth,
                    format_args!(
                        "Deleting existing entry {}...",
                        qualified(&archive, &entry_name)
                    ),
                );
                handle.delete(&entry_name)?;
                Some(existing.compression)
            }
            None if self.codec.is_archive(&source.path) => {
                self.trace(
                    depth,
                    format_args!("Zip file detected, adding without compression."),
                );
                Some(Compression::Stored)
            }
            None => None,
        };

        self.trace(
            depth,
            format_args!("Creating entry {}...", qualified(&archive, &entry_name)),
        );
        handle.add_from_file(&entry_name, &source.path, compression)?;
        handle.commit()
    }

    fn trace(&self, depth: usize, message: fmt::Arguments<'_>) {
        let indent = depth * 2;
        if self.options.verbose {
            info!("{:indent$}{}", "", message, indent = indent);
        } else {
            debug!("{:indent$}{}", "", message, indent = indent);
        }
    }
}

fn qualified(archive: &Path, entry: &str) -> String {
    format!("{}{}{}", archive.display(), SEPARATOR, entry)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
