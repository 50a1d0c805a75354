//! # Error Handling
//!
//! This module defines the centralized error type for `cpzip`. It uses the
//! `thiserror` library to describe every failure mode of a copy operation with
//! enough context (archive file, entry name) to be reported directly to the
//! user.
//!
//! ## Taxonomy
//!
//! - **Not found**: the source file, the target archive, a glob pattern with no
//!   matches, or a path segment inside an archive does not exist.
//! - **Already exists**: the final entry exists and overwriting is disabled.
//! - **Codec / I/O failures**: corruption reported by the zip codec, disk or
//!   permission errors, failure to replace the archive on commit.
//!
//! A file that cannot be opened as an archive while probing the source is not
//! an error at all; see [`crate::archive::ArchiveCodec::is_archive`].
//!
//! [`Error::exit_code`] maps an error to the process exit code reported by the
//! command-line tool.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cpzip operations
#[derive(Error, Debug)]
pub enum Error {
    /// The file to copy does not exist.
    #[error("Source file not found: {}.", path.display())]
    SourceNotFound { path: PathBuf },

    /// The archive to copy into does not exist.
    #[error("Target file not found: {}.", path.display())]
    TargetNotFound { path: PathBuf },

    /// A wildcard argument expanded to no files.
    #[error("No files match '{pattern}'")]
    NoMatches { pattern: String },

    /// A path segment names neither a file entry nor a directory entry.
    #[error("Entry {}/{entry} not found. Check target path.", archive.display())]
    EntryNotFound { archive: PathBuf, entry: String },

    /// The final entry exists and overwriting was disabled.
    #[error("Entry {entry} already exists in {}.", archive.display())]
    EntryExists { archive: PathBuf, entry: String },

    /// The zip codec rejected an archive or one of its entries.
    #[error("Archive error in {}: {source}", archive.display())]
    Archive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The rewritten archive could not replace the original file.
    #[error("Failed to replace {}: {source}", archive.display())]
    Persist {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Wrap a codec error with the archive it came from.
    pub fn archive(archive: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Error::Archive {
            archive: archive.into(),
            source,
        }
    }

    /// The exit code the command-line tool reports for this error.
    ///
    /// Errors that carry an operating system error number report that number;
    /// everything else reports 1.
    pub fn exit_code(&self) -> i32 {
        let os_error = match self {
            Error::Io(e) | Error::Persist { source: e, .. } => e.raw_os_error(),
            Error::Archive {
                source: zip::result::ZipError::Io(e),
                ..
            } => e.raw_os_error(),
            _ => None,
        };

        match os_error {
            Some(code) if code != 0 => code,
            _ => 1,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
