//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures for building zip archives (including
//! archives nested inside archives) and helpers for inspecting them after a
//! copy.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("file.txt", "hello");
//!     // ... test code
//! }
//! ```

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{
        compression_of, entry_content, entry_names, zip_bytes, TestFixture, ZipEntry,
    };
    #[allow(unused_imports)]
    pub use zip::CompressionMethod;
}

/// One entry of an archive built by [`zip_bytes`].
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum ZipEntry {
    /// A directory marker; the name must end with `/`.
    Dir(&'static str),
    /// A file entry with content and compression method.
    File(&'static str, Vec<u8>, CompressionMethod),
}

#[allow(dead_code)]
impl ZipEntry {
    /// A deflated text file.
    pub fn text(name: &'static str, content: &str) -> Self {
        ZipEntry::File(name, content.as_bytes().to_vec(), CompressionMethod::Deflated)
    }

    /// A stored file, typically a nested archive.
    pub fn stored(name: &'static str, content: Vec<u8>) -> Self {
        ZipEntry::File(name, content, CompressionMethod::Stored)
    }
}

/// Build a zip archive in memory.
#[allow(dead_code)]
pub fn zip_bytes(entries: &[ZipEntry]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        match entry {
            ZipEntry::Dir(name) => {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .expect("Failed to add directory");
            }
            ZipEntry::File(name, content, method) => {
                let options = SimpleFileOptions::default().compression_method(*method);
                writer.start_file(*name, options).expect("Failed to start file");
                writer.write_all(content).expect("Failed to write file");
            }
        }
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

fn open(archive: &Path) -> ZipArchive<File> {
    ZipArchive::new(File::open(archive).expect("Failed to open archive"))
        .expect("Failed to read archive")
}

/// Names of all entries in an archive, in archive order.
#[allow(dead_code)]
pub fn entry_names(archive: &Path) -> Vec<String> {
    open(archive).file_names().map(str::to_string).collect()
}

/// Decompressed content of one entry.
#[allow(dead_code)]
pub fn entry_content(archive: &Path, name: &str) -> Vec<u8> {
    let mut archive = open(archive);
    let mut file = archive.by_name(name).expect("Entry not found");
    let mut content = Vec::new();
    file.read_to_end(&mut content).expect("Failed to read entry");
    content
}

/// Declared compression method of one entry.
#[allow(dead_code)]
pub fn compression_of(archive: &Path, name: &str) -> CompressionMethod {
    let mut archive = open(archive);
    let method = archive.by_name(name).expect("Entry not found").compression();
    method
}

/// A test fixture that provides a temporary directory with files and archives.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("photo.png", "png bytes")
///     .with_zip("photos.zip", &[ZipEntry::Dir("christmas/")]);
///
/// let mut cmd = cargo_bin_cmd!("cpzip");
/// cmd.current_dir(fixture.path())
///     .args(["photo.png", "photos.zip", "christmas"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Add a zip archive with the given entries.
    pub fn with_zip(self, path: &str, entries: &[ZipEntry]) -> Self {
        let bytes = zip_bytes(entries);
        self.with_binary_file(path, &bytes)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the full path of a file in the fixture.
    pub fn file(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Read a file in the fixture.
    pub fn read(&self, path: &str) -> Vec<u8> {
        std::fs::read(self.file(path)).expect("Failed to read file")
    }

    /// Extract an entry of an archive in the fixture to a new file and return its path.
    pub fn extract(&self, archive: &str, entry: &str, to: &str) -> PathBuf {
        let content = entry_content(&self.file(archive), entry);
        let path = self.file(to);
        std::fs::write(&path, content).expect("Failed to write extracted entry");
        path
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
