//! Archive back-end that rewrites the archive on commit.
//!
//! The original archive stays open for reading while changes are recorded.
//! Committing streams a new archive into a temporary file beside the original:
//! unchanged entries are raw-copied with their compressed bytes intact, added
//! entries are read from their source files. The temporary file then replaces
//! the original.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use zip::ZipArchive;

use super::{
    file_options, open_zip, replace_archive, ArchiveCodec, ArchiveHandle, Compression, Entry,
    EntryKind,
};
use crate::error::{Error, Result};

/// Codec producing [`RewriteArchive`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteCodec;

impl ArchiveCodec for RewriteCodec {
    fn name(&self) -> &'static str {
        "rewrite"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveHandle>> {
        Ok(Box::new(RewriteArchive::open(path)?))
    }
}

/// Where the bytes of an entry come from at commit time.
#[derive(Debug, Clone)]
enum Content {
    /// Entry at this index of the original archive.
    Original(usize),
    /// A file on disk, compressed when committed.
    File(PathBuf),
}

#[derive(Debug, Clone)]
struct Slot {
    entry: Entry,
    content: Content,
}

/// An archive whose changes are applied by writing a new copy.
pub struct RewriteArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
    comment: Vec<u8>,
    slots: Vec<Slot>,
}

impl RewriteArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let mut archive = open_zip(path)?;
        let mut slots = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| Error::archive(path, e))?;
            let name = file.name().to_string();
            slots.push(Slot {
                entry: Entry {
                    kind: EntryKind::of(&name),
                    compression: Compression::from_method(file.compression()),
                    size: file.size(),
                    modified: file.last_modified(),
                    unix_mode: file.unix_mode(),
                    name,
                },
                content: Content::Original(index),
            });
        }

        debug!("Opened {} with {} entries", path.display(), slots.len());
        Ok(Self {
            path: path.to_path_buf(),
            comment: archive.comment().to_vec(),
            archive,
            slots,
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.entry.name == name)
    }

    fn not_found(&self, name: &str) -> Error {
        Error::EntryNotFound {
            archive: self.path.clone(),
            entry: name.to_string(),
        }
    }
}

impl ArchiveHandle for RewriteArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry(&self, name: &str) -> Option<Entry> {
        self.position(name).map(|i| self.slots[i].entry.clone())
    }

    fn extract_to(&mut self, name: &str, destination: &Path) -> Result<u64> {
        let position = self.position(name).ok_or_else(|| self.not_found(name))?;

        match self.slots[position].content.clone() {
            Content::Original(index) => {
                let mut file = self
                    .archive
                    .by_index(index)
                    .map_err(|e| Error::archive(&self.path, e))?;
                let mut output = File::create(destination)?;
                Ok(io::copy(&mut file, &mut output)?)
            }
            Content::File(source) => Ok(fs::copy(source, destination)?),
        }
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let position = self.position(name).ok_or_else(|| self.not_found(name))?;
        self.slots.remove(position);
        Ok(())
    }

    fn add_from_file(
        &mut self,
        name: &str,
        source: &Path,
        compression: Option<Compression>,
    ) -> Result<()> {
        let entry = Entry::from_file(name, compression, &fs::metadata(source)?);

        match self.position(name) {
            Some(position) => {
                self.slots[position] = Slot {
                    entry,
                    content: Content::File(source.to_path_buf()),
                }
            }
            None => self.slots.push(Slot {
                entry,
                content: Content::File(source.to_path_buf()),
            }),
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let RewriteArchive {
            path,
            mut archive,
            comment,
            slots,
        } = *self;

        replace_archive(&path, &comment, |writer| {
            for slot in &slots {
                match &slot.content {
                    Content::Original(index) => {
                        let file = archive
                            .by_index_raw(*index)
                            .map_err(|e| Error::archive(&path, e))?;
                        writer
                            .raw_copy_file(file)
                            .map_err(|e| Error::archive(&path, e))?;
                    }
                    Content::File(source) => {
                        let options = file_options(&slot.entry);
                        writer
                            .start_file(slot.entry.name.as_str(), options)
                            .map_err(|e| Error::archive(&path, e))?;
                        let mut input = File::open(source)?;
                        io::copy(&mut input, writer)?;
                    }
                }
            }
            Ok(())
        })?;

        debug!("Wrote {} entries to {}", slots.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{names, write_zip};
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::CompressionMethod;

    fn sample(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("sample.zip");
        write_zip(
            &path,
            &[
                ("docs/", "".as_bytes(), CompressionMethod::Stored),
                ("docs/a.txt", "alpha".as_bytes(), CompressionMethod::Deflated),
                ("b.bin", "beta".as_bytes(), CompressionMethod::Stored),
            ],
        );
        path
    }

    #[test]
    fn test_open_lists_entries() {
        let temp_dir = TempDir::new().unwrap();
        let handle = RewriteCodec.open(&sample(&temp_dir)).unwrap();

        assert_eq!(handle.entry("docs/").unwrap().kind, EntryKind::Directory);
        assert_eq!(handle.entry("docs/a.txt").unwrap().kind, EntryKind::File);
        assert_eq!(
            handle.entry("docs/a.txt").unwrap().compression,
            Compression::Deflated
        );
        assert_eq!(handle.entry("b.bin").unwrap().compression, Compression::Stored);
        assert_eq!(handle.entry("b.bin").unwrap().size, 4);
        assert!(handle.entry("docs").is_none());
    }

    #[test]
    fn test_extract_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut handle = RewriteCodec.open(&sample(&temp_dir)).unwrap();
        let out = temp_dir.path().join("out.txt");

        let written = handle.extract_to("docs/a.txt", &out).unwrap();
        assert_eq!(written, 5);
        assert_eq!(fs::read(&out).unwrap(), b"alpha");
    }

    #[test]
    fn test_extract_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let mut handle = RewriteCodec.open(&sample(&temp_dir)).unwrap();
        let result = handle.extract_to("nope", &temp_dir.path().join("out"));
        assert!(matches!(result, Err(Error::EntryNotFound { .. })));
    }

    #[test]
    fn test_changes_apply_only_on_commit() {
        let temp_dir = TempDir::new().unwrap();
        let path = sample(&temp_dir);
        let before = fs::read(&path).unwrap();
        let source = temp_dir.path().join("new.txt");
        fs::write(&source, "gamma").unwrap();

        let mut handle = RewriteCodec.open(&path).unwrap();
        handle.delete("b.bin").unwrap();
        handle
            .add_from_file("docs/new.txt", &source, None)
            .unwrap();
        assert!(handle.entry("b.bin").is_none());
        assert!(handle.entry("docs/new.txt").is_some());
        drop(handle);

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_commit_rewrites_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = sample(&temp_dir);
        let source = temp_dir.path().join("new.txt");
        fs::write(&source, "gamma").unwrap();

        let mut handle = RewriteCodec.open(&path).unwrap();
        handle.delete("b.bin").unwrap();
        handle
            .add_from_file("docs/new.txt", &source, Some(Compression::Stored))
            .unwrap();
        handle.commit().unwrap();

        assert_eq!(names(&path), vec!["docs/", "docs/a.txt", "docs/new.txt"]);

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("docs/a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");

        let added = archive.by_name("docs/new.txt").unwrap();
        assert_eq!(added.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_open_rejects_non_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.zip");
        fs::write(&path, "not a zip").unwrap();

        let result = RewriteCodec.open(&path);
        assert!(matches!(result, Err(Error::Archive { .. })));
    }
}
