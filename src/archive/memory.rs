//! Archive back-end that holds every entry in memory.
//!
//! All entries are decompressed when the archive is opened. Committing encodes
//! a fresh archive from the in-memory entries, each with its recorded
//! compression method, timestamp and permissions.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{
    file_options, open_zip, replace_archive, ArchiveCodec, ArchiveHandle, Compression, Entry,
    EntryKind,
};
use crate::error::{Error, Result};

/// Codec producing [`MemoryArchive`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryCodec;

impl ArchiveCodec for MemoryCodec {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveHandle>> {
        Ok(Box::new(MemoryArchive::open(path)?))
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    entry: Entry,
    data: Vec<u8>,
}

/// A fully loaded archive.
#[derive(Debug)]
pub struct MemoryArchive {
    path: PathBuf,
    comment: Vec<u8>,
    entries: Vec<MemoryEntry>,
}

impl MemoryArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let mut archive = open_zip(path)?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::archive(path, e))?;
            let name = file.name().to_string();
            // The declared size is untrusted; let the buffer grow as data arrives.
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            entries.push(MemoryEntry {
                entry: Entry {
                    kind: EntryKind::of(&name),
                    compression: Compression::from_method(file.compression()),
                    size: data.len() as u64,
                    modified: file.last_modified(),
                    unix_mode: file.unix_mode(),
                    name,
                },
                data,
            });
        }

        debug!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            comment: archive.comment().to_vec(),
            entries,
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.entry.name == name)
    }

    fn not_found(&self, name: &str) -> Error {
        Error::EntryNotFound {
            archive: self.path.clone(),
            entry: name.to_string(),
        }
    }
}

impl ArchiveHandle for MemoryArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry(&self, name: &str) -> Option<Entry> {
        self.position(name).map(|i| self.entries[i].entry.clone())
    }

    fn extract_to(&mut self, name: &str, destination: &Path) -> Result<u64> {
        let position = self.position(name).ok_or_else(|| self.not_found(name))?;
        let data = &self.entries[position].data;
        fs::write(destination, data)?;
        Ok(data.len() as u64)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let position = self.position(name).ok_or_else(|| self.not_found(name))?;
        self.entries.remove(position);
        Ok(())
    }

    fn add_from_file(
        &mut self,
        name: &str,
        source: &Path,
        compression: Option<Compression>,
    ) -> Result<()> {
        let mut entry = Entry::from_file(name, compression, &fs::metadata(source)?);
        let data = fs::read(source)?;
        entry.size = data.len() as u64;
        let added = MemoryEntry { entry, data };

        match self.position(name) {
            Some(position) => self.entries[position] = added,
            None => self.entries.push(added),
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let path = self.path.clone();

        replace_archive(&path, &self.comment, |writer| {
            for item in &self.entries {
                let options = file_options(&item.entry);
                match item.entry.kind {
                    EntryKind::Directory => writer
                        .add_directory(item.entry.name.as_str(), options)
                        .map_err(|e| Error::archive(&path, e))?,
                    EntryKind::File => {
                        writer
                            .start_file(item.entry.name.as_str(), options)
                            .map_err(|e| Error::archive(&path, e))?;
                        writer.write_all(&item.data)?;
                    }
                }
            }
            Ok(())
        })?;

        debug!("Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}
