//! # cpzip
//!
//! This library copies a file into a zip archive at a path that may cross
//! archives nested inside the archive, such as placing `photo.png` in the
//! `new/` folder of `christmas/this_year.zip`, itself stored in `photos.zip`.
//! It backs the `cpzip` command-line tool.
//!
//! ## Quick Example
//!
//! ```no_run
//! use cpzip::archive::Backend;
//! use cpzip::config::InsertOptions;
//! use cpzip::mutator::NestedMutator;
//! use std::path::Path;
//!
//! let codec = Backend::Rewrite.codec();
//! let mutator = NestedMutator::new(codec.as_ref(), InsertOptions::new().no_overwrite(true));
//! mutator
//!     .insert(
//!         Path::new("photo.png"),
//!         Path::new("photos.zip"),
//!         "christmas/this_year.zip/new",
//!     )
//!     .unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! - **Paths (`path`)**: splits the target path into segments and tracks the
//!   entry name accumulated while walking it.
//! - **Archive access (`archive`)**: the interface for opening, reading and
//!   rewriting one archive file, with two zip back-ends.
//! - **Resolution (`resolver`)**: decides whether a segment names a directory
//!   entry or a nested archive.
//! - **Staging (`staging`)**: scoped temporary files for extracted nested
//!   archives.
//! - **Insertion (`mutator`)**: the recursive walk that stages, mutates and
//!   writes back nested archives, then inserts the file.
//! - **Batches (`batch`)**: wildcard expansion and independent processing of
//!   every source and target pair.

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod mutator;
pub mod output;
pub mod path;
pub mod resolver;
pub mod staging;

#[cfg(test)]
mod path_proptest;

pub use config::InsertOptions;
pub use error::{Error, Result};
pub use mutator::NestedMutator;
