//! Logical path decomposition for paths inside archives
//!
//! A target path such as `photos/2024.zip/new` is split on `/` into the segments
//! `photos`, `2024.zip` and `new`. Empty components produced by leading,
//! trailing or doubled separators are dropped.
//!
//! Each [`Segment`] remembers where it ends in the original string so the
//! unconsumed remainder can be sliced off directly. That remainder is what a
//! nested archive receives as its own target path.

/// Separator used by entry names inside an archive.
pub const SEPARATOR: char = '/';

/// A user-supplied path inside an archive, possibly crossing nested archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalPath<'a> {
    raw: &'a str,
}

/// One non-empty component of a [`LogicalPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The component text, never empty and never containing a separator.
    pub name: &'a str,
    /// Byte offset in the original path just past this component.
    pub end: usize,
}

impl<'a> LogicalPath<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// The path exactly as supplied.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Iterate over the non-empty segments in order.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'a>> + 'a {
        let raw = self.raw;
        raw.split(SEPARATOR)
            .scan(0usize, move |offset, name| {
                let start = *offset;
                *offset = start + name.len() + SEPARATOR.len_utf8();
                Some(Segment {
                    name,
                    end: start + name.len(),
                })
            })
            .filter(|segment| !segment.name.is_empty())
    }

    /// The unconsumed part of the path after `segment`.
    ///
    /// The separators following the segment are kept as they were typed.
    pub fn remainder_after(&self, segment: &Segment<'_>) -> LogicalPath<'a> {
        LogicalPath::new(&self.raw[segment.end..])
    }
}

/// Split a path into its non-empty segments.
pub fn decompose(path: &str) -> Vec<&str> {
    LogicalPath::new(path)
        .segments()
        .map(|segment| segment.name)
        .collect()
}

/// The entry name accumulated while walking a [`LogicalPath`].
///
/// Segments are appended without a separator; a trailing separator is added
/// only once a segment has been matched as a directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryName {
    name: String,
}

impl EntryName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment to the accumulated name.
    pub fn push(&mut self, segment: &str) {
        self.name.push_str(segment);
    }

    /// The name as a file-entry candidate.
    pub fn as_file(&self) -> &str {
        &self.name
    }

    /// The name as a directory-entry candidate, with a trailing separator.
    pub fn as_directory(&self) -> String {
        format!("{}{}", self.name, SEPARATOR)
    }

    /// Commit to the directory form of the name.
    pub fn descend(&mut self) {
        self.name.push(SEPARATOR);
    }

    /// The entry name of `file_name` placed under the accumulated prefix.
    pub fn join(&self, file_name: &str) -> String {
        format!("{}{}", self.name, file_name)
    }
}
