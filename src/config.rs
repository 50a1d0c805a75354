//! Options controlling a copy operation.
//!
//! The options are an explicit value handed to [`crate::mutator::NestedMutator`]
//! and forwarded to every recursion level. Nothing reads them from global state.

/// Behavior switches for inserting a file into an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Fail instead of replacing an entry that already exists.
    pub no_overwrite: bool,
    /// Emit a step-by-step trace of the traversal.
    pub verbose: bool,
}

impl InsertOptions {
    /// Options that replace existing entries silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether existing entries may be replaced.
    pub fn no_overwrite(mut self, no_overwrite: bool) -> Self {
        self.no_overwrite = no_overwrite;
        self
    }

    /// Set whether the traversal is traced.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
