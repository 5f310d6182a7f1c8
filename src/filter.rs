// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Selection of the file entries which are unpacked or repacked.

use crate::entry::ZipEntry;
use crate::error::Result;

use regex::Regex;

/// The pattern used when no filter is configured.
pub const MATCH_ALL: &str = ".*";

/// A compiled file-name filter.
///
/// A file entry is selected when the pattern matches anywhere within its name (the pattern is not anchored).
/// Directory entries are never selected.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pattern: Regex,
}

impl EntryFilter {
    /// Compiles a filter from a regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self { pattern: Regex::new(pattern)? })
    }

    /// Returns whether the entry is a file whose name matches this filter.
    pub fn matches(&self, entry: &ZipEntry) -> bool {
        !entry.dir() && self.matches_name(&entry.filename().to_string_lossy())
    }

    /// Returns whether the pattern matches anywhere within a name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Returns the source pattern of this filter.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self { pattern: Regex::new(MATCH_ALL).expect("the match-all pattern is a valid regular expression") }
    }
}
