// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Correlation of the units unpacked from a single archive.
//!
//! Grouping happens in two passes. While entries are unpacked, [`FragmentGroup::assign()`] stamps each unit with the
//! group's identifier and the next index. Once every unit is known, [`FragmentGroup::finalize()`] back-fills the total
//! count and [`FragmentGroup::copy_to_original()`] mirrors it onto the archive's own attributes.

use crate::unit::{attr, Attributes, OutputUnit};

use uuid::Uuid;

const ZIP_EXTENSION: &str = ".zip";

/// The grouping state of the units derived from one archive.
#[derive(Debug)]
pub struct FragmentGroup {
    identifier: String,
    assigned: usize,
}

impl FragmentGroup {
    /// Creates a group with a newly generated random identifier.
    pub fn new() -> Self {
        Self { identifier: Uuid::new_v4().to_string(), assigned: 0 }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Stamps a unit's attributes with the group identifier and the next 1-based index.
    pub fn assign(&mut self, attributes: &mut Attributes) {
        self.assigned += 1;
        attributes.insert(attr::FRAGMENT_ID.to_owned(), self.identifier.clone());
        attributes.insert(attr::FRAGMENT_INDEX.to_owned(), self.assigned.to_string());
    }

    /// Writes the total count & original filename onto every unit, returning the count.
    ///
    /// Nothing is written, and `None` returned, if any unit lacks an index.
    pub fn finalize<W>(&self, units: &mut [OutputUnit<W>], original_filename: Option<&str>) -> Option<usize> {
        if let Some(position) = units.iter().position(|unit| unit.attribute(attr::FRAGMENT_INDEX).is_none()) {
            tracing::warn!(group = %self.identifier, position, "unit is missing a fragment index, skipping finalization");
            return None;
        }

        let count = units.len().to_string();
        let original_filename = original_filename.map(strip_zip_extension);

        for unit in units.iter_mut() {
            let attributes = unit.attributes_mut();
            attributes.insert(attr::FRAGMENT_COUNT.to_owned(), count.clone());

            if let Some(original_filename) = original_filename {
                attributes.insert(attr::SEGMENT_ORIGINAL_FILENAME.to_owned(), original_filename.to_owned());
            }
        }

        Some(units.len())
    }

    /// Writes the group identifier, total count & original filename onto the archive's own attributes.
    pub fn copy_to_original(&self, original: &mut Attributes, count: usize) {
        original.insert(attr::FRAGMENT_ID.to_owned(), self.identifier.clone());
        original.insert(attr::FRAGMENT_COUNT.to_owned(), count.to_string());

        if let Some(filename) = original.get(attr::FILENAME) {
            let stripped = strip_zip_extension(filename).to_owned();
            original.insert(attr::SEGMENT_ORIGINAL_FILENAME.to_owned(), stripped);
        }
    }
}

impl Default for FragmentGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes a single trailing `.zip` from a filename.
pub(crate) fn strip_zip_extension(filename: &str) -> &str {
    filename.strip_suffix(ZIP_EXTENSION).unwrap_or(filename)
}
