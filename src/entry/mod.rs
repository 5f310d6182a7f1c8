// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub mod builder;

use crate::date::ZipDateTime;
use crate::spec::{Compression, Encryption};
use crate::string::ZipString;

pub use builder::ZipEntryBuilder;

/// An immutable store of data about a ZIP entry, as found within its local file header.
///
/// This type cannot be directly constructed so instead, the [`ZipEntryBuilder`] must be used. Internally this builder
/// stores a [`ZipEntry`] so conversions between these two types via the [`From`] implementations will be
/// non-allocating.
#[derive(Clone, Debug)]
pub struct ZipEntry {
    pub(crate) filename: ZipString,
    pub(crate) compression: Compression,
    pub(crate) encryption: Encryption,
    pub(crate) crc32: u32,
    pub(crate) uncompressed_size: Option<u64>,
    pub(crate) compressed_size: Option<u64>,
    pub(crate) data_descriptor: bool,
    pub(crate) zip64: bool,
    pub(crate) last_modification_date: ZipDateTime,
}

impl From<ZipEntryBuilder> for ZipEntry {
    fn from(builder: ZipEntryBuilder) -> Self {
        builder.0
    }
}

impl ZipEntry {
    pub(crate) fn new(filename: ZipString, compression: Compression) -> Self {
        ZipEntry {
            filename,
            compression,
            encryption: Encryption::None,
            crc32: 0,
            uncompressed_size: None,
            compressed_size: None,
            data_descriptor: false,
            zip64: false,
            last_modification_date: ZipDateTime::default(),
        }
    }

    /// Returns the entry's filename.
    ///
    /// ## Note
    /// This will return the raw filename stored during ZIP creation. If calling this method on entries retrieved from
    /// untrusted ZIP files, the filename should be sanitised before being used as a path to prevent [directory
    /// traversal attacks](https://en.wikipedia.org/wiki/Directory_traversal_attack).
    pub fn filename(&self) -> &ZipString {
        &self.filename
    }

    /// Returns the entry's compression method.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the cipher scheme protecting the entry's data.
    pub fn encryption(&self) -> Encryption {
        self.encryption
    }

    /// Returns the entry's CRC32 value.
    ///
    /// For entries written with a data descriptor this is only known once the entry's data has been fully read.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Returns the entry's uncompressed size, if it was declared up front.
    pub fn uncompressed_size(&self) -> Option<u64> {
        self.uncompressed_size
    }

    /// Returns the entry's compressed size (including any encryption header), if it was declared up front.
    pub fn compressed_size(&self) -> Option<u64> {
        self.compressed_size
    }

    /// Returns whether the entry's CRC & sizes trail its data within a data descriptor.
    pub fn data_descriptor(&self) -> bool {
        self.data_descriptor
    }

    /// Returns the entry's last modification time & date.
    pub fn last_modification_date(&self) -> &ZipDateTime {
        &self.last_modification_date
    }

    /// Returns whether or not the entry represents a directory.
    pub fn dir(&self) -> bool {
        self.filename.as_bytes().ends_with(b"/")
    }
}
