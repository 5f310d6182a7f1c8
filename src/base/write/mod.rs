// Copyright (c) 2021-2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports writing stored, unencrypted ZIP files.
//!
//! Every entry is streamed: its local file header carries a null CRC and the data is followed by a data descriptor.
//! The archive never contains zip64 structures; an entry or archive needing them is rejected.
//!
//! # Example
//! ```no_run
//! # use async_zip_decrypt::{Compression, ZipEntryBuilder, base::write::ZipFileWriter};
//! # use async_zip_decrypt::error::ZipError;
//! # use futures_lite::io::AsyncWriteExt;
//! #
//! # async fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(Vec::<u8>::new());
//!
//! let data = b"This is an example file.";
//! let opts = ZipEntryBuilder::new(String::from("bar.txt").into(), Compression::Stored);
//!
//! let mut entry_writer = writer.write_entry_stream(opts).await?;
//! entry_writer.write_all(data).await.map_err(ZipError::DownstreamWriteError)?;
//!
//! entry_writer.close().await?;
//! writer.close().await?;
//! #   Ok(())
//! # }
//! ```

pub(crate) mod entry_stream;
pub(crate) mod io;

pub use entry_stream::EntryStreamWriter;

#[cfg(feature = "tokio")]
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::entry::ZipEntry;
use crate::error::{Result, Zip64ErrorCase, ZipError};
use crate::spec::consts::{CDH_SIGNATURE, EOCDR_SIGNATURE, NON_ZIP64_MAX_SIZE};
use crate::spec::header::{CentralDirectoryRecord, EndOfCentralDirectoryHeader};

use io::offset::AsyncOffsetWriter;

use futures_lite::io::{AsyncWrite, AsyncWriteExt};

pub(crate) struct CentralDirectoryEntry {
    pub header: CentralDirectoryRecord,
    pub entry: ZipEntry,
}

/// A ZIP file writer which acts over AsyncWrite implementers.
///
/// # Note
/// - [`ZipFileWriter::close()`] must be called before a writer goes out of scope.
pub struct ZipFileWriter<W> {
    pub(crate) writer: AsyncOffsetWriter<W>,
    pub(crate) cd_entries: Vec<CentralDirectoryEntry>,
}

impl<W: AsyncWrite + Unpin> ZipFileWriter<W> {
    /// Construct a new ZIP file writer from a writer.
    pub fn new(writer: W) -> Self {
        Self { writer: AsyncOffsetWriter::new(writer), cd_entries: Vec::new() }
    }

    /// Write an entry via streaming (ie. using a data descriptor).
    ///
    /// If the entry declares an uncompressed size, the local file header carries it and the number of bytes written
    /// must match it when the entry is closed.
    pub async fn write_entry_stream<E: Into<ZipEntry>>(&mut self, entry: E) -> Result<EntryStreamWriter<'_, W>> {
        EntryStreamWriter::from_raw(self, entry.into()).await
    }

    /// Returns the number of entries written so far.
    pub fn len(&self) -> usize {
        self.cd_entries.len()
    }

    /// Returns whether no entries have been written.
    pub fn is_empty(&self) -> bool {
        self.cd_entries.is_empty()
    }

    /// Consumes this ZIP writer and completes all closing tasks.
    ///
    /// This includes:
    /// - Writing all central directory headers.
    /// - Writing the end of central directory header.
    ///
    /// Failure to call this function before going out of scope would result in a corrupted ZIP file.
    pub async fn close(mut self) -> Result<W> {
        let cd_offset = self.writer.offset();

        for entry in &self.cd_entries {
            write_all(&mut self.writer, &CDH_SIGNATURE.to_le_bytes()).await?;
            write_all(&mut self.writer, &entry.header.as_slice()).await?;
            write_all(&mut self.writer, entry.entry.filename().as_bytes()).await?;
        }

        let central_directory_size = self.writer.offset() - cd_offset;
        if cd_offset > NON_ZIP64_MAX_SIZE as u64 || self.writer.offset() > NON_ZIP64_MAX_SIZE as u64 {
            return Err(ZipError::Zip64Needed(Zip64ErrorCase::LargeFile));
        }

        let num_entries: u16 =
            self.cd_entries.len().try_into().map_err(|_| ZipError::Zip64Needed(Zip64ErrorCase::TooManyFiles))?;

        let header = EndOfCentralDirectoryHeader {
            disk_num: 0,
            start_cent_dir_disk: 0,
            num_of_entries_disk: num_entries,
            num_of_entries: num_entries,
            size_cent_dir: central_directory_size as u32,
            cent_dir_offset: cd_offset as u32,
            file_comm_length: 0,
        };

        write_all(&mut self.writer, &EOCDR_SIGNATURE.to_le_bytes()).await?;
        write_all(&mut self.writer, &header.as_slice()).await?;
        self.writer.flush().await.map_err(ZipError::DownstreamWriteError)?;

        tracing::debug!(entries = num_entries, size = self.writer.offset(), "closed archive");

        Ok(self.writer.into_inner())
    }
}

#[cfg(feature = "tokio")]
impl<W> ZipFileWriter<Compat<W>>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    /// Construct a new ZIP file writer from a tokio writer.
    pub fn with_tokio(writer: W) -> Self {
        Self::new(writer.compat_write())
    }
}

/// Writes a whole buffer, reporting failures as downstream write errors.
pub(crate) async fn write_all<W: AsyncWrite + Unpin>(writer: &mut W, buffer: &[u8]) -> Result<()> {
    writer.write_all(buffer).await.map_err(ZipError::DownstreamWriteError)
}
