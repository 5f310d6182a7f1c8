// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::io::offset::AsyncOffsetWriter;
use crate::base::write::{write_all, CentralDirectoryEntry, ZipFileWriter};
use crate::entry::ZipEntry;
use crate::error::{Result, Zip64ErrorCase, ZipError};
use crate::spec::consts::{DATA_DESCRIPTOR_SIGNATURE, LFH_SIGNATURE, NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE};
use crate::spec::header::{CentralDirectoryRecord, GeneralPurposeFlag, LocalFileHeader};
use crate::string::StringEncoding;

use std::io::Error;
use std::pin::Pin;
use std::task::{Context, Poll};

use crc32fast::Hasher;
use futures_lite::io::AsyncWrite;

// MS-DOS directory attribute.
const DIRECTORY_ATTRIBUTE: u32 = 0x10;

/// An entry writer which supports the streaming of data.
///
/// # Note
/// - This writer cannot be manually constructed; instead, use [`ZipFileWriter::write_entry_stream()`].
/// - [`EntryStreamWriter::close()`] must be called before a stream writer goes out of scope.
/// - Utilities for working with [`AsyncWrite`] values are provided by [`AsyncWriteExt`](futures_lite::io::AsyncWriteExt).
pub struct EntryStreamWriter<'b, W: AsyncWrite + Unpin> {
    writer: &'b mut AsyncOffsetWriter<W>,
    cd_entries: &'b mut Vec<CentralDirectoryEntry>,
    entry: ZipEntry,
    hasher: Hasher,
    lfh: LocalFileHeader,
    lfh_offset: u64,
    data_offset: u64,
}

impl<'b, W: AsyncWrite + Unpin> EntryStreamWriter<'b, W> {
    pub(crate) async fn from_raw(writer: &'b mut ZipFileWriter<W>, entry: ZipEntry) -> Result<EntryStreamWriter<'b, W>> {
        if writer.cd_entries.len() >= NON_ZIP64_MAX_NUM_FILES as usize {
            return Err(ZipError::Zip64Needed(Zip64ErrorCase::TooManyFiles));
        }

        let lfh_offset = writer.writer.offset();
        if lfh_offset > NON_ZIP64_MAX_SIZE as u64 {
            return Err(ZipError::Zip64Needed(Zip64ErrorCase::LargeFile));
        }

        let lfh = EntryStreamWriter::write_lfh(&mut writer.writer, &entry).await?;
        let data_offset = writer.writer.offset();

        Ok(EntryStreamWriter {
            writer: &mut writer.writer,
            cd_entries: &mut writer.cd_entries,
            entry,
            lfh,
            lfh_offset,
            data_offset,
            hasher: Hasher::new(),
        })
    }

    async fn write_lfh(writer: &mut AsyncOffsetWriter<W>, entry: &ZipEntry) -> Result<LocalFileHeader> {
        let declared_size = match entry.uncompressed_size {
            Some(size) => size.try_into().map_err(|_| ZipError::Zip64Needed(Zip64ErrorCase::LargeFile))?,
            None => 0,
        };

        let filename = entry.filename();
        let lfh = LocalFileHeader {
            compressed_size: declared_size,
            uncompressed_size: declared_size,
            compression: entry.compression().into(),
            crc: 0,
            extra_field_length: 0,
            file_name_length: filename.as_bytes().len().try_into().map_err(|_| ZipError::FileNameTooLarge)?,
            mod_time: entry.last_modification_date().time,
            mod_date: entry.last_modification_date().date,
            version: crate::spec::version::as_needed_to_extract(entry),
            flags: GeneralPurposeFlag {
                data_descriptor: true,
                encrypted: false,
                strong_encryption: false,
                filename_unicode: filename.encoding() == StringEncoding::Utf8 && !filename.as_bytes().is_ascii(),
            },
        };

        write_all(writer, &LFH_SIGNATURE.to_le_bytes()).await?;
        write_all(writer, &lfh.as_slice()).await?;
        write_all(writer, filename.as_bytes()).await?;

        Ok(lfh)
    }

    /// Consumes this entry writer and completes all closing tasks.
    ///
    /// This includes:
    /// - Finalising the CRC32 hash value for the written data.
    /// - Checking the written size against the size declared in the local file header.
    /// - Writing the data descriptor.
    /// - Pushing a central directory header to the [`ZipFileWriter`]'s store.
    ///
    /// Failure to call this function before going out of scope would result in a corrupted ZIP file.
    pub async fn close(self) -> Result<()> {
        let crc = self.hasher.finalize();
        let size = self.writer.offset() - self.data_offset;

        if let Some(expected) = self.entry.uncompressed_size {
            if expected != size {
                return Err(ZipError::RepackSizeMismatch { expected, actual: size });
            }
        }

        let size: u32 = size.try_into().map_err(|_| ZipError::Zip64Needed(Zip64ErrorCase::LargeFile))?;

        write_all(self.writer, &DATA_DESCRIPTOR_SIGNATURE.to_le_bytes()).await?;
        write_all(self.writer, &crc.to_le_bytes()).await?;
        write_all(self.writer, &size.to_le_bytes()).await?;
        write_all(self.writer, &size.to_le_bytes()).await?;

        let cdh = CentralDirectoryRecord {
            compressed_size: size,
            uncompressed_size: size,
            crc,
            v_made_by: crate::spec::version::as_made_by(),
            v_needed: self.lfh.version,
            compression: self.lfh.compression,
            extra_field_length: 0,
            file_name_length: self.lfh.file_name_length,
            file_comment_length: 0,
            mod_time: self.lfh.mod_time,
            mod_date: self.lfh.mod_date,
            flags: self.lfh.flags,
            disk_start: 0,
            inter_attr: 0,
            exter_attr: if self.entry.dir() { DIRECTORY_ATTRIBUTE } else { 0 },
            lh_offset: self.lfh_offset as u32,
        };

        self.cd_entries.push(CentralDirectoryEntry { header: cdh, entry: self.entry });
        Ok(())
    }
}

impl<'a, W: AsyncWrite + Unpin> AsyncWrite for EntryStreamWriter<'a, W> {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context, buf: &[u8]) -> Poll<std::result::Result<usize, Error>> {
        let poll = Pin::new(&mut *self.writer).poll_write(cx, buf);

        if let Poll::Ready(Ok(written)) = poll {
            self.hasher.update(&buf[0..written]);
        }

        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<std::result::Result<(), Error>> {
        Pin::new(&mut *self.writer).poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<std::result::Result<(), Error>> {
        Pin::new(&mut *self.writer).poll_close(cx)
    }
}
