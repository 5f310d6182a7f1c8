// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Re-emission of an archive's decrypted entries as a stored, unencrypted archive.

use crate::base::read::stream::{Ready, ZipFileReader};
use crate::base::write::ZipFileWriter;
use crate::entry::ZipEntryBuilder;
use crate::error::{Result, ZipError};
use crate::spec::Compression;

use futures_lite::io::{AsyncRead, AsyncWrite};

/// What a repack carried over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepackSummary {
    /// The number of file entries written.
    pub files: usize,
    /// The number of directory entries written.
    pub directories: usize,
    /// The total number of payload bytes copied.
    pub bytes: u64,
}

/// Copies every entry of an archive into a new archive written to `writer`.
///
/// Entries keep their names & modification dates but are written stored and unencrypted. The archive is only
/// closed (ie. its central directory written) once every entry has been copied, so a failure never leaves a
/// complete-looking archive behind. An archive without any entry is an [`ZipError::EmptyArchive`].
#[tracing::instrument(skip_all)]
pub async fn repack<R, W>(mut reader: ZipFileReader<Ready<R>>, writer: W) -> Result<(W, RepackSummary)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut writer = ZipFileWriter::new(writer);
    let mut summary = RepackSummary::default();

    while let Some(mut entry) = reader.next_with_entry().await? {
        let source = entry.entry();
        let directory = source.dir();

        let mut builder = ZipEntryBuilder::new(source.filename().clone(), Compression::Stored)
            .last_modification_date(*source.last_modification_date());
        if let Some(size) = source.uncompressed_size() {
            builder = builder.uncompressed_size(size);
        }

        let mut entry_writer = writer.write_entry_stream(builder).await?;
        let copied = crate::utils::copy(entry.reader(), &mut entry_writer).await?;
        reader = entry.done().await?;
        entry_writer.close().await?;

        if directory {
            summary.directories += 1;
        } else {
            summary.files += 1;
        }
        summary.bytes += copied;
    }

    if summary.files == 0 && summary.directories == 0 {
        return Err(ZipError::EmptyArchive);
    }

    let mut inner = writer.close().await?;
    futures_lite::io::AsyncWriteExt::close(&mut inner).await.map_err(ZipError::DownstreamWriteError)?;

    tracing::debug!(files = summary.files, directories = summary.directories, bytes = summary.bytes, "repacked archive");
    Ok((inner, summary))
}
