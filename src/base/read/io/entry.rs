// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::io::{compressed::CompressedReader, crypto::DecryptingReader, hashed::HashedReader};
use crate::entry::ZipEntry;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::io::{AsyncRead, BufReader, Take};
use pin_project::pin_project;

/// A ZIP entry reader which may implement decryption & decompression.
///
/// Data read from this reader is the entry's plaintext. Its integrity is only verified once the entry is closed via
/// [`ZipFileReader::done()`](crate::base::read::stream::ZipFileReader::done).
#[pin_project]
pub struct ZipEntryReader<R> {
    #[pin]
    reader: HashedReader<CompressedReader<DecryptingReader<Take<BufReader<R>>>>>,
    entry: ZipEntry,
}

impl<R> ZipEntryReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a new entry reader over the (possibly decrypting) body of an entry.
    pub(crate) fn new(reader: DecryptingReader<Take<BufReader<R>>>, entry: ZipEntry) -> Self {
        let compression = entry.compression;
        Self { reader: HashedReader::new(CompressedReader::new(reader, compression)), entry }
    }

    /// Returns the entry this reader is reading.
    pub fn entry(&self) -> &ZipEntry {
        &self.entry
    }

    /// Computes and returns the CRC32 hash of bytes read by this reader so far.
    ///
    /// This hash should only be computed once EOF has been reached.
    pub(crate) fn compute_hash(&mut self) -> u32 {
        self.reader.swap_and_compute_hash()
    }

    /// Returns the number of plaintext bytes read so far.
    pub(crate) fn bytes_read(&self) -> u64 {
        self.reader.bytes_read()
    }

    /// Consumes this reader and returns the entry alongside the bounded archive reader.
    pub(crate) fn into_parts(self) -> (ZipEntry, Take<BufReader<R>>) {
        (self.entry, self.reader.into_inner().into_inner().into_inner())
    }
}

impl<R> AsyncRead for ZipEntryReader<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        self.project().reader.poll_read(c, b)
    }
}
