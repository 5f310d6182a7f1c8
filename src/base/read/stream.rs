// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A ZIP reader which acts over a non-seekable source.
//!
//! # API Design
//! It's important that the data of an entry is fully read before the proceeding entry is read. This is as a result of
//! not being able to seek forwards or backwards, so we must end up at the start of the next entry.
//!
//! **We encode this invariant within Rust's type system so that it can be enforced at compile time.**
//!
//! This requires that any transition methods between these encoded types consume the reader and provide a new owned
//! reader back.
//!
//! # Considerations
//! As the central directory of a ZIP archive is stored at the end of it, a non-seekable reader doesn't have access
//! to it. We rely on the local file headers and, where present, the data descriptors trailing each entry. This results
//! in:
//! - Stored entries written with a data descriptor only being readable when they're empty.
//! - An entry's CRC & uncompressed size only being verified once its data has been fully read and the entry is closed
//!   via [`ZipFileReader::done()`].
//!
//! # Example
//! ```no_run
//! # use futures_lite::io::Cursor;
//! # use async_zip_decrypt::error::Result;
//! # use async_zip_decrypt::base::read::stream::ZipFileReader;
//! #
//! # async fn run() -> Result<()> {
//! let mut zip = ZipFileReader::with_password(Cursor::new([0; 0]), "secret".into());
//!
//! // Print the name of every file in a ZIP archive.
//! while let Some(entry) = zip.next_with_entry().await? {
//!     println!("File: {}", entry.entry().filename().to_string_lossy());
//!     zip = entry.skip().await?;
//! }
//! #
//! #     Ok(())
//! # }
//! ```

use crate::base::read::io::crypto::{self, DecryptingReader, ZipCryptoReader};
use crate::base::read::io::entry::ZipEntryReader;
use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::spec::consts::ENCRYPTION_HEADER_LENGTH;
use crate::spec::encryption::Password;
use crate::spec::Encryption;

use futures_lite::io::{AsyncRead, AsyncReadExt, BufReader};

#[cfg(feature = "tokio")]
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// A type which encodes that [`ZipFileReader`] is ready to open a new entry.
pub struct Ready<R>(BufReader<R>);

/// A type which encodes that [`ZipFileReader`] is currently reading an entry.
pub struct Reading<R>(ZipEntryReader<R>);

/// A ZIP reader which acts over a non-seekable source.
///
/// See the [module-level docs](.) for more information.
pub struct ZipFileReader<S> {
    state: S,
    password: Option<Password>,
}

impl<R> ZipFileReader<Ready<R>>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a new ZIP reader from a non-seekable source.
    ///
    /// Encrypted entries can't be opened by this reader.
    pub fn new(reader: R) -> Self {
        Self { state: Ready(BufReader::new(reader)), password: None }
    }

    /// Constructs a new ZIP reader from a non-seekable source, decrypting entries with the given password.
    pub fn with_password(reader: R, password: Password) -> Self {
        Self { state: Ready(BufReader::new(reader)), password: Some(password) }
    }

    /// Opens the next entry for reading if the central directory hasn’t yet been reached.
    ///
    /// For an encrypted entry, this reads & verifies its encryption header before returning.
    pub async fn next_with_entry(mut self) -> Result<Option<ZipFileReader<Reading<R>>>> {
        let entry = match crate::base::read::lfh(&mut self.state.0).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let mut body = self.state.0.take(entry.compressed_size.unwrap_or(u64::MAX));
        let reader = match entry.encryption {
            Encryption::None => DecryptingReader::Plain(body),
            Encryption::ZipCrypto => {
                let password = self.password.as_ref().ok_or(ZipError::PasswordRequired)?;

                let mut header = [0; ENCRYPTION_HEADER_LENGTH];
                body.read_exact(&mut header).await?;

                let keys = crypto::decrypt_header(password.as_bytes(), header, &entry)?;
                DecryptingReader::ZipCrypto(ZipCryptoReader::new(body, keys))
            }
        };

        let reader = ZipEntryReader::new(reader, entry);
        Ok(Some(ZipFileReader { state: Reading(reader), password: self.password }))
    }

    /// Consumes the `ZipFileReader` returning the original `reader`.
    pub fn into_inner(self) -> R {
        self.state.0.into_inner()
    }
}

#[cfg(feature = "tokio")]
impl<R> ZipFileReader<Ready<Compat<R>>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    /// Constructs a new ZIP reader from a tokio reader, decrypting entries with the given password.
    pub fn with_tokio(reader: R, password: Password) -> Self {
        Self::with_password(reader.compat(), password)
    }
}

impl<R> ZipFileReader<Reading<R>>
where
    R: AsyncRead + Unpin,
{
    /// Returns a mutable reference to the inner entry reader.
    pub fn reader(&mut self) -> &mut ZipEntryReader<R> {
        &mut self.state.0
    }

    /// Returns the entry currently being read.
    pub fn entry(&self) -> &ZipEntry {
        self.state.0.entry()
    }

    /// Converts the reader back into the Ready state if EOF has been reached.
    ///
    /// The entry's CRC & uncompressed size are verified against what was read, taking them from the entry's data
    /// descriptor where one is present.
    pub async fn done(mut self) -> Result<ZipFileReader<Ready<R>>> {
        if self.state.0.read(&mut [0; 1]).await? != 0 {
            return Err(ZipError::EOFNotReached);
        }

        self.finish().await
    }

    /// Reads until EOF and converts the reader back into the Ready state.
    ///
    /// The skipped data is still verified as per [`ZipFileReader::done()`].
    pub async fn skip(mut self) -> Result<ZipFileReader<Ready<R>>> {
        while self.state.0.read(&mut [0; 2048]).await? != 0 {}
        self.finish().await
    }

    async fn finish(self) -> Result<ZipFileReader<Ready<R>>> {
        let Reading(mut reader) = self.state;
        let crc = reader.compute_hash();
        let read = reader.bytes_read();
        let (mut entry, mut body) = reader.into_parts();

        // A decoder may stop short of the declared compressed size, eg. on trailing padding.
        if entry.compressed_size.is_some() && body.limit() > 0 {
            futures_lite::io::copy(&mut body, &mut futures_lite::io::sink()).await?;

            if body.limit() > 0 {
                let error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "entry data is truncated");
                return Err(ZipError::UpstreamReadError(error));
            }
        }

        let mut inner = body.into_inner();

        if entry.data_descriptor {
            let descriptor = crate::base::read::data_descriptor(&mut inner, entry.zip64).await?;
            entry.crc32 = descriptor.crc;
            entry.compressed_size = Some(descriptor.compressed_size);
            entry.uncompressed_size = Some(descriptor.uncompressed_size);
        }

        if let Some(expected) = entry.uncompressed_size {
            if expected != read {
                return Err(ZipError::SizeMismatch { expected, actual: read });
            }
        }

        if crc != entry.crc32 {
            return Err(ZipError::CRC32CheckError);
        }

        Ok(ZipFileReader { state: Ready(inner), password: self.password })
    }
}
