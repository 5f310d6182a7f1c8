// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The archive operations offered per cipher scheme.

use crate::base::read::stream::ZipFileReader;
use crate::error::{Result, ZipError};
use crate::filter::EntryFilter;
use crate::fragment::FragmentGroup;
use crate::repack::RepackSummary;
use crate::spec::encryption::Password;
use crate::unit::{attr, Attributes, ContentSink, OutputUnit, APPLICATION_ZIP};

use futures_lite::io::{AsyncRead, AsyncWrite};

/// A cipher scheme protecting the archives being processed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Traditional PKWARE encryption.
    #[default]
    Pkware,
}

/// The archive operations for a single cipher scheme, bound to a password.
#[derive(Debug)]
pub enum ArchiveCodec {
    Pkware(PkwareCodec),
}

/// Operations over archives protected with traditional PKWARE encryption.
#[derive(Debug)]
pub struct PkwareCodec {
    password: Password,
}

impl ArchiveCodec {
    /// Binds a scheme to a password.
    ///
    /// Fails with [`ZipError::EmptyPassword`] before any archive is touched.
    pub fn new(scheme: Scheme, password: Password) -> Result<Self> {
        if password.is_empty() {
            return Err(ZipError::EmptyPassword);
        }

        match scheme {
            Scheme::Pkware => Ok(ArchiveCodec::Pkware(PkwareCodec { password })),
        }
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            ArchiveCodec::Pkware(_) => Scheme::Pkware,
        }
    }

    /// Decrypts an archive into a stored, unencrypted archive written to `writer`.
    ///
    /// Every entry is carried over; filtering only applies to [`ArchiveCodec::unpack()`].
    pub async fn decrypt<R, W>(&self, reader: R, writer: W) -> Result<(W, RepackSummary)>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        match self {
            ArchiveCodec::Pkware(codec) => {
                crate::repack::repack(codec.reader(reader), writer).await
            }
        }
    }

    /// Updates the attributes of an archive produced by [`ArchiveCodec::decrypt()`].
    pub fn update_attributes(&self, attributes: &mut Attributes) {
        match self {
            ArchiveCodec::Pkware(_) => {
                attributes.insert(attr::MIME_TYPE.to_owned(), APPLICATION_ZIP.to_owned());
            }
        }
    }

    /// Decrypts an archive into one output unit per selected file entry.
    pub async fn unpack<R, S>(
        &self,
        reader: R,
        sink: &mut S,
        filter: &EntryFilter,
        group: &mut FragmentGroup,
        inherited: &Attributes,
    ) -> Result<Vec<OutputUnit<S::Writer>>>
    where
        R: AsyncRead + Unpin,
        S: ContentSink,
    {
        match self {
            ArchiveCodec::Pkware(codec) => {
                crate::split::split(codec.reader(reader), sink, filter, group, inherited).await
            }
        }
    }
}

impl PkwareCodec {
    fn reader<R: AsyncRead + Unpin>(&self, reader: R) -> ZipFileReader<crate::base::read::stream::Ready<R>> {
        ZipFileReader::with_password(reader, self.password.clone())
    }
}
