// Copyright (c) 2022-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading ZIP files.

pub mod stream;

pub(crate) mod io;

// Re-exported as part of the public API.
pub use crate::base::read::io::entry::ZipEntryReader;

use crate::date::ZipDateTime;
use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::spec::consts::{CDH_SIGNATURE, DATA_DESCRIPTOR_SIGNATURE, EOCDR_SIGNATURE, LFH_SIGNATURE};
use crate::spec::header::{ExtraField, InfoZipUnicodePathExtraField, LocalFileHeader};
use crate::spec::parse::parse_extra_fields;
use crate::spec::{Compression, Encryption};
use crate::string::{StringEncoding, ZipString};

use futures_lite::io::{AsyncRead, AsyncReadExt};

/// The values which trail an entry's data when its local file header deferred them.
///
/// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#439
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DataDescriptor {
    pub(crate) crc: u32,
    pub(crate) compressed_size: u64,
    pub(crate) uncompressed_size: u64,
}

/// Reads the next local file header, returning `None` once the central directory (or an empty archive's end of
/// central directory record) has been reached.
pub(crate) async fn lfh<R>(mut reader: R) -> Result<Option<ZipEntry>>
where
    R: AsyncRead + Unpin,
{
    match crate::utils::read_u32(&mut reader).await? {
        actual if actual == LFH_SIGNATURE => (),
        actual if actual == CDH_SIGNATURE || actual == EOCDR_SIGNATURE => return Ok(None),
        actual => return Err(ZipError::UnexpectedHeaderError(actual, LFH_SIGNATURE)),
    };

    let header = LocalFileHeader::from_reader(&mut reader).await?;
    let filename_basic = io::read_bytes(&mut reader, header.file_name_length.into()).await?;
    let encryption = Encryption::detect(&header.flags, header.compression)?;
    let compression = Compression::try_from(header.compression)?;
    let extra_field = io::read_bytes(&mut reader, header.extra_field_length.into()).await?;
    let extra_fields = parse_extra_fields(extra_field, header.uncompressed_size, header.compressed_size)?;

    let zip64_extra_field = extra_fields.iter().find_map(|field| match field {
        ExtraField::Zip64ExtendedInformation(zip64) => Some(zip64),
        _ => None,
    });

    let mut uncompressed_size = header.uncompressed_size as u64;
    let mut compressed_size = header.compressed_size as u64;
    if let Some(zip64) = zip64_extra_field {
        uncompressed_size = zip64.uncompressed_size.unwrap_or(uncompressed_size);
        compressed_size = zip64.compressed_size.unwrap_or(compressed_size);
    }

    let deferred = header.flags.data_descriptor && compressed_size == 0;
    let (uncompressed_size, compressed_size) = match (deferred, compression, encryption) {
        (false, _, _) => (Some(uncompressed_size), Some(compressed_size)),
        // The decoder finds the end of the data itself.
        #[cfg(feature = "deflate")]
        (true, Compression::Deflate, _) => (None, None),
        // Only an empty entry can be stored with its size deferred; anything else has no detectable end.
        (true, Compression::Stored, Encryption::None) => (None, Some(0)),
        (true, Compression::Stored, Encryption::ZipCrypto) => {
            return Err(ZipError::FeatureNotSupported("encrypted stored entries with a deferred size"))
        }
    };

    let filename = detect_filename(filename_basic, header.flags.filename_unicode, &extra_fields);

    Ok(Some(ZipEntry {
        filename,
        compression,
        encryption,
        crc32: header.crc,
        uncompressed_size,
        compressed_size,
        data_descriptor: header.flags.data_descriptor,
        zip64: zip64_extra_field.is_some(),
        last_modification_date: ZipDateTime { date: header.mod_date, time: header.mod_time },
    }))
}

/// Reads a data descriptor, whose signature is optional, directly following an entry's data.
pub(crate) async fn data_descriptor<R>(mut reader: R, zip64: bool) -> Result<DataDescriptor>
where
    R: AsyncRead + Unpin,
{
    let mut crc = crate::utils::read_u32(&mut reader).await?;
    if crc == DATA_DESCRIPTOR_SIGNATURE {
        crc = crate::utils::read_u32(&mut reader).await?;
    }

    let (compressed_size, uncompressed_size) = if zip64 {
        (crate::utils::read_u64(&mut reader).await?, crate::utils::read_u64(&mut reader).await?)
    } else {
        (crate::utils::read_u32(&mut reader).await?.into(), crate::utils::read_u32(&mut reader).await?.into())
    };

    Ok(DataDescriptor { crc, compressed_size, uncompressed_size })
}

fn detect_filename(basic: Vec<u8>, basic_is_utf8: bool, extra_fields: &[ExtraField]) -> ZipString {
    if basic_is_utf8 {
        return ZipString::new(basic, StringEncoding::Utf8);
    }

    let unicode_extra = extra_fields.iter().find_map(|field| match field {
        ExtraField::InfoZipUnicodePath(InfoZipUnicodePathExtraField::V1 { crc32, unicode })
            if *crc32 == crc32fast::hash(&basic) =>
        {
            String::from_utf8(unicode.clone()).ok()
        }
        _ => None,
    });

    match unicode_extra {
        Some(unicode) => ZipString::from(unicode),
        // Do not treat as UTF-8 if UTF-8 flags are not set,
        // some string in MBCS may be valid UTF-8 in form, but they are not in truth.
        None if basic.is_ascii() => ZipString::new(basic, StringEncoding::Utf8),
        None => ZipString::new(basic, StringEncoding::Raw),
    }
}
