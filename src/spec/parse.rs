// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::spec::consts::{CDH_LENGTH, EOCDR_LENGTH, LFH_LENGTH, NON_ZIP64_MAX_SIZE};
use crate::spec::header::{
    CentralDirectoryRecord, EndOfCentralDirectoryHeader, ExtraField, GeneralPurposeFlag, HeaderId,
    InfoZipUnicodePathExtraField, LocalFileHeader, Zip64ExtendedInformationExtraField,
};

use futures_lite::io::{AsyncRead, AsyncReadExt};

/// Replace elements of an array at a given cursor index for use with a zero-initialised array.
macro_rules! array_push {
    ($arr:ident, $cursor:ident, $value:expr) => {{
        for entry in $value {
            $arr[$cursor] = entry;
            $cursor += 1;
        }
    }};
}

impl LocalFileHeader {
    pub fn as_slice(&self) -> [u8; LFH_LENGTH] {
        let mut array = [0; LFH_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.version.to_le_bytes());
        array_push!(array, cursor, self.flags.as_slice());
        array_push!(array, cursor, self.compression.to_le_bytes());
        array_push!(array, cursor, self.mod_time.to_le_bytes());
        array_push!(array, cursor, self.mod_date.to_le_bytes());
        array_push!(array, cursor, self.crc.to_le_bytes());
        array_push!(array, cursor, self.compressed_size.to_le_bytes());
        array_push!(array, cursor, self.uncompressed_size.to_le_bytes());
        array_push!(array, cursor, self.file_name_length.to_le_bytes());
        array_push!(array, cursor, self.extra_field_length.to_le_bytes());

        array
    }
}

impl GeneralPurposeFlag {
    pub fn as_slice(&self) -> [u8; 2] {
        let encrypted: u16 = match self.encrypted {
            false => 0x0,
            true => 0b1,
        };
        let data_descriptor: u16 = match self.data_descriptor {
            false => 0x0,
            true => 0x8,
        };
        let strong_encryption: u16 = match self.strong_encryption {
            false => 0x0,
            true => 0x40,
        };
        let filename_unicode: u16 = match self.filename_unicode {
            false => 0x0,
            true => 0x800,
        };

        (encrypted | data_descriptor | strong_encryption | filename_unicode).to_le_bytes()
    }
}

impl CentralDirectoryRecord {
    pub fn as_slice(&self) -> [u8; CDH_LENGTH] {
        let mut array = [0; CDH_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.v_made_by.to_le_bytes());
        array_push!(array, cursor, self.v_needed.to_le_bytes());
        array_push!(array, cursor, self.flags.as_slice());
        array_push!(array, cursor, self.compression.to_le_bytes());
        array_push!(array, cursor, self.mod_time.to_le_bytes());
        array_push!(array, cursor, self.mod_date.to_le_bytes());
        array_push!(array, cursor, self.crc.to_le_bytes());
        array_push!(array, cursor, self.compressed_size.to_le_bytes());
        array_push!(array, cursor, self.uncompressed_size.to_le_bytes());
        array_push!(array, cursor, self.file_name_length.to_le_bytes());
        array_push!(array, cursor, self.extra_field_length.to_le_bytes());
        array_push!(array, cursor, self.file_comment_length.to_le_bytes());
        array_push!(array, cursor, self.disk_start.to_le_bytes());
        array_push!(array, cursor, self.inter_attr.to_le_bytes());
        array_push!(array, cursor, self.exter_attr.to_le_bytes());
        array_push!(array, cursor, self.lh_offset.to_le_bytes());

        array
    }
}

impl EndOfCentralDirectoryHeader {
    pub fn as_slice(&self) -> [u8; EOCDR_LENGTH] {
        let mut array = [0; EOCDR_LENGTH];
        let mut cursor = 0;

        array_push!(array, cursor, self.disk_num.to_le_bytes());
        array_push!(array, cursor, self.start_cent_dir_disk.to_le_bytes());
        array_push!(array, cursor, self.num_of_entries_disk.to_le_bytes());
        array_push!(array, cursor, self.num_of_entries.to_le_bytes());
        array_push!(array, cursor, self.size_cent_dir.to_le_bytes());
        array_push!(array, cursor, self.cent_dir_offset.to_le_bytes());
        array_push!(array, cursor, self.file_comm_length.to_le_bytes());

        array
    }
}

impl From<[u8; LFH_LENGTH]> for LocalFileHeader {
    fn from(value: [u8; LFH_LENGTH]) -> LocalFileHeader {
        LocalFileHeader {
            version: u16_at(&value, 0),
            flags: GeneralPurposeFlag::from(u16_at(&value, 2)),
            compression: u16_at(&value, 4),
            mod_time: u16_at(&value, 6),
            mod_date: u16_at(&value, 8),
            crc: u32_at(&value, 10),
            compressed_size: u32_at(&value, 14),
            uncompressed_size: u32_at(&value, 18),
            file_name_length: u16_at(&value, 22),
            extra_field_length: u16_at(&value, 24),
        }
    }
}

impl From<u16> for GeneralPurposeFlag {
    fn from(value: u16) -> GeneralPurposeFlag {
        let encrypted = !matches!(value & 0x1, 0);
        let data_descriptor = !matches!((value & 0x8) >> 3, 0);
        let strong_encryption = !matches!((value & 0x40) >> 6, 0);
        let filename_unicode = !matches!((value & 0x800) >> 11, 0);

        GeneralPurposeFlag { encrypted, data_descriptor, strong_encryption, filename_unicode }
    }
}

impl LocalFileHeader {
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<LocalFileHeader> {
        let mut buffer: [u8; LFH_LENGTH] = [0; LFH_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(LocalFileHeader::from(buffer))
    }
}

/// Parse the extra fields of a local file header, keeping only those this crate acts upon.
pub(crate) fn parse_extra_fields(data: Vec<u8>, uncompressed_size: u32, compressed_size: u32) -> Result<Vec<ExtraField>> {
    let mut cursor = 0;
    let mut extra_fields = Vec::new();

    while cursor + 4 <= data.len() {
        let header_id = HeaderId::from(u16_at(&data, cursor));
        let field_size = u16_at(&data, cursor + 2) as usize;
        cursor += 4;

        let field = data.get(cursor..cursor + field_size).ok_or(ZipError::ExtraFieldTruncated)?;
        cursor += field_size;

        match header_id {
            HeaderId::ZIP64_EXTENDED_INFORMATION_EXTRA_FIELD => extra_fields.push(ExtraField::Zip64ExtendedInformation(
                zip64_extended_information_field_from_bytes(field, uncompressed_size, compressed_size)?,
            )),
            HeaderId::INFO_ZIP_UNICODE_PATH_EXTRA_FIELD => {
                if let Some(unicode_path) = info_zip_unicode_path_field_from_bytes(field) {
                    extra_fields.push(ExtraField::InfoZipUnicodePath(unicode_path));
                }
            }
            _ => (),
        }
    }

    Ok(extra_fields)
}

/// Parse a zip64 extra field from bytes, excluding the field's header.
///
/// A size is only present when its 32-bit counterpart is saturated, except within local file headers where writers
/// commonly emit both sizes regardless.
fn zip64_extended_information_field_from_bytes(
    data: &[u8],
    uncompressed_size: u32,
    compressed_size: u32,
) -> Result<Zip64ExtendedInformationExtraField> {
    let mut uncompressed_present = uncompressed_size == NON_ZIP64_MAX_SIZE;
    let mut compressed_present = compressed_size == NON_ZIP64_MAX_SIZE;

    if !uncompressed_present && !compressed_present && data.len() >= 16 {
        uncompressed_present = true;
        compressed_present = true;
    }

    let mut cursor = 0;
    let mut next_u64 = |present: bool| -> Result<Option<u64>> {
        if !present {
            return Ok(None);
        }
        let bytes = data.get(cursor..cursor + 8).ok_or(ZipError::Zip64ExtendedFieldIncomplete)?;
        cursor += 8;
        Ok(Some(u64::from_le_bytes(bytes.try_into().map_err(|_| ZipError::Zip64ExtendedFieldIncomplete)?)))
    };

    let uncompressed_size = next_u64(uncompressed_present)?;
    let compressed_size = next_u64(compressed_present)?;

    Ok(Zip64ExtendedInformationExtraField { uncompressed_size, compressed_size })
}

fn info_zip_unicode_path_field_from_bytes(data: &[u8]) -> Option<InfoZipUnicodePathExtraField> {
    match data.first() {
        Some(1) if data.len() >= 5 => {
            Some(InfoZipUnicodePathExtraField::V1 { crc32: u32_at(data, 1), unicode: data[5..].to_vec() })
        }
        _ => None,
    }
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
