// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::stream::ZipFileReader;
use crate::base::read::{data_descriptor, lfh, DataDescriptor};
use crate::base::write::ZipFileWriter;
use crate::entry::ZipEntryBuilder;
use crate::error::ZipError;
use crate::spec::consts::{DATA_DESCRIPTOR_SIGNATURE, EOCDR_SIGNATURE};
use crate::spec::Compression;

use futures_lite::io::{AsyncReadExt, AsyncWriteExt, Cursor};

async fn stored_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipFileWriter::new(Vec::new());

    for (name, data) in entries {
        let builder = ZipEntryBuilder::new((*name).into(), Compression::Stored).uncompressed_size(data.len() as u64);
        let mut entry_writer = writer.write_entry_stream(builder).await.expect("failed to open entry");
        entry_writer.write_all(data).await.expect("failed to write entry");
        entry_writer.close().await.expect("failed to close entry");
    }

    writer.close().await.expect("failed to close writer")
}

#[tokio::test]
async fn empty_archive_has_no_entries() {
    let archive = stored_archive(&[]).await;
    let reader = ZipFileReader::new(Cursor::new(archive));

    assert!(reader.next_with_entry().await.expect("failed to read archive").is_none());
}

#[tokio::test]
async fn zero_length_input_is_malformed() {
    let reader = ZipFileReader::new(Cursor::new(Vec::<u8>::new()));
    let result = reader.next_with_entry().await;

    assert!(matches!(result, Err(ZipError::UpstreamReadError(_))));
}

#[tokio::test]
async fn unexpected_signature() {
    let mut input = Cursor::new(b"PK\x07\x07 this is not a zip".to_vec());
    let result = lfh(&mut input).await;

    assert!(matches!(result, Err(ZipError::UnexpectedHeaderError(0x07074b50, _))));
}

#[tokio::test]
async fn end_of_central_directory_ends_entries() {
    let mut input = Cursor::new(EOCDR_SIGNATURE.to_le_bytes().to_vec());
    assert!(lfh(&mut input).await.expect("failed to read header").is_none());
}

#[tokio::test]
async fn data_descriptor_signature_is_optional() {
    let mut with_signature = Vec::new();
    with_signature.extend_from_slice(&DATA_DESCRIPTOR_SIGNATURE.to_le_bytes());
    with_signature.extend_from_slice(&0xCAFEBABEu32.to_le_bytes());
    with_signature.extend_from_slice(&12u32.to_le_bytes());
    with_signature.extend_from_slice(&34u32.to_le_bytes());

    let without_signature = with_signature[4..].to_vec();
    let expected = DataDescriptor { crc: 0xCAFEBABE, compressed_size: 12, uncompressed_size: 34 };

    let parsed = data_descriptor(&mut Cursor::new(with_signature), false).await.expect("failed to parse descriptor");
    assert_eq!(parsed, expected);

    let parsed = data_descriptor(&mut Cursor::new(without_signature), false).await.expect("failed to parse descriptor");
    assert_eq!(parsed, expected);
}

#[tokio::test]
async fn zip64_data_descriptor() {
    let mut input = Vec::new();
    input.extend_from_slice(&0x01020304u32.to_le_bytes());
    input.extend_from_slice(&5_000_000_000u64.to_le_bytes());
    input.extend_from_slice(&6_000_000_000u64.to_le_bytes());

    let parsed = data_descriptor(&mut Cursor::new(input), true).await.expect("failed to parse descriptor");
    assert_eq!(parsed.compressed_size, 5_000_000_000);
    assert_eq!(parsed.uncompressed_size, 6_000_000_000);
}

#[tokio::test]
async fn reads_entries_in_order() {
    let archive = stored_archive(&[("a.txt", b"alpha"), ("folder/", b""), ("folder/b.txt", b"bravo")]).await;
    let mut reader = ZipFileReader::new(Cursor::new(archive));
    let mut seen = Vec::new();

    while let Some(mut entry) = reader.next_with_entry().await.expect("failed to open entry") {
        let name = entry.entry().filename().to_string_lossy().into_owned();
        let mut data = Vec::new();
        entry.reader().read_to_end(&mut data).await.expect("failed to read entry");

        seen.push((name, data));
        reader = entry.done().await.expect("failed to close entry");
    }

    assert_eq!(
        seen,
        vec![
            ("a.txt".to_owned(), b"alpha".to_vec()),
            ("folder/".to_owned(), Vec::new()),
            ("folder/b.txt".to_owned(), b"bravo".to_vec()),
        ]
    );
}

#[tokio::test]
async fn done_requires_eof() {
    let archive = stored_archive(&[("a.txt", b"alpha")]).await;
    let reader = ZipFileReader::new(Cursor::new(archive));
    let entry = reader.next_with_entry().await.expect("failed to open entry").expect("no entry");

    assert!(matches!(entry.done().await, Err(ZipError::EOFNotReached)));
}

#[tokio::test]
async fn skip_verifies_crc() {
    let mut archive = stored_archive(&[("a.txt", b"alpha")]).await;

    // Local file header (30 bytes) + name (5 bytes), then the first data byte.
    archive[35] ^= 0xFF;

    let reader = ZipFileReader::new(Cursor::new(archive));
    let entry = reader.next_with_entry().await.expect("failed to open entry").expect("no entry");

    assert!(matches!(entry.skip().await, Err(ZipError::CRC32CheckError)));
}

#[tokio::test]
async fn encrypted_entry_requires_password() {
    let mut archive = stored_archive(&[("a.txt", b"alpha")]).await;

    // Set the encrypted bit of the general purpose flag.
    archive[6] |= 0x1;

    let reader = ZipFileReader::new(Cursor::new(archive));
    assert!(matches!(reader.next_with_entry().await, Err(ZipError::PasswordRequired)));
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn tokio_reader_and_writer() {
    let mut writer = ZipFileWriter::with_tokio(Vec::new());
    let builder = ZipEntryBuilder::new("a.txt".into(), Compression::Stored);
    let mut entry_writer = writer.write_entry_stream(builder).await.expect("failed to open entry");
    entry_writer.write_all(b"alpha").await.expect("failed to write entry");
    entry_writer.close().await.expect("failed to close entry");
    let archive = writer.close().await.expect("failed to close writer").into_inner();

    let reader = ZipFileReader::with_tokio(std::io::Cursor::new(archive), "unused".into());
    let mut entry = reader.next_with_entry().await.expect("failed to open entry").expect("no entry");

    let mut data = Vec::new();
    entry.reader().read_to_end(&mut data).await.expect("failed to read entry");
    assert_eq!(data, b"alpha");

    let reader = entry.done().await.expect("failed to close entry");
    assert!(reader.next_with_entry().await.expect("failed to read archive").is_none());
}
