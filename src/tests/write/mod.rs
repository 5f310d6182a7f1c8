// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::ZipFileWriter;
use crate::entry::ZipEntryBuilder;
use crate::error::ZipError;
use crate::spec::Compression;
use crate::string::{StringEncoding, ZipString};

use std::io::Read;

use futures_lite::io::AsyncWriteExt;

#[tokio::test]
async fn empty() {
    let writer = ZipFileWriter::new(Vec::new());
    assert!(writer.is_empty());

    let archive = writer.close().await.expect("failed to close writer");

    let zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).expect("failed to open archive");
    assert!(zip.is_empty());
}

#[tokio::test]
async fn entries_readable_by_zip_crate() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let entries: [(&str, &[u8]); 3] = [("a.txt", b"alpha"), ("folder/", b""), ("folder/ümlaut.txt", b"bravo")];

    for (name, data) in entries {
        let builder = ZipEntryBuilder::new(name.into(), Compression::Stored);
        let mut entry_writer = writer.write_entry_stream(builder).await.expect("failed to open entry");
        entry_writer.write_all(data).await.expect("failed to write entry");
        entry_writer.close().await.expect("failed to close entry");
    }

    assert_eq!(writer.len(), 3);
    let archive = writer.close().await.expect("failed to close writer");

    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).expect("failed to open archive");
    assert_eq!(zip.len(), 3);
    assert!(zip.by_name("folder/").expect("missing folder").is_dir());

    for (name, data) in entries.iter().filter(|(name, _)| !name.ends_with('/')) {
        let mut file = zip.by_name(name).expect("missing entry");
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);

        let mut read = Vec::new();
        file.read_to_end(&mut read).expect("failed to read entry");
        assert_eq!(&read[..], *data);
    }
}

#[tokio::test]
async fn raw_filenames_are_kept() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let filename = ZipString::new(vec![b'f', 0x81, b'.', b't'], StringEncoding::Raw);

    let builder = ZipEntryBuilder::new(filename, Compression::Stored);
    writer.write_entry_stream(builder).await.expect("failed to open entry").close().await.expect("failed to close");
    let archive = writer.close().await.expect("failed to close writer");

    // Local file header name follows the 30 byte fixed header; the UTF-8 flag (bit 11) must not be set.
    assert_eq!(&archive[30..34], &[b'f', 0x81, b'.', b't']);
    assert_eq!(archive[7] & 0x08, 0);
}

#[tokio::test]
async fn declared_size_must_match() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let builder = ZipEntryBuilder::new("a.txt".into(), Compression::Stored).uncompressed_size(10);

    let mut entry_writer = writer.write_entry_stream(builder).await.expect("failed to open entry");
    entry_writer.write_all(b"short").await.expect("failed to write entry");

    assert!(matches!(entry_writer.close().await, Err(ZipError::RepackSizeMismatch { expected: 10, actual: 5 })));
}

#[tokio::test]
async fn declared_size_above_four_gib() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let builder = ZipEntryBuilder::new("a.txt".into(), Compression::Stored).uncompressed_size(5_000_000_000);

    assert!(matches!(writer.write_entry_stream(builder).await, Err(ZipError::Zip64Needed(_))));
}

#[tokio::test]
async fn filename_too_large() {
    let mut writer = ZipFileWriter::new(Vec::new());
    let builder = ZipEntryBuilder::new("a".repeat(70_000).into(), Compression::Stored);

    assert!(matches!(writer.write_entry_stream(builder).await, Err(ZipError::FileNameTooLarge)));
}
