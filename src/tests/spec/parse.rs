// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::spec::encryption::{Encryption, Password};
use crate::spec::header::{ExtraField, GeneralPurposeFlag, InfoZipUnicodePathExtraField};
use crate::spec::parse::parse_extra_fields;

#[test]
fn general_purpose_flag_round_trip() {
    let flags = GeneralPurposeFlag::from(0x0809);

    assert!(flags.encrypted);
    assert!(flags.data_descriptor);
    assert!(!flags.strong_encryption);
    assert!(flags.filename_unicode);
    assert_eq!(flags.as_slice(), 0x0809u16.to_le_bytes());
}

#[test]
fn zip64_sizes_in_local_header() {
    let mut data = vec![0x01, 0x00, 16, 0x00];
    data.extend_from_slice(&5_000_000_000u64.to_le_bytes());
    data.extend_from_slice(&4_900_000_000u64.to_le_bytes());

    let fields = parse_extra_fields(data, u32::MAX, u32::MAX).expect("failed to parse extra fields");

    match &fields[..] {
        [ExtraField::Zip64ExtendedInformation(zip64)] => {
            assert_eq!(zip64.uncompressed_size, Some(5_000_000_000));
            assert_eq!(zip64.compressed_size, Some(4_900_000_000));
        }
        other => panic!("unexpected extra fields: {other:?}"),
    }
}

#[test]
fn incomplete_zip64_field() {
    let data = vec![0x01, 0x00, 4, 0x00, 0, 0, 0, 0];
    let result = parse_extra_fields(data, u32::MAX, 10);

    assert!(matches!(result, Err(ZipError::Zip64ExtendedFieldIncomplete)));
}

#[test]
fn unknown_fields_are_skipped() {
    let mut data = vec![0x55, 0x54, 5, 0x00, 1, 2, 3, 4, 5];
    data.extend_from_slice(&[0x75, 0x70, 8, 0x00, 1, 0xEF, 0xBE, 0xAD, 0xDE, b'a', b'.', b'z']);

    let fields = parse_extra_fields(data, 0, 0).expect("failed to parse extra fields");

    match &fields[..] {
        [ExtraField::InfoZipUnicodePath(InfoZipUnicodePathExtraField::V1 { crc32, unicode })] => {
            assert_eq!(*crc32, 0xDEADBEEF);
            assert_eq!(unicode, b"a.z");
        }
        other => panic!("unexpected extra fields: {other:?}"),
    }
}

#[test]
fn truncated_extra_field() {
    let data = vec![0x55, 0x54, 9, 0x00, 1, 2];
    assert!(matches!(parse_extra_fields(data, 0, 0), Err(ZipError::ExtraFieldTruncated)));
}

#[test]
fn encryption_detection() {
    let encrypted = GeneralPurposeFlag { encrypted: true, ..Default::default() };
    let strong = GeneralPurposeFlag { encrypted: true, strong_encryption: true, ..Default::default() };

    assert_eq!(Encryption::detect(&GeneralPurposeFlag::default(), 8).ok(), Some(Encryption::None));
    assert_eq!(Encryption::detect(&encrypted, 8).ok(), Some(Encryption::ZipCrypto));
    assert!(matches!(Encryption::detect(&strong, 8), Err(ZipError::EncryptionNotSupported(_))));
    assert!(matches!(Encryption::detect(&encrypted, 99), Err(ZipError::EncryptionNotSupported(_))));
}

#[test]
fn password_debug_is_redacted() {
    let password = Password::from("hunter2");

    assert_eq!(format!("{password:?}"), "Password(***)");
    assert_eq!(password.as_bytes(), b"hunter2");
    assert_eq!(Password::from(&['p', 'ä', 's', 's'][..]).as_bytes(), "päss".as_bytes());
}

#[test]
fn password_clones_own_their_bytes() {
    let password = Password::from(String::from("hunter2"));
    let clone = password.clone();
    drop(password);

    assert_eq!(clone.as_bytes(), b"hunter2");
    assert!(!clone.is_empty());
}
