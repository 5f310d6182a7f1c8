// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use async_zip_decrypt::{attr, Attributes};

pub const PASSWORD: &str = "correct horse battery staple";

const MOD_TIME: u16 = 0x6B5A;
const MOD_DATE: u16 = 0x5A21;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Stored,
    Deflated,
}

/// An entry of an archive built by [`encrypted_archive()`].
#[derive(Clone)]
pub struct Entry {
    name: String,
    data: Vec<u8>,
    method: Method,
    streamed: bool,
    encrypted: bool,
}

impl Entry {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self { name: name.to_owned(), data: data.to_vec(), method: Method::Stored, streamed: false, encrypted: true }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        Self { method: Method::Deflated, ..Self::stored(name, data) }
    }

    pub fn directory(name: &str) -> Self {
        Self { encrypted: false, ..Self::stored(name, b"") }
    }

    /// Defers the CRC & sizes to a trailing data descriptor.
    pub fn streamed(mut self) -> Self {
        self.streamed = true;
        self
    }

    pub fn unencrypted(mut self) -> Self {
        self.encrypted = false;
        self
    }
}

/// The traditional PKWARE cipher, used to produce encrypted fixtures.
struct Keys(u32, u32, u32);

impl Keys {
    fn new(password: &[u8]) -> Self {
        let mut keys = Keys(0x12345678, 0x23456789, 0x34567890);
        password.iter().for_each(|byte| keys.update(*byte));
        keys
    }

    fn update(&mut self, byte: u8) {
        self.0 = crc32_step(self.0, byte);
        self.1 = self.1.wrapping_add(self.0 & 0xFF).wrapping_mul(134775813).wrapping_add(1);
        self.2 = crc32_step(self.2, (self.1 >> 24) as u8);
    }

    fn encrypt(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            let temp = (self.2 & 0xFFFF) | 2;
            let plain = *byte;
            *byte = plain ^ ((temp * (temp ^ 1)) >> 8) as u8;
            self.update(plain);
        }
    }
}

/// A single raw CRC32 step, derived from a finalised CRC32 by undoing its inversions.
fn crc32_step(crc: u32, byte: u8) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(!crc);
    hasher.update(&[byte]);
    !hasher.finalize()
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn put16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn put32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

/// Builds an archive whose file entries are encrypted with `password`.
pub fn encrypted_archive(password: &str, entries: &[Entry]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut central = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        let offset = output.len() as u32;
        let directory = entry.name.ends_with('/');
        let crc = crc32fast::hash(&entry.data);

        let (method, mut payload) = match entry.method {
            Method::Stored => (0u16, entry.data.clone()),
            Method::Deflated => (8u16, deflate(&entry.data)),
        };

        let mut flags = 0u16;
        if entry.encrypted && !directory {
            flags |= 0x1;

            let mut body: Vec<u8> = (0..12).map(|index| (position * 31 + index * 7) as u8).collect();
            body[11] = if entry.streamed { (MOD_TIME >> 8) as u8 } else { (crc >> 24) as u8 };
            body.extend_from_slice(&payload);

            Keys::new(password.as_bytes()).encrypt(&mut body);
            payload = body;
        }
        if entry.streamed {
            flags |= 0x8;
        }

        let (header_crc, header_compressed, header_uncompressed) =
            if entry.streamed { (0, 0, 0) } else { (crc, payload.len() as u32, entry.data.len() as u32) };

        put32(&mut output, 0x04034b50);
        put16(&mut output, 20);
        put16(&mut output, flags);
        put16(&mut output, method);
        put16(&mut output, MOD_TIME);
        put16(&mut output, MOD_DATE);
        put32(&mut output, header_crc);
        put32(&mut output, header_compressed);
        put32(&mut output, header_uncompressed);
        put16(&mut output, entry.name.len() as u16);
        put16(&mut output, 0);
        output.extend_from_slice(entry.name.as_bytes());
        output.extend_from_slice(&payload);

        if entry.streamed {
            put32(&mut output, 0x08074b50);
            put32(&mut output, crc);
            put32(&mut output, payload.len() as u32);
            put32(&mut output, entry.data.len() as u32);
        }

        put32(&mut central, 0x02014b50);
        put16(&mut central, 20);
        put16(&mut central, 20);
        put16(&mut central, flags);
        put16(&mut central, method);
        put16(&mut central, MOD_TIME);
        put16(&mut central, MOD_DATE);
        put32(&mut central, crc);
        put32(&mut central, payload.len() as u32);
        put32(&mut central, entry.data.len() as u32);
        put16(&mut central, entry.name.len() as u16);
        put16(&mut central, 0);
        put16(&mut central, 0);
        put16(&mut central, 0);
        put16(&mut central, 0);
        put32(&mut central, if directory { 0x10 } else { 0 });
        put32(&mut central, offset);
        central.extend_from_slice(entry.name.as_bytes());
    }

    let central_offset = output.len() as u32;
    output.extend_from_slice(&central);

    put32(&mut output, 0x06054b50);
    put16(&mut output, 0);
    put16(&mut output, 0);
    put16(&mut output, entries.len() as u16);
    put16(&mut output, entries.len() as u16);
    put32(&mut output, central.len() as u32);
    put32(&mut output, central_offset);
    put16(&mut output, 0);

    output
}

/// Builds an encrypted, deflated archive with the `zip` crate.
pub fn zip_crate_archive(password: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    use zip::unstable::write::FileOptionsExt;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .with_deprecated_encryption(password.as_bytes());

    for (name, data) in files {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Reads every entry of an unencrypted archive with the `zip` crate, in central directory order.
pub fn read_with_zip_crate(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("repacked archive is not a valid zip");
    let mut entries = Vec::new();

    for index in 0..zip.len() {
        let mut file = zip.by_index(index).unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        assert!(!file.encrypted());

        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        entries.push((file.name().to_owned(), data));
    }

    entries
}

pub fn archive_attributes(filename: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(attr::FILENAME.to_owned(), filename.to_owned());
    attributes.insert("uuid".to_owned(), "a5d6c1d0-0000-4000-8000-000000000001".to_owned());
    attributes
}

/// A sample of entries covering stored, deflated, streamed & nested entries.
pub fn sample_entries() -> Vec<Entry> {
    vec![
        Entry::stored("readme.txt", b"Lorem ipsum dolor sit amet, consectetur adipiscing elit."),
        Entry::directory("folder/"),
        Entry::deflated("folder/a.txt", &b"alpha ".repeat(200)),
        Entry::deflated("folder/b.txt", &b"bravo ".repeat(300)).streamed(),
        Entry::stored("empty.txt", b""),
    ]
}
