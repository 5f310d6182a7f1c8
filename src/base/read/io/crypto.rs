// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Traditional PKWARE ("ZipCrypto") decryption.
//!
//! https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#6
//!
//! The cipher is a byte-wise stream cipher whose keystream depends on the plaintext, so decryption must happen
//! strictly in order. [`ZipCryptoReader`] decrypts whatever the inner reader has buffered but never consumes more of
//! the inner reader than its caller consumed from it. That keeps the position of the underlying stream exact for
//! entries whose compressed size is only known from a trailing data descriptor.

use crate::entry::ZipEntry;
use crate::error::{Result, ZipError};
use crate::spec::consts::ENCRYPTION_HEADER_LENGTH;

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_lite::io::{AsyncBufRead, AsyncRead};
use pin_project::pin_project;

pub(crate) const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut index = 0;

    while index < 256 {
        let mut crc = index as u32;
        let mut bit = 0;

        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB88320 } else { crc >> 1 };
            bit += 1;
        }

        table[index] = crc;
        index += 1;
    }

    table
};

/// A single-byte CRC32 step without the usual pre & post inversion, as the key schedule requires.
fn crc32_update(crc: u32, byte: u8) -> u32 {
    CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
}

/// The three 32-bit keys making up the cipher state.
#[derive(Clone)]
pub(crate) struct ZipCryptoKeys {
    key0: u32,
    key1: u32,
    key2: u32,
}

impl ZipCryptoKeys {
    /// Initialises the keys and feeds every password byte through them.
    pub(crate) fn new(password: &[u8]) -> Self {
        let mut keys = Self { key0: 0x12345678, key1: 0x23456789, key2: 0x34567890 };

        for byte in password {
            keys.update(*byte);
        }

        keys
    }

    fn update(&mut self, byte: u8) {
        self.key0 = crc32_update(self.key0, byte);
        self.key1 = self.key1.wrapping_add(self.key0 & 0xFF).wrapping_mul(134775813).wrapping_add(1);
        self.key2 = crc32_update(self.key2, (self.key1 >> 24) as u8);
    }

    fn stream_byte(&self) -> u8 {
        let temp = (self.key2 & 0xFFFF) | 2;
        ((temp * (temp ^ 1)) >> 8) as u8
    }

    pub(crate) fn decrypt_byte(&mut self, byte: u8) -> u8 {
        let plain = byte ^ self.stream_byte();
        self.update(plain);
        plain
    }

    pub(crate) fn decrypt(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.decrypt_byte(*byte);
        }
    }

    #[cfg(test)]
    pub(crate) fn encrypt(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            let plain = *byte;
            *byte = plain ^ self.stream_byte();
            self.update(plain);
        }
    }
}

/// Decrypts an entry's 12-byte encryption header and verifies its check byte.
///
/// The returned keys are positioned at the first byte of the entry's (possibly compressed) data.
pub(crate) fn decrypt_header(
    password: &[u8],
    mut header: [u8; ENCRYPTION_HEADER_LENGTH],
    entry: &ZipEntry,
) -> Result<ZipCryptoKeys> {
    let mut keys = ZipCryptoKeys::new(password);
    keys.decrypt(&mut header);

    let check = header[ENCRYPTION_HEADER_LENGTH - 1];
    let crc_check = (entry.crc32 >> 24) as u8;

    // Writers which stream their output don't know the CRC up front and use the high byte of the time instead.
    let valid = if entry.data_descriptor {
        let time_check = (entry.last_modification_date.time >> 8) as u8;
        check == time_check || check == crc_check
    } else {
        check == crc_check
    };

    if !valid {
        return Err(ZipError::IncorrectPassword);
    }

    Ok(keys)
}

/// A buffered reader which decrypts ZipCrypto data from an inner [`AsyncBufRead`] implementer.
#[pin_project]
pub(crate) struct ZipCryptoReader<R> {
    #[pin]
    inner: R,
    keys: ZipCryptoKeys,
    // Decrypted copy of the prefix of the inner reader's buffer which has not yet been consumed.
    plain: Vec<u8>,
}

impl<R> ZipCryptoReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub(crate) fn new(inner: R, keys: ZipCryptoKeys) -> Self {
        Self { inner, keys, plain: Vec::new() }
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncBufRead for ZipCryptoReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        let this = self.project();
        let plain: &mut Vec<u8> = this.plain;
        let raw = ready!(this.inner.poll_fill_buf(cx))?;

        if raw.len() > plain.len() {
            let start = plain.len();
            plain.extend_from_slice(&raw[start..]);
            this.keys.decrypt(&mut plain[start..]);
        }

        Poll::Ready(Ok(plain.as_slice()))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let this = self.project();
        let amt = amt.min(this.plain.len());

        this.plain.drain(..amt);
        this.inner.consume(amt);
    }
}

impl<R> AsyncRead for ZipCryptoReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
        let available = ready!(self.as_mut().poll_fill_buf(cx))?;
        let length = available.len().min(buf.len());
        buf[..length].copy_from_slice(&available[..length]);

        self.consume(length);
        Poll::Ready(Ok(length))
    }
}

/// A reader which either passes entry data through untouched or decrypts it.
#[pin_project(project = DecryptingReaderProj)]
pub(crate) enum DecryptingReader<R> {
    Plain(#[pin] R),
    ZipCrypto(#[pin] ZipCryptoReader<R>),
}

impl<R> DecryptingReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Consumes this reader and returns the inner value.
    pub(crate) fn into_inner(self) -> R {
        match self {
            DecryptingReader::Plain(inner) => inner,
            DecryptingReader::ZipCrypto(inner) => inner.into_inner(),
        }
    }
}

impl<R> AsyncBufRead for DecryptingReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        match self.project() {
            DecryptingReaderProj::Plain(inner) => inner.poll_fill_buf(cx),
            DecryptingReaderProj::ZipCrypto(inner) => inner.poll_fill_buf(cx),
        }
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        match self.project() {
            DecryptingReaderProj::Plain(inner) => inner.consume(amt),
            DecryptingReaderProj::ZipCrypto(inner) => inner.consume(amt),
        }
    }
}

impl<R> AsyncRead for DecryptingReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
        match self.project() {
            DecryptingReaderProj::Plain(inner) => inner.poll_read(cx, buf),
            DecryptingReaderProj::ZipCrypto(inner) => inner.poll_read(cx, buf),
        }
    }
}
