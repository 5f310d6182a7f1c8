// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! An asynchronous, streaming decrypter for password-protected ZIP archives.
//!
//! ## Features
//! - A forward-only reader which decrypts traditional PKWARE ("ZipCrypto") entries without buffering the archive.
//! - Support for Stored and Deflate compression methods, including deflated entries with trailing data descriptors.
//! - Re-emission of the decrypted entries as a stored, unencrypted archive ([`repack()`]).
//! - Unpacking of the decrypted entries into independent output units with location & grouping attributes
//!   ([`split()`]).
//! - A [`DecryptArchive`] processor which runs either operation over one archive and decides how it's routed.
//!
//! [Read more.](https://github.com/Majored/rs-async-zip)

pub mod base;
pub mod codec;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod processor;
pub mod repack;
pub mod split;
pub mod unit;

pub(crate) mod date;
pub(crate) mod entry;
pub(crate) mod spec;
pub(crate) mod string;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::spec::encryption::Password;
pub use crate::spec::{Compression, Encryption};

pub use crate::date::ZipDateTime;
pub use crate::entry::{ZipEntry, ZipEntryBuilder};
pub use crate::string::{StringEncoding, ZipString};

pub use crate::codec::{ArchiveCodec, Scheme};
pub use crate::error::{Failure, ZipError};
pub use crate::filter::EntryFilter;
pub use crate::fragment::FragmentGroup;
pub use crate::processor::{DecryptArchive, Mode, Routing, Settings, SettingsBuilder};
pub use crate::repack::{repack, RepackSummary};
pub use crate::split::split;
pub use crate::unit::{attr, Attributes, ContentSink, MemorySink, OutputUnit};
