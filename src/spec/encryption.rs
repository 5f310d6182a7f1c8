// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::spec::header::GeneralPurposeFlag;

use zeroize::Zeroizing;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#445
const WINZIP_AES_COMPRESSION: u16 = 99;

/// The cipher scheme protecting the data of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    /// The entry's data is not encrypted.
    None,
    /// Traditional PKWARE encryption, commonly known as ZipCrypto.
    ZipCrypto,
}

impl Encryption {
    /// Detects the cipher scheme from an entry's flags and raw compression method.
    pub(crate) fn detect(flags: &GeneralPurposeFlag, compression: u16) -> Result<Self> {
        if compression == WINZIP_AES_COMPRESSION {
            return Err(ZipError::EncryptionNotSupported("WinZip AES"));
        }

        match (flags.encrypted, flags.strong_encryption) {
            (false, _) => Ok(Encryption::None),
            (true, true) => Err(ZipError::EncryptionNotSupported("PKWARE strong encryption")),
            (true, false) => Ok(Encryption::ZipCrypto),
        }
    }
}

/// A password used to derive entry decryption keys.
///
/// The password is held as the raw bytes fed into key derivation (the UTF-8 encoding of its characters). Its
/// [`Debug`](std::fmt::Debug) output is redacted and the bytes are overwritten when dropped.
#[derive(Clone)]
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Returns the raw password bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Returns whether the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(Zeroizing::new(value.as_bytes().to_vec()))
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(Zeroizing::new(value.into_bytes()))
    }
}

impl From<&[char]> for Password {
    fn from(value: &[char]) -> Self {
        let mut bytes = Zeroizing::new(Vec::with_capacity(value.len()));
        let mut buffer = Zeroizing::new([0; 4]);

        for c in value {
            bytes.extend_from_slice(c.encode_utf8(&mut *buffer).as_bytes());
        }

        Self(bytes)
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}
