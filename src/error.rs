// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which holds relevant error reporting structures/types.

use thiserror::Error;

/// A Result type alias over ZipError to minimise repetition.
pub type Result<V> = std::result::Result<V, ZipError>;

/// An enum of possible errors and their descriptions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("a decryption password must be provided and must not be empty")]
    EmptyPassword,
    #[error("the file filter is not a valid regular expression: {0}")]
    InvalidFilter(#[from] regex::Error),
    #[error("unknown processing mode: '{0}'")]
    InvalidMode(String),

    #[error("the archive does not contain any matching entries")]
    EmptyArchive,

    #[error("the password is incorrect or the entry data is corrupt")]
    IncorrectPassword,
    #[error("an entry is encrypted but no password was provided")]
    PasswordRequired,
    #[error("a computed CRC32 value did not match the expected value")]
    CRC32CheckError,

    #[error("feature not supported: '{0}'")]
    FeatureNotSupported(&'static str),
    #[error("compression not supported: {0}")]
    CompressionNotSupported(u16),
    #[error("encryption not supported: '{0}'")]
    EncryptionNotSupported(&'static str),
    #[error("Encountered an unexpected header (actual: {0:#x}, expected: {1:#x}).")]
    UnexpectedHeaderError(u32, u32),
    #[error("zip64 extended information field was incomplete")]
    Zip64ExtendedFieldIncomplete,
    #[error("an extra field extends beyond the end of the extra field data")]
    ExtraFieldTruncated,
    #[error("entry size mismatch (declared: {expected}, actual: {actual})")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("attempted to close an entry before its data was fully read")]
    EOFNotReached,
    #[error("an upstream reader returned an error: {0}")]
    UpstreamReadError(#[from] std::io::Error),

    #[error("a downstream writer returned an error: {0}")]
    DownstreamWriteError(std::io::Error),
    #[error("repacked entry size mismatch (declared: {expected}, written: {actual})")]
    RepackSizeMismatch { expected: u64, actual: u64 },
    #[error("the repacked archive would require zip64 ({0})")]
    Zip64Needed(Zip64ErrorCase),
    #[error("an entry name is too large to be written")]
    FileNameTooLarge,
}

/// The reason a repacked archive would need zip64 structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zip64ErrorCase {
    TooManyFiles,
    LargeFile,
}

impl std::fmt::Display for Zip64ErrorCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyFiles => write!(f, "more than 65536 files in archive"),
            Self::LargeFile => write!(f, "file is larger than 4 GiB"),
        }
    }
}

/// The class of failure an error belongs to, which decides how an input is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The settings themselves are unusable.
    Configuration,
    /// The decryption subsystem could not be constructed; the input should be retried later.
    Initialization,
    /// No entries survived decryption and filtering.
    EmptyArchive,
    /// Wrong password or corrupted entry data.
    Authentication,
    /// Truncated, unsupported or otherwise inconsistent archive framing.
    Malformed,
    /// The decrypted output could not be written.
    Repack,
}

impl ZipError {
    /// Returns the failure class of this error.
    pub fn failure(&self) -> Failure {
        match self {
            ZipError::InvalidFilter(_) | ZipError::InvalidMode(_) => Failure::Configuration,
            ZipError::EmptyPassword => Failure::Initialization,
            ZipError::EmptyArchive => Failure::EmptyArchive,
            ZipError::IncorrectPassword | ZipError::PasswordRequired | ZipError::CRC32CheckError => {
                Failure::Authentication
            },
            ZipError::FeatureNotSupported(_)
            | ZipError::CompressionNotSupported(_)
            | ZipError::EncryptionNotSupported(_)
            | ZipError::UnexpectedHeaderError(_, _)
            | ZipError::Zip64ExtendedFieldIncomplete
            | ZipError::ExtraFieldTruncated
            | ZipError::SizeMismatch { .. }
            | ZipError::EOFNotReached
            | ZipError::UpstreamReadError(_) => Failure::Malformed,
            ZipError::DownstreamWriteError(_)
            | ZipError::RepackSizeMismatch { .. }
            | ZipError::Zip64Needed(_)
            | ZipError::FileNameTooLarge => Failure::Repack,
        }
    }
}
