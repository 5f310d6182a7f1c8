// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Decryption of one archive at a time into routed output units.
//!
//! # Example
//! ```no_run
//! # use async_zip_decrypt::error::Result;
//! # use async_zip_decrypt::{Attributes, DecryptArchive, MemorySink, Mode, Routing, Settings};
//! # use futures_lite::io::Cursor;
//! #
//! # async fn run(archive: Vec<u8>) -> Result<()> {
//! let settings = Settings::builder().mode(Mode::DecryptAndUnpack).password("secret").filter(r"\.txt$").build();
//! let processor = DecryptArchive::new(settings)?;
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("filename".to_owned(), "bundle.zip".to_owned());
//!
//! match processor.on_trigger(attributes, Cursor::new(archive), &mut MemorySink).await {
//!     Routing::Success { outputs, .. } => println!("unpacked {} files", outputs.len()),
//!     Routing::Failure { error, .. } | Routing::Rollback { error, .. } => println!("failed: {error}"),
//! }
//! #     Ok(())
//! # }
//! ```

use crate::codec::{ArchiveCodec, Scheme};
use crate::error::{Failure, Result, ZipError};
use crate::filter::{EntryFilter, MATCH_ALL};
use crate::fragment::FragmentGroup;
use crate::spec::encryption::Password;
use crate::unit::{attr, Attributes, ContentSink, OutputUnit};

use std::str::FromStr;

use futures_lite::io::AsyncRead;

/// What is produced from an archive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A single decrypted archive.
    #[default]
    DecryptOnly,
    /// One unit per selected file entry.
    DecryptAndUnpack,
}

impl FromStr for Mode {
    type Err = ZipError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "Decrypt only" | "decrypt-only" => Ok(Mode::DecryptOnly),
            "Decrypt and unpack" | "decrypt-and-unpack" => Ok(Mode::DecryptAndUnpack),
            _ => Err(ZipError::InvalidMode(value.to_owned())),
        }
    }
}

/// The configuration shared by every archive a [`DecryptArchive`] processes.
#[derive(Debug, Clone)]
pub struct Settings {
    mode: Mode,
    password: Password,
    filter: String,
    scheme: Scheme,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

/// A builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    mode: Mode,
    password: Option<Password>,
    filter: Option<String>,
    scheme: Scheme,
}

impl SettingsBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the regular expression selecting the file entries unpacked by [`Mode::DecryptAndUnpack`] (defaults to `.*`).
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Builds the settings.
    ///
    /// A missing password is kept as an empty one, which fails each archive's initialisation.
    pub fn build(self) -> Settings {
        Settings {
            mode: self.mode,
            password: self.password.unwrap_or_else(|| Password::from("")),
            filter: self.filter.unwrap_or_else(|| MATCH_ALL.to_owned()),
            scheme: self.scheme,
        }
    }
}

/// Where an archive, and whatever was produced from it, should go next.
#[derive(Debug)]
pub enum Routing<W> {
    /// The archive was fully processed.
    Success { outputs: Vec<OutputUnit<W>>, original: Attributes },
    /// The archive could not be processed; nothing was produced and its attributes are unchanged.
    Failure { original: Attributes, error: ZipError },
    /// Processing could not start; the archive should be retried later.
    Rollback { original: Attributes, error: ZipError },
}

/// Decrypts, and optionally unpacks, password-protected archives.
///
/// A processor holds only read-only configuration so a single instance may be shared by any number of workers.
#[derive(Debug)]
pub struct DecryptArchive {
    settings: Settings,
    filter: EntryFilter,
}

impl DecryptArchive {
    /// Constructs a processor, compiling its filter.
    pub fn new(settings: Settings) -> Result<Self> {
        let filter = EntryFilter::new(&settings.filter)?;
        Ok(Self { settings, filter })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Processes a single archive from start to finish.
    ///
    /// `attributes` describe the archive and `content` is its byte stream, which is read exactly once. Every payload
    /// is written to a writer opened from `sink`.
    #[tracing::instrument(skip_all, fields(filename = attributes.get(attr::FILENAME).map(String::as_str), mode = ?self.settings.mode))]
    pub async fn on_trigger<R, S>(&self, attributes: Attributes, content: R, sink: &mut S) -> Routing<S::Writer>
    where
        R: AsyncRead + Unpin,
        S: ContentSink,
    {
        let codec = match ArchiveCodec::new(self.settings.scheme, self.settings.password.clone()) {
            Ok(codec) => codec,
            Err(error) => {
                tracing::warn!(%error, "failed to initialise decryption, rolling back");
                return Routing::Rollback { original: attributes, error };
            }
        };

        let result = match self.settings.mode {
            Mode::DecryptOnly => self.decrypt_only(&codec, &attributes, content, sink).await,
            Mode::DecryptAndUnpack => self.unpack(&codec, &attributes, content, sink).await,
        };

        match result {
            Ok((outputs, original)) => {
                tracing::info!(outputs = outputs.len(), "processed archive");
                Routing::Success { outputs, original }
            }
            Err(error) if error.failure() == Failure::EmptyArchive => {
                tracing::error!("archive does not contain any matching entries, routing to failure");
                Routing::Failure { original: attributes, error }
            }
            Err(error) => {
                tracing::error!(%error, failure = ?error.failure(), "failed to process archive, routing to failure");
                Routing::Failure { original: attributes, error }
            }
        }
    }

    async fn decrypt_only<R, S>(
        &self,
        codec: &ArchiveCodec,
        attributes: &Attributes,
        content: R,
        sink: &mut S,
    ) -> Result<(Vec<OutputUnit<S::Writer>>, Attributes)>
    where
        R: AsyncRead + Unpin,
        S: ContentSink,
    {
        let writer = sink.create().map_err(ZipError::DownstreamWriteError)?;
        let (writer, summary) = codec.decrypt(content, writer).await?;

        let mut decrypted = attributes.clone();
        codec.update_attributes(&mut decrypted);

        tracing::debug!(files = summary.files, directories = summary.directories, bytes = summary.bytes, "decrypted archive");
        Ok((vec![OutputUnit::new(decrypted, writer)], attributes.clone()))
    }

    async fn unpack<R, S>(
        &self,
        codec: &ArchiveCodec,
        attributes: &Attributes,
        content: R,
        sink: &mut S,
    ) -> Result<(Vec<OutputUnit<S::Writer>>, Attributes)>
    where
        R: AsyncRead + Unpin,
        S: ContentSink,
    {
        let mut group = FragmentGroup::new();
        let mut units = codec.unpack(content, sink, &self.filter, &mut group, attributes).await?;

        let mut original = attributes.clone();
        let original_filename = attributes.get(attr::FILENAME).map(String::as_str);

        if let Some(count) = group.finalize(&mut units, original_filename) {
            group.copy_to_original(&mut original, count);
        }

        Ok((units, original))
    }
}
