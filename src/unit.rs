// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Output units and the sinks which provide their payload writers.

use std::collections::BTreeMap;

use futures_lite::io::AsyncWrite;

/// A string-keyed attribute bag describing a unit of content.
pub type Attributes = BTreeMap<String, String>;

/// Attribute keys read & written by this crate.
pub mod attr {
    pub const FILENAME: &str = "filename";
    pub const PATH: &str = "path";
    pub const ABSOLUTE_PATH: &str = "absolute-path";
    pub const MIME_TYPE: &str = "mime.type";

    pub const FRAGMENT_ID: &str = "fragment.identifier";
    pub const FRAGMENT_INDEX: &str = "fragment.index";
    pub const FRAGMENT_COUNT: &str = "fragment.count";
    pub const SEGMENT_ORIGINAL_FILENAME: &str = "segment.original.filename";
}

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_ZIP: &str = "application/zip";

/// A produced unit of content: its attributes alongside the writer its payload was written to.
///
/// Dropping a unit discards it.
#[derive(Debug)]
pub struct OutputUnit<W> {
    attributes: Attributes,
    content: W,
}

impl<W> OutputUnit<W> {
    pub fn new(attributes: Attributes, content: W) -> Self {
        Self { attributes, content }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Returns the value of a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn content(&self) -> &W {
        &self.content
    }

    pub fn into_content(self) -> W {
        self.content
    }

    pub fn into_parts(self) -> (Attributes, W) {
        (self.attributes, self.content)
    }
}

/// A provider of fresh payload writers, one per output unit.
pub trait ContentSink {
    type Writer: AsyncWrite + Unpin;

    /// Opens a new, empty payload writer.
    fn create(&mut self) -> std::io::Result<Self::Writer>;
}

impl<F, W> ContentSink for F
where
    F: FnMut() -> std::io::Result<W>,
    W: AsyncWrite + Unpin,
{
    type Writer = W;

    fn create(&mut self) -> std::io::Result<W> {
        self()
    }
}

/// A sink which holds every payload in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySink;

impl ContentSink for MemorySink {
    type Writer = Vec<u8>;

    fn create(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
