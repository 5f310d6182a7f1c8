// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Unpacking of an archive's file entries into independent output units.

use crate::base::read::stream::{Ready, ZipFileReader};
use crate::error::{Result, ZipError};
use crate::filter::EntryFilter;
use crate::fragment::FragmentGroup;
use crate::unit::{attr, Attributes, ContentSink, OutputUnit, OCTET_STREAM};

use futures_lite::io::{AsyncRead, AsyncWriteExt};

/// Writes one output unit per file entry selected by the filter, in the order the entries appear in the archive.
///
/// Each unit starts from the `inherited` attributes, gains the location attributes derived from the entry's name and
/// is assigned its place within `group` before its payload is copied. Any failure discards every unit produced so
/// far. An archive without a selected entry is an [`ZipError::EmptyArchive`].
#[tracing::instrument(skip_all, fields(group = %group.identifier()))]
pub async fn split<R, S>(
    mut reader: ZipFileReader<Ready<R>>,
    sink: &mut S,
    filter: &EntryFilter,
    group: &mut FragmentGroup,
    inherited: &Attributes,
) -> Result<Vec<OutputUnit<S::Writer>>>
where
    R: AsyncRead + Unpin,
    S: ContentSink,
{
    let mut units = Vec::new();

    while let Some(mut entry) = reader.next_with_entry().await? {
        if !filter.matches(entry.entry()) {
            tracing::debug!(filename = %entry.entry().filename().to_string_lossy(), "skipping entry");
            reader = entry.skip().await?;
            continue;
        }

        let name = entry.entry().filename().to_string_lossy().into_owned();
        let mut attributes = inherited.clone();
        derive_location(&name, &mut attributes);
        attributes.insert(attr::MIME_TYPE.to_owned(), OCTET_STREAM.to_owned());
        group.assign(&mut attributes);

        let mut content = sink.create().map_err(ZipError::DownstreamWriteError)?;
        let copied = crate::utils::copy(entry.reader(), &mut content).await?;
        content.close().await.map_err(ZipError::DownstreamWriteError)?;
        reader = entry.done().await?;

        tracing::debug!(filename = %name, size = copied, "unpacked entry");
        units.push(OutputUnit::new(attributes, content));
    }

    if units.is_empty() {
        return Err(ZipError::EmptyArchive);
    }

    Ok(units)
}

/// Derives the `filename`, `path` & `absolute-path` attributes from an entry's name.
///
/// Names are relative to the archive's root; `folder/a.txt` has a path of `folder` and an absolute path of
/// `/folder/`, whilst `a.txt` has `/` for both.
pub fn derive_location(name: &str, attributes: &mut Attributes) {
    let (parent, filename) = match name.rsplit_once('/') {
        Some((parent, filename)) if !parent.is_empty() => (Some(parent), filename),
        Some((_, filename)) => (None, filename),
        None => (None, name),
    };

    let (path, absolute_path) = match parent {
        Some(parent) => (parent.to_owned(), format!("/{parent}/")),
        None => ("/".to_owned(), "/".to_owned()),
    };

    attributes.insert(attr::FILENAME.to_owned(), filename.to_owned());
    attributes.insert(attr::PATH.to_owned(), path);
    attributes.insert(attr::ABSOLUTE_PATH.to_owned(), absolute_path);
}
