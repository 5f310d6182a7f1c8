// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read a little-endian u32 from a reader which impls AsyncRead.
pub(crate) async fn read_u32<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0; 4];
    reader.read_exact(&mut buffer).await?;
    Ok(u32::from_le_bytes(buffer))
}

/// Read a little-endian u64 from a reader which impls AsyncRead.
pub(crate) async fn read_u64<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<u64> {
    let mut buffer = [0; 8];
    reader.read_exact(&mut buffer).await?;
    Ok(u64::from_le_bytes(buffer))
}

/// The size of the buffer entry data is copied through.
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Copies a reader to EOF into a writer, returning the number of bytes copied.
///
/// Read failures keep their own error while write failures are reported as downstream write errors.
pub(crate) async fn copy<R, W>(reader: &mut R, writer: &mut W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = [0; COPY_BUFFER_SIZE];
    let mut copied = 0;

    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            return Ok(copied);
        }

        writer.write_all(&buffer[..read]).await.map_err(ZipError::DownstreamWriteError)?;
        copied += read as u64;
    }
}
