// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::io::compressed::CompressedReader;
use crate::spec::Compression;

compressed_test_helper!(stored_test, Compression::Stored, "foo bar", b"foo bar".to_vec());

#[cfg(feature = "deflate")]
compressed_test_helper!(deflate_test, Compression::Deflate, "foo bar", deflate(b"foo bar"));

#[cfg(feature = "deflate")]
fn deflate(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("failed to deflate");
    encoder.finish().expect("failed to finish deflate stream")
}

/// A helper macro for generating a CompressedReader test using a specific compression method.
macro_rules! compressed_test_helper {
    ($name:ident, $typ:expr, $data_raw:expr, $data:expr) => {
        #[cfg(test)]
        #[tokio::test]
        async fn $name() {
            use futures_lite::io::{AsyncReadExt, BufReader, Cursor};

            let data = $data;
            let data_raw = $data_raw;

            let cursor = BufReader::new(Cursor::new(data));
            let mut reader = CompressedReader::new(cursor, $typ);

            let mut read_data = String::new();
            reader.read_to_string(&mut read_data).await.expect("read into CompressedReader failed");

            assert_eq!(read_data, data_raw);
        }
    };
}

use compressed_test_helper;

#[cfg(feature = "deflate")]
#[tokio::test]
async fn deflate_stops_at_end_of_stream() {
    use futures_lite::io::{AsyncReadExt, BufReader, Cursor};

    let mut data = deflate(b"foo bar");
    let length = data.len();
    data.extend_from_slice(b"TRAILER");

    let mut reader = CompressedReader::new(BufReader::new(Cursor::new(data)), Compression::Deflate);
    let mut read_data = Vec::new();
    reader.read_to_end(&mut read_data).await.expect("read into CompressedReader failed");
    assert_eq!(read_data, b"foo bar");

    let mut rest = Vec::new();
    let mut inner = reader.into_inner();
    inner.read_to_end(&mut rest).await.expect("failed to read remaining input");
    assert_eq!(rest, b"TRAILER", "decoder consumed {} bytes past the stream end", length);
}
