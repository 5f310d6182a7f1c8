// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::lfh;
use crate::base::write::ZipFileWriter;
use crate::entry::ZipEntryBuilder;
use crate::spec::Compression;
use crate::ZipDateTime;

use futures_lite::io::Cursor;

#[tokio::test]
async fn modification_date_is_written_unchanged() {
    // 2000-09-08 07:05:04
    let datetime = ZipDateTime { date: (20 << 9) | (9 << 5) | 8, time: (7 << 11) | (5 << 5) | 2 };

    let mut writer = ZipFileWriter::new(Vec::new());
    let builder = ZipEntryBuilder::new("a.txt".into(), Compression::Stored).last_modification_date(datetime);
    writer.write_entry_stream(builder).await.expect("failed to open entry").close().await.expect("failed to close entry");
    let archive = writer.close().await.expect("failed to close writer");

    let entry = lfh(&mut Cursor::new(archive)).await.expect("failed to read header").expect("no entry");
    assert_eq!(*entry.last_modification_date(), datetime);
}
