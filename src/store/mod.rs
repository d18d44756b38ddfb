use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader, SeekFrom};

use crate::custom_err::CustomResult;

pub mod artist;
pub mod field_codec;
pub mod track;

// 数据集字段位置，从1开始
pub const ALBUM_FIELD: usize = 1;
pub const ARTISTS_FIELD: usize = 4;
pub const DURATION_FIELD: usize = 6;
pub const TITLE_FIELD: usize = 8;
pub const POPULARITY_FIELD: usize = 10;

/// 按偏移量读取一行时最多读多少字节
pub const MAX_LINE_LENGTH: u64 = 8192;

/// 只读打开的数据集文件，每个连接各自持有一份，互不影响文件指针
pub struct ReadableFile {
    file: File,
    len: u64,
}

impl ReadableFile {
    pub async fn open(path: &Path) -> CustomResult<ReadableFile> {
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(ReadableFile { file, len })
    }

    /// 读取从 offset 开始的一行（含换行符），offset 超出文件范围时返回 None
    pub async fn read_line_at(&mut self, offset: i64) -> CustomResult<Option<String>> {
        if offset < 0 || offset as u64 >= self.len {
            return Ok(None);
        }
        self.file.seek(SeekFrom::Start(offset as u64)).await?;

        let mut buffer = Vec::new();
        let mut reader = BufReader::new((&mut self.file).take(MAX_LINE_LENGTH));
        reader.read_until(b'\n', &mut buffer).await?;
        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }
}
