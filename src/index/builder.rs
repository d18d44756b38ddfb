use std::path::Path;

use log::info;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, AsyncWriteExt, BufReader, BufWriter, SeekFrom};

use crate::custom_err::CustomResult;
use crate::index::format::IndexHeader;
use crate::index::{bucket_of, IndexNode, EMPTY_SLOT, NODE_SIZE};
use crate::store::track::index_key;

/// 一次建索引的统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    // 读到的数据行（不含表头）
    pub lines: u64,
    // 写入的索引节点
    pub indexed: u64,
    // 缺少字段或者键太短而跳过的行
    pub skipped: u64,
}

struct IndexWriter {
    file: BufWriter<File>,
    // 下一个节点写入的位置
    offset: u64,
}

impl IndexWriter {
    /// 截断并创建索引文件，先用空桶占住 header 和 bucket 数组的位置
    async fn create(path: &Path, header: &IndexHeader) -> CustomResult<IndexWriter> {
        info!("创建索引文件:{:?}", path);
        let f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        let mut file = BufWriter::new(f);
        file.write_all(&header.encode()).await?;
        let empty = EMPTY_SLOT.to_be_bytes();
        for _ in 0..header.bucket_count {
            file.write_all(&empty).await?;
        }
        Ok(IndexWriter {
            file,
            offset: header.nodes_start(),
        })
    }

    /// 追加一个节点，返回它在文件中的位置
    async fn append(&mut self, node: IndexNode) -> CustomResult<i64> {
        let node_offset = self.offset;
        self.file.write_all(&node.to_bytes()).await?;
        self.offset += NODE_SIZE;
        Ok(node_offset as i64)
    }

    /// 回到文件开头写入最终的 bucket 数组
    async fn finish(self, header: &IndexHeader, buckets: &[i64]) -> CustomResult<()> {
        let mut file = self.file;
        file.flush().await?;
        let mut file = file.into_inner();

        let mut head = Vec::with_capacity(header.nodes_start() as usize);
        head.extend_from_slice(&header.encode());
        for slot in buckets {
            head.extend_from_slice(&slot.to_be_bytes());
        }
        file.seek(SeekFrom::Start(0)).await?;
        file.write_all(&head).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// 顺序扫描一遍数据集，生成索引文件
///
/// 同一个桶的节点通过 next_offset 串成链表，新节点放在链表头，所以后写入的记录先被查到。
pub async fn build_index(
    dataset_path: &Path,
    index_path: &Path,
    bucket_count: u64,
    progress_interval: u64,
) -> CustomResult<BuildReport> {
    let dataset = File::open(dataset_path).await?;
    let header = IndexHeader::new(bucket_count);
    let mut writer = IndexWriter::create(index_path, &header).await?;
    let mut buckets = vec![EMPTY_SLOT; bucket_count as usize];

    let mut reader = BufReader::new(dataset);
    let mut line = Vec::new();
    // 跳过表头
    let mut cursor = reader.read_until(b'\n', &mut line).await? as u64;

    info!("开始生成索引, dataset={:?}, bucket_count={}", dataset_path, bucket_count);
    let mut report = BuildReport::default();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            break;
        }
        let line_start = cursor;
        cursor += n as u64;
        report.lines += 1;

        match index_key(&String::from_utf8_lossy(&line)) {
            Some(key) => {
                let bucket = bucket_of(&key, bucket_count);
                let node = IndexNode::new(line_start as i64, buckets[bucket]);
                buckets[bucket] = writer.append(node).await?;
                report.indexed += 1;
            }
            None => report.skipped += 1,
        }

        if report.lines % progress_interval == 0 {
            info!("已处理{}行...", report.lines);
        }
    }

    writer.finish(&header, &buckets).await?;
    info!(
        "索引生成完成:{:?}, lines={}, indexed={}, skipped={}",
        index_path, report.lines, report.indexed, report.skipped
    );
    Ok(report)
}
