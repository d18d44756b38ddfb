pub mod bucket_table;
pub mod builder;
pub mod chain;
pub mod format;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::calc_hash;
use crate::custom_err::CustomResult;

/// 默认的桶数量
pub const HASH_TABLE_SIZE: u64 = 500_000;
/// 空桶、链表结尾
pub const EMPTY_SLOT: i64 = -1;
/// 每个桶在文件中占用的字节数
pub const SLOT_SIZE: u64 = 8;
/// 索引节点在文件中占用的字节数
pub const NODE_SIZE: u64 = 16;

/// 索引节点，写入后不再修改
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexNode {
    // 数据行在 csv 中的起始位置
    pub dataset_offset: i64,
    // 同一个桶中上一个插入的节点在索引文件中的位置
    pub next_offset: i64,
}

impl IndexNode {
    pub fn new(dataset_offset: i64, next_offset: i64) -> Self {
        IndexNode {
            dataset_offset,
            next_offset,
        }
    }

    pub fn to_bytes(&self) -> [u8; NODE_SIZE as usize] {
        let mut bytes = [0u8; NODE_SIZE as usize];
        bytes[..8].copy_from_slice(&self.dataset_offset.to_be_bytes());
        bytes[8..].copy_from_slice(&self.next_offset.to_be_bytes());
        bytes
    }

    /// 依次读出数据行偏移和下一个节点偏移
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> CustomResult<IndexNode> {
        let dataset_offset = reader.read_i64().await?;
        let next_offset = reader.read_i64().await?;
        Ok(IndexNode::new(dataset_offset, next_offset))
    }
}

/// 组合键落在哪个桶
pub fn bucket_of(key: &str, bucket_count: u64) -> usize {
    (calc_hash(key) % bucket_count) as usize
}
