//! 索引文件格式
//!
//! ```text
//! [header 24 字节][bucket 数组 bucket_count * 8 字节][node, node, ...]
//! ```
//!
//! header: magic(4) | version(u32) | bucket_count(u64) | node_size(u32) | reserved(u32)，
//! 所有整数都是大端序。bucket 中保存链表头节点在文件中的绝对位置，空桶为 -1；
//! node 为 (数据行偏移, 下一个节点偏移)，按扫描 csv 的顺序追加。

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::custom_err::{index_format_err, CustomResult};
use crate::index::{NODE_SIZE, SLOT_SIZE};

pub const MAGIC: [u8; 4] = *b"SPIX";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: u64 = 24;
/// bucket 数组加上 header 不能超出 u64 能表示的文件大小
pub const MAX_BUCKET_COUNT: u64 = (u64::MAX - HEADER_SIZE) / SLOT_SIZE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHeader {
    pub version: u32,
    pub bucket_count: u64,
    pub node_size: u32,
}

impl IndexHeader {
    pub fn new(bucket_count: u64) -> Self {
        IndexHeader {
            version: FORMAT_VERSION,
            bucket_count,
            node_size: NODE_SIZE as u32,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&self.version.to_be_bytes());
        bytes[8..16].copy_from_slice(&self.bucket_count.to_be_bytes());
        bytes[16..20].copy_from_slice(&self.node_size.to_be_bytes());
        bytes
    }

    /// 从文件开头读取并校验 header
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> CustomResult<IndexHeader> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).await?;
        if magic != MAGIC {
            return Err(index_format_err(String::from("不是索引文件，magic 不匹配")));
        }

        let version = reader.read_u32().await?;
        if version != FORMAT_VERSION {
            return Err(index_format_err(format!(
                "索引版本{}不支持，当前版本{}",
                version, FORMAT_VERSION
            )));
        }

        let bucket_count = reader.read_u64().await?;
        if bucket_count == 0 || bucket_count > MAX_BUCKET_COUNT {
            return Err(index_format_err(format!("bucket_count={}不合法", bucket_count)));
        }

        let node_size = reader.read_u32().await?;
        if node_size as u64 != NODE_SIZE {
            return Err(index_format_err(format!("节点大小{}与{}不一致", node_size, NODE_SIZE)));
        }
        reader.read_u32().await?;

        Ok(IndexHeader {
            version,
            bucket_count,
            node_size,
        })
    }

    /// 第一个节点在文件中的位置
    pub fn nodes_start(&self) -> u64 {
        HEADER_SIZE + self.bucket_count * SLOT_SIZE
    }
}
