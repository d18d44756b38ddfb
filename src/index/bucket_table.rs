use std::path::Path;

use log::info;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};

use crate::custom_err::{index_format_err, CustomResult};
use crate::index::format::{IndexHeader, HEADER_SIZE};
use crate::index::{bucket_of, EMPTY_SLOT, NODE_SIZE, SLOT_SIZE};

/// 常驻内存的 bucket 数组，加载后只读，可以在所有连接之间共享
#[derive(Debug)]
pub struct BucketTable {
    header: IndexHeader,
    slots: Vec<i64>,
    // 索引文件总大小，用来校验节点位置
    file_len: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub version: u32,
    pub bucket_count: u64,
    pub occupied_buckets: u64,
    pub node_count: u64,
}

impl BucketTable {
    /// 从索引文件加载 header 和 bucket 数组，并校验每个非空桶都指向节点区
    pub async fn load(path: &Path) -> CustomResult<BucketTable> {
        info!("开始加载索引:{:?}", path);
        let mut file = File::open(path).await?;
        let file_len = file.metadata().await?.len();
        if file_len < HEADER_SIZE {
            return Err(index_format_err(format!("索引文件{:?}太小", path)));
        }

        let header = IndexHeader::read_from(&mut file).await?;
        let nodes_start = header.nodes_start();
        if file_len < nodes_start || (file_len - nodes_start) % NODE_SIZE != 0 {
            return Err(index_format_err(format!(
                "索引文件大小{}与bucket_count={}不匹配",
                file_len, header.bucket_count
            )));
        }

        let slots_len = usize::try_from(header.bucket_count * SLOT_SIZE)
            .map_err(|_| index_format_err(format!("bucket_count={}过大", header.bucket_count)))?;
        let mut reader = BufReader::new(file).take(slots_len as u64);
        let mut slots = Vec::with_capacity(slots_len / SLOT_SIZE as usize);
        for _ in 0..header.bucket_count {
            slots.push(reader.read_i64().await?);
        }
        if slots.len() as u64 != header.bucket_count {
            return Err(index_format_err(format!(
                "bucket 数量{}与header中的{}不一致",
                slots.len(),
                header.bucket_count
            )));
        }

        let table = BucketTable {
            header,
            slots,
            file_len,
        };
        if let Some((bucket, slot)) = table
            .slots
            .iter()
            .enumerate()
            .find(|(_, slot)| **slot != EMPTY_SLOT && !table.is_node_offset(**slot))
        {
            return Err(index_format_err(format!("bucket[{}]={}不是合法的节点位置", bucket, slot)));
        }

        info!(
            "索引加载完成, bucket_count={}, node_count={}",
            table.header.bucket_count,
            table.node_count()
        );
        Ok(table)
    }

    /// 组合键所在链表的头节点位置，空桶为 -1
    pub fn head(&self, key: &str) -> i64 {
        self.slots
            .get(bucket_of(key, self.header.bucket_count))
            .copied()
            .unwrap_or(EMPTY_SLOT)
    }

    /// 位于节点区内，且按节点大小对齐
    pub fn is_node_offset(&self, offset: i64) -> bool {
        if offset < 0 {
            return false;
        }
        let offset = offset as u64;
        let nodes_start = self.header.nodes_start();
        offset >= nodes_start
            && offset + NODE_SIZE <= self.file_len
            && (offset - nodes_start) % NODE_SIZE == 0
    }

    pub fn node_count(&self) -> u64 {
        (self.file_len - self.header.nodes_start()) / NODE_SIZE
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            version: self.header.version,
            bucket_count: self.header.bucket_count,
            occupied_buckets: self.slots.iter().filter(|s| **s != EMPTY_SLOT).count() as u64,
            node_count: self.node_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::custom_err::INDEX_FORMAT_ERR;
    use crate::index::bucket_table::BucketTable;
    use crate::index::builder::build_index;
    use crate::index::format::{IndexHeader, HEADER_SIZE};
    use crate::index::{EMPTY_SLOT, NODE_SIZE};
    use crate::store::track::composite_key;
    use crate::test_fixture::{row, write_dataset};

    #[tokio::test]
    async fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            row("Discovery", "Daft Punk", "Digital Love", "301373", "72"),
            row("Homework", "Daft Punk", "Around the World", "429533", "74"),
        ];
        let (dataset, _) = write_dataset(dir.path(), &rows);
        let index = dir.path().join("spotify.index");
        build_index(&dataset, &index, 32, 10).await.unwrap();

        let table = BucketTable::load(&index).await.unwrap();
        let stats = table.stats();
        assert_eq!(stats.bucket_count, 32);
        assert_eq!(stats.node_count, 2);
        assert!(stats.occupied_buckets >= 1 && stats.occupied_buckets <= 2);

        let head = table.head(&composite_key("Homework", "Daft Punk"));
        assert!(table.is_node_offset(head));
        assert!(!table.is_node_offset(head + 1));
        assert!(!table.is_node_offset(HEADER_SIZE as i64));
        assert!(!table.is_node_offset(EMPTY_SLOT));
    }

    #[tokio::test]
    async fn test_reject_bad_slot() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("bad.index");
        let header = IndexHeader::new(2);
        let mut bytes = header.encode().to_vec();
        // bucket[0] 指向 header 内部
        bytes.extend_from_slice(&4i64.to_be_bytes());
        bytes.extend_from_slice(&EMPTY_SLOT.to_be_bytes());
        std::fs::write(&index, &bytes).unwrap();

        let err = BucketTable::load(&index).await.unwrap_err();
        assert_eq!(err.code, INDEX_FORMAT_ERR);
    }

    #[tokio::test]
    async fn test_reject_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("short.index");
        let mut bytes = IndexHeader::new(4).encode().to_vec();
        bytes.extend_from_slice(&[0xff; 8]);
        std::fs::write(&index, &bytes).unwrap();
        assert!(BucketTable::load(&index).await.is_err());

        // 节点区长度不是节点大小的整数倍
        let mut bytes = IndexHeader::new(1).encode().to_vec();
        bytes.extend_from_slice(&[0xff; 8]);
        bytes.extend_from_slice(&vec![0u8; NODE_SIZE as usize - 1]);
        std::fs::write(&index, &bytes).unwrap();
        assert!(BucketTable::load(&index).await.is_err());
    }

    #[tokio::test]
    async fn test_reject_oversized_bucket_count() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("huge.index");

        // 只有 header 的文件，bucket 数组大小溢出 u64
        std::fs::write(&index, IndexHeader::new(1u64 << 61).encode()).unwrap();
        assert_eq!(BucketTable::load(&index).await.unwrap_err().code, INDEX_FORMAT_ERR);

        // 不溢出，但文件里没有对应的 bucket 数组
        std::fs::write(&index, IndexHeader::new(1u64 << 40).encode()).unwrap();
        assert_eq!(BucketTable::load(&index).await.unwrap_err().code, INDEX_FORMAT_ERR);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BucketTable::load(&dir.path().join("nope.index")).await.is_err());
    }
}
