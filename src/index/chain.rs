use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncSeekExt, SeekFrom};

use crate::custom_err::{index_format_err, CustomResult};
use crate::index::bucket_table::BucketTable;
use crate::index::{IndexNode, EMPTY_SLOT};

/// 按位置读取索引节点，每个连接单独打开一份
pub struct IndexReader {
    file: File,
    table: Arc<BucketTable>,
}

impl IndexReader {
    pub async fn open(path: &Path, table: Arc<BucketTable>) -> CustomResult<IndexReader> {
        let file = File::open(path).await?;
        Ok(IndexReader { file, table })
    }

    /// 读取 offset 处的节点
    ///
    /// 节点总是插在链表头，所以 next_offset 只能指向更靠前的节点，否则视为索引损坏，
    /// 这样遍历一定会结束。
    pub async fn read_node(&mut self, offset: i64) -> CustomResult<IndexNode> {
        if !self.table.is_node_offset(offset) {
            return Err(index_format_err(format!("节点位置{}越界", offset)));
        }
        self.file.seek(SeekFrom::Start(offset as u64)).await?;
        let node = IndexNode::read_from(&mut self.file).await?;
        if node.next_offset != EMPTY_SLOT && node.next_offset >= offset {
            return Err(index_format_err(format!(
                "节点{}的next_offset={}没有指向前面的节点",
                offset, node.next_offset
            )));
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::custom_err::INDEX_FORMAT_ERR;
    use crate::index::bucket_table::BucketTable;
    use crate::index::chain::IndexReader;
    use crate::index::format::IndexHeader;
    use crate::index::{IndexNode, EMPTY_SLOT, NODE_SIZE};

    /// 手工拼一个只有一个桶的索引文件
    fn write_index(path: &std::path::Path, head: i64, nodes: &[IndexNode]) {
        let header = IndexHeader::new(1);
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&head.to_be_bytes());
        for node in nodes {
            bytes.extend_from_slice(&node.to_bytes());
        }
        std::fs::write(path, &bytes).unwrap();
    }

    #[tokio::test]
    async fn test_walk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.index");
        let start = IndexHeader::new(1).nodes_start() as i64;
        write_index(
            &path,
            start + NODE_SIZE as i64,
            &[IndexNode::new(10, EMPTY_SLOT), IndexNode::new(20, start)],
        );

        let table = Arc::new(BucketTable::load(&path).await.unwrap());
        let mut reader = IndexReader::open(&path, table.clone()).await.unwrap();

        let mut offset = table.head("whatever");
        let mut visited = vec![];
        while offset != EMPTY_SLOT {
            let node = reader.read_node(offset).await.unwrap();
            visited.push(node.dataset_offset);
            offset = node.next_offset;
        }
        assert_eq!(visited, vec![20, 10]);
    }

    #[tokio::test]
    async fn test_reject_forward_link() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.index");
        let start = IndexHeader::new(1).nodes_start() as i64;
        // 节点指向自己
        write_index(&path, start, &[IndexNode::new(10, start)]);

        let table = Arc::new(BucketTable::load(&path).await.unwrap());
        let mut reader = IndexReader::open(&path, table).await.unwrap();
        assert_eq!(reader.read_node(start).await.unwrap_err().code, INDEX_FORMAT_ERR);
        assert!(reader.read_node(start + 3).await.is_err());
        assert!(reader.read_node(start + NODE_SIZE as i64).await.is_err());
    }
}
