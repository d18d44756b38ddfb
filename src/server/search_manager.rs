use std::path::PathBuf;
use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::config::Config;
use crate::custom_err::{index_format_err, CustomResult};
use crate::index::bucket_table::{BucketTable, IndexStats};
use crate::index::chain::IndexReader;
use crate::index::EMPTY_SLOT;
use crate::server::query::{Query, NO_RESULTS_MSG};
use crate::store::track::TrackRecord;
use crate::store::ReadableFile;

/// 查询入口，clone 之后交给每个连接使用
///
/// bucket 数组只读共享；索引文件和数据文件每次查询各自打开，文件指针互不干扰。
#[derive(Clone)]
pub struct SearchManager {
    table: Arc<BucketTable>,
    dataset_path: Arc<PathBuf>,
    index_path: Arc<PathBuf>,
    max_response_bytes: usize,
}

/// 一次查询的结果，text 为拼接好的响应文本
#[derive(Debug, Default, Serialize)]
pub struct SearchResult {
    pub records: Vec<TrackRecord>,
    // 超出响应大小而丢弃的匹配数
    pub dropped: usize,
    #[serde(skip)]
    text: String,
}

impl SearchResult {
    fn push(&mut self, record: TrackRecord, max_bytes: usize) {
        let rendered = record.render();
        if self.text.len() + rendered.len() < max_bytes {
            self.text.push_str(&rendered);
            self.records.push(record);
        } else {
            self.dropped += 1;
        }
    }

    /// 发回给客户端的文本，没有匹配时为固定提示
    pub fn text(&self) -> &str {
        if self.records.is_empty() {
            NO_RESULTS_MSG
        } else {
            &self.text
        }
    }
}

impl SearchManager {
    /// 加载 bucket 数组并确认数据文件可读，任何一个失败都无法提供服务
    pub async fn open(cnf: &Config) -> CustomResult<SearchManager> {
        let table = BucketTable::load(&cnf.index_path).await?;
        ReadableFile::open(&cnf.dataset_path).await?;

        Ok(SearchManager {
            table: Arc::new(table),
            dataset_path: Arc::new(cnf.dataset_path.clone()),
            index_path: Arc::new(cnf.index_path.clone()),
            max_response_bytes: cnf.max_response_bytes,
        })
    }

    /// 遍历组合键所在的链表，逐条回数据文件核对
    ///
    /// 遍历过程中出现读错误或索引损坏时停止，返回已经找到的结果。
    pub async fn search(&self, query: &Query) -> SearchResult {
        let mut result = SearchResult::default();
        let key = query.composite_key();
        let head = self.table.head(&key);
        if head == EMPTY_SLOT {
            return result;
        }

        if let Err(e) = self.walk_chain(head, query, &mut result).await {
            warn!("遍历链表中断, key={}, 已找到{}条, err={}", key, result.records.len(), e);
        }
        result
    }

    async fn walk_chain(&self, head: i64, query: &Query, result: &mut SearchResult) -> CustomResult<()> {
        let mut index = IndexReader::open(&self.index_path, self.table.clone()).await?;
        let mut dataset = ReadableFile::open(&self.dataset_path).await?;

        let mut offset = head;
        while offset != EMPTY_SLOT {
            let node = index.read_node(offset).await?;
            let line = dataset
                .read_line_at(node.dataset_offset)
                .await?
                .ok_or_else(|| index_format_err(format!("数据行位置{}超出数据文件", node.dataset_offset)))?;

            let record = TrackRecord::parse(&line);
            if query.accepts(&record) {
                result.push(record, self.max_response_bytes);
            }
            offset = node.next_offset;
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        self.table.stats()
    }
}
