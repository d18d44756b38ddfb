use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::custom_err::{config_err, CustomResult};
use crate::index::HASH_TABLE_SIZE;

/// 一次响应最多携带的字节数，超出的匹配结果直接丢弃
pub const MAX_RESULTS_BUFFER: usize = 65536;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    // 源数据 csv
    pub dataset_path: PathBuf,
    // 索引文件
    pub index_path: PathBuf,
    // 查询协议监听地址
    pub tcp_addr: String,
    // http 接口监听地址，为空时不启动
    pub http_addr: Option<String>,
    // 建索引时使用的桶数量
    pub bucket_count: u64,
    // 每处理多少行打印一次进度
    pub progress_interval: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_response_bytes: usize,
    // log4rs 配置文件
    pub log_config: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dataset_path: PathBuf::from("spotify_data.csv"),
            index_path: PathBuf::from("spotify.index"),
            tcp_addr: String::from("0.0.0.0:8080"),
            http_addr: Some(String::from("127.0.0.1:8848")),
            bucket_count: HASH_TABLE_SIZE,
            progress_interval: 100_000,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            max_response_bytes: MAX_RESULTS_BUFFER,
            log_config: PathBuf::from("log4rs.yaml"),
        }
    }
}

impl Config {
    /// 从 json 文件读取配置，未出现的字段使用默认值
    pub fn from_file(path: &Path) -> CustomResult<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_err(format!("读取配置文件{:?}失败: {}", path, e)))?;
        let cnf: Config = serde_json::from_str(&content)?;
        cnf.validate()?;
        Ok(cnf)
    }

    pub fn validate(&self) -> CustomResult<()> {
        if self.bucket_count == 0 {
            return Err(config_err(String::from("bucket_count 必须大于0")));
        }
        if self.progress_interval == 0 {
            return Err(config_err(String::from("progress_interval 必须大于0")));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
