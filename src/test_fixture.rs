//! 测试用的数据集和索引

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::index::builder::build_index;
use crate::server::search_manager::SearchManager;

pub const HEADER: &str =
    "album_name,album_gid,disc_number,artists,explicit,duration_ms,track_number,name,track_gid,popularity";

fn quote(value: &str) -> String {
    if value.contains(',') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

/// 一行数据，字段位置和真实数据集一致
pub fn row(album: &str, artist: &str, title: &str, duration_ms: &str, popularity: &str) -> String {
    format!(
        "{},a1b2,1,\"[{{'artist_gid': 'f81b1179', 'artist_name': '{}', 'role': 'ARTIST_ROLE_MAIN_ARTIST'}}]\",false,{},1,{},t9c8,{}",
        quote(album),
        artist,
        duration_ms,
        quote(title),
        popularity
    )
}

/// 写入表头和数据行，返回文件路径和每一行的起始位置
pub fn write_dataset(dir: &Path, rows: &[String]) -> (PathBuf, Vec<u64>) {
    let path = dir.join("spotify_data.csv");
    let mut content = format!("{}\n", HEADER);
    let mut offsets = Vec::with_capacity(rows.len());
    for row in rows {
        offsets.push(content.len() as u64);
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    (path, offsets)
}

pub fn fixture_config(dir: &Path, bucket_count: u64, max_response_bytes: usize) -> Config {
    Config {
        bucket_count,
        max_response_bytes,
        tcp_addr: String::from("127.0.0.1:0"),
        http_addr: None,
        read_timeout_ms: 500,
        write_timeout_ms: 500,
        dataset_path: dir.join("spotify_data.csv"),
        index_path: dir.join("spotify.index"),
        ..Config::default()
    }
}

pub async fn open_fixture_with(
    dir: &Path,
    rows: &[String],
    bucket_count: u64,
    max_response_bytes: usize,
) -> SearchManager {
    let cnf = fixture_config(dir, bucket_count, max_response_bytes);
    write_dataset(dir, rows);
    build_index(&cnf.dataset_path, &cnf.index_path, cnf.bucket_count, cnf.progress_interval)
        .await
        .unwrap();
    SearchManager::open(&cnf).await.unwrap()
}

pub async fn open_fixture(dir: &Path, rows: &[String]) -> SearchManager {
    open_fixture_with(dir, rows, 1024, 65536).await
}
