use serde::{Deserialize, Serialize};

use crate::server::query::Query;

/// 成功
pub const SUCCESS: usize = 10000;

#[derive(Serialize)]
pub struct View<T> {
    code: usize,
    data: T,
}

impl<T> View<T> {
    pub fn success(value: T) -> View<T> {
        View {
            code: SUCCESS,
            data: value,
        }
    }

    pub fn fail(code: usize, value: T) -> View<T> {
        View { code, data: value }
    }
}

/// /search 的查询参数
#[derive(Debug, Deserialize)]
pub struct SearchParam {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
}

impl SearchParam {
    pub fn to_query(&self) -> Option<Query> {
        Query::new(
            self.album.as_deref().unwrap_or(""),
            self.artist.as_deref().unwrap_or(""),
            self.song.as_deref(),
        )
    }
}
