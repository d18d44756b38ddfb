use crate::store::track::{composite_key, TrackRecord};

pub const INVALID_QUERY_MSG: &str = "Error: Consulta inválida.";
pub const NO_RESULTS_MSG: &str = "No se encontraron resultados para la búsqueda.";
/// 一次查询最多读取的字节数
pub const MAX_QUERY_LENGTH: usize = 1024;

/// 一次查询：专辑和歌手必填，歌名可选（按子串、不区分大小写过滤）
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub album: String,
    pub artist: String,
    pub song: Option<String>,
}

impl Query {
    /// 专辑或歌手为空时返回 None
    pub fn new(album: &str, artist: &str, song: Option<&str>) -> Option<Query> {
        if album.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Query {
            album: album.to_string(),
            artist: artist.to_string(),
            song: song.filter(|s| !s.is_empty()).map(|s| s.to_string()),
        })
    }

    /// 解析 `album|artist|song`
    pub fn parse(raw: &str) -> Option<Query> {
        let raw = raw.trim_end_matches(|c: char| c == '\n' || c == '\r' || c == '\0');
        let mut parts = raw.split('|');
        let album = parts.next()?;
        let artist = parts.next()?;
        Query::new(album, artist, parts.next())
    }

    pub fn composite_key(&self) -> String {
        composite_key(&self.album, &self.artist)
    }

    /// 专辑、歌手必须完全一致（区分大小写），再按歌名过滤
    pub fn accepts(&self, record: &TrackRecord) -> bool {
        if record.album.as_deref() != Some(self.album.as_str())
            || record.artist.as_deref() != Some(self.artist.as_str())
        {
            return false;
        }
        match &self.song {
            None => true,
            Some(song) => {
                let song = song.to_lowercase();
                record
                    .title
                    .as_ref()
                    .map(|title| title.to_lowercase().contains(song.as_str()))
                    .unwrap_or(false)
            }
        }
    }

    pub fn to_wire(&self) -> String {
        format!(
            "{}|{}|{}",
            self.album,
            self.artist,
            self.song.as_deref().unwrap_or("")
        )
    }
}
