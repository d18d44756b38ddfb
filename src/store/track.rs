use serde::Serialize;

use crate::store::artist::extract_artist;
use crate::store::field_codec::get_field;
use crate::store::{ALBUM_FIELD, ARTISTS_FIELD, DURATION_FIELD, POPULARITY_FIELD, TITLE_FIELD};

const NOT_AVAILABLE: &str = "N/A";
const SEPARATOR: &str = "--------------------------------------------------";

/// 数据集中的一首歌，字段缺失时为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub duration_ms: Option<String>,
    pub popularity: Option<String>,
}

impl TrackRecord {
    pub fn parse(line: &str) -> TrackRecord {
        TrackRecord {
            album: get_field(line, ALBUM_FIELD),
            artist: get_field(line, ARTISTS_FIELD).map(|raw| extract_artist(&raw)),
            title: get_field(line, TITLE_FIELD),
            duration_ms: get_field(line, DURATION_FIELD),
            popularity: get_field(line, POPULARITY_FIELD),
        }
    }

    /// 毫秒转成 "x min y seg"，直接截断
    pub fn duration_text(&self) -> String {
        match &self.duration_ms {
            Some(raw) => {
                let ms = parse_leading_int(raw);
                format!("{} min {} seg", ms / 60000, (ms % 60000) / 1000)
            }
            None => String::from(NOT_AVAILABLE),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Álbum: {}\nArtista: {}\nCanción: {}\nDuración: {}\nPopularidad: {}\n{}\n",
            or_na(&self.album),
            or_na(&self.artist),
            or_na(&self.title),
            self.duration_text(),
            or_na(&self.popularity),
            SEPARATOR
        )
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// 组合键：专辑名|歌手名
pub fn composite_key(album: &str, artist: &str) -> String {
    format!("{}|{}", album, artist)
}

/// 建索引时使用的键，专辑或歌手字段缺失、或键长度不超过1时不建索引
pub fn index_key(line: &str) -> Option<String> {
    let album = get_field(line, ALBUM_FIELD)?;
    let artists = get_field(line, ARTISTS_FIELD)?;
    let key = composite_key(&album, &extract_artist(&artists));
    if key.len() > 1 {
        Some(key)
    } else {
        None
    }
}

/// 只解析开头的整数部分，解析不出来时为0
pub fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use crate::store::track::{composite_key, index_key, parse_leading_int, TrackRecord};

    const LINE: &str = "Random Access Memories,gid,1,\"[{'artist_gid': 'x', 'artist_name': 'Daft Punk', 'role': 'ARTIST_ROLE_MAIN_ARTIST'}]\",false,369626,8,Get Lucky,tgid,82\n";

    #[test]
    fn test_parse_and_render() {
        let record = TrackRecord::parse(LINE);
        assert_eq!(record.album.as_deref(), Some("Random Access Memories"));
        assert_eq!(record.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(record.title.as_deref(), Some("Get Lucky"));

        let text = record.render();
        assert_eq!(
            text,
            "Álbum: Random Access Memories\nArtista: Daft Punk\nCanción: Get Lucky\n\
             Duración: 6 min 9 seg\nPopularidad: 82\n\
             --------------------------------------------------\n"
        );
    }

    #[test]
    fn test_missing_fields() {
        let record = TrackRecord::parse("Solo Album,gid,1,\"[{'artist_name': 'Someone'}]\"");
        let text = record.render();
        assert!(text.contains("Canción: N/A\n"));
        assert!(text.contains("Duración: N/A\n"));
        assert!(text.contains("Popularidad: N/A\n"));
    }

    #[test]
    fn test_index_key() {
        assert_eq!(index_key(LINE), Some(composite_key("Random Access Memories", "Daft Punk")));
        // 只有 "|"，长度为1
        assert_eq!(index_key(",gid,1,,x"), None);
        assert_eq!(index_key("only album"), None);
        assert_eq!(index_key("A,gid,1,"), Some(String::from("A|")));
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("369626"), 369626);
        assert_eq!(parse_leading_int(" 1500.7"), 1500);
        assert_eq!(parse_leading_int("-42ms"), -42);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
    }
}
