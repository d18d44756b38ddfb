const ARTIST_NAME_KEY: &str = "'artist_name': '";

/// 从 artists 字段（python 字典列表的文本形式）中取第一个 artist_name
///
/// 找不到标记或者找不到结尾的单引号时，原样返回整个字段。
pub fn extract_artist(raw: &str) -> String {
    let start = match raw.find(ARTIST_NAME_KEY) {
        Some(i) => i + ARTIST_NAME_KEY.len(),
        None => return raw.to_string(),
    };
    let rest = &raw[start..];
    match rest.find('\'') {
        Some(end) => rest[..end].to_string(),
        None => raw.to_string(),
    }
}
