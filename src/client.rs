use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::custom_err::{common_err, CustomError, CustomResult, INVALID_QUERY_ERR};
use crate::server::query::Query;

pub const MISSING_FIELDS_MSG: &str = "Error: Los campos de Álbum y Artista son obligatorios.";
pub const NO_RESPONSE_MSG: &str = "No se recibió respuesta del servidor o la conexión se cerró.";

/// 发送一次查询并读取完整响应
pub async fn send_query(
    addr: &str,
    album: &str,
    artist: &str,
    song: Option<&str>,
    limit: Duration,
) -> CustomResult<String> {
    let query = Query::new(album, artist, song).ok_or_else(|| CustomError {
        code: INVALID_QUERY_ERR,
        message: String::from(MISSING_FIELDS_MSG),
    })?;

    let mut stream = timeout(limit, TcpStream::connect(addr))
        .await?
        .map_err(|e| common_err(format!("Error: No se pudo conectar al servidor en {}. {}", addr, e)))?;
    timeout(limit, stream.write_all(query.to_wire().as_bytes())).await??;

    let mut buffer = Vec::new();
    timeout(limit, stream.read_to_end(&mut buffer)).await??;
    if buffer.is_empty() {
        return Err(common_err(String::from(NO_RESPONSE_MSG)));
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
