use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config::Config;
use crate::custom_err::CustomResult;
use crate::server::query::{Query, INVALID_QUERY_MSG, MAX_QUERY_LENGTH};
use crate::server::search_manager::SearchManager;

/// 接收连接，每个连接交给一个独立的任务处理，accept 循环本身不等待查询
pub async fn serve(listener: TcpListener, sm: SearchManager, cnf: Arc<Config>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("accept 失败: {}", e);
                continue;
            }
        };

        let sm = sm.clone();
        let cnf = cnf.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, peer, &sm, &cnf).await {
                warn!("连接{}处理失败: {}", peer, e);
            }
        });
    }
}

/// 一次读取查询，一次写回结果，然后关闭连接
async fn handle_client(mut stream: TcpStream, peer: SocketAddr, sm: &SearchManager, cnf: &Config) -> CustomResult<()> {
    let mut buffer = vec![0u8; MAX_QUERY_LENGTH];
    let n = timeout(cnf.read_timeout(), stream.read(&mut buffer)).await??;
    if n == 0 {
        return Ok(());
    }

    let raw = String::from_utf8_lossy(&buffer[..n]);
    let response = match Query::parse(&raw) {
        Some(query) => {
            info!("IP {} : Album '{}' | Artista '{}'", peer.ip(), query.album, query.artist);
            let result = sm.search(&query).await;
            result.text().to_string()
        }
        None => {
            info!("IP {} : 无效查询 {:?}", peer.ip(), raw);
            String::from(INVALID_QUERY_MSG)
        }
    };

    timeout(cnf.write_timeout(), async {
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    })
    .await??;
    Ok(())
}
