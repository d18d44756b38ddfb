//! spotify-index：基于磁盘哈希索引的专辑/歌手查询服务
//!
//! ```text
//! spotify-index [--config config.json] index
//! spotify-index [--config config.json] serve
//! spotify-index [--config config.json] query <host:port> <album> <artist> [song]
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::custom_err::{common_err, config_err, CustomResult};
use crate::index::builder::build_index;
use crate::server::search_manager::SearchManager;
use crate::server::{http, tcp};

mod client;
mod config;
mod custom_err;
mod http_param;
mod index;
mod server;
mod store;
#[cfg(test)]
mod test_fixture;

#[actix_web::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let (cnf, command) = match parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(parsed) => parsed,
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(cnf, &command).await {
        error!("{}", e);
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// 拆出 --config，剩下的是子命令和它的参数
fn parse_args(args: &[String]) -> CustomResult<(Config, Vec<String>)> {
    let mut config_path: Option<PathBuf> = None;
    let mut command = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| config_err(String::from("--config 缺少文件路径")))?;
                config_path = Some(PathBuf::from(path));
                i += 2;
            }
            "--help" | "-h" => return Err(config_err(String::new())),
            _ => {
                command.push(args[i].clone());
                i += 1;
            }
        }
    }

    let cnf = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    Ok((cnf, command))
}

async fn run(cnf: Config, command: &[String]) -> CustomResult<()> {
    match command.first().map(String::as_str) {
        Some("index") => {
            init_log(&cnf.log_config)?;
            build_index(&cnf.dataset_path, &cnf.index_path, cnf.bucket_count, cnf.progress_interval).await?;
            Ok(())
        }
        Some("serve") => {
            init_log(&cnf.log_config)?;
            serve(cnf).await
        }
        Some("query") => query(&cnf, &command[1..]).await,
        Some(other) => Err(common_err(format!("未知命令: {}", other))),
        None => Err(common_err(String::from("缺少命令"))),
    }
}

async fn serve(cnf: Config) -> CustomResult<()> {
    let sm = SearchManager::open(&cnf).await.map_err(|e| {
        common_err(format!(
            "无法加载索引{:?}或数据文件{:?}，请先执行 index 命令: {}",
            cnf.index_path, cnf.dataset_path, e
        ))
    })?;
    let listener = TcpListener::bind(&cnf.tcp_addr).await?;
    info!("查询服务监听:{}", cnf.tcp_addr);

    let cnf = Arc::new(cnf);
    let tcp_task = tokio::spawn(tcp::serve(listener, sm.clone(), cnf.clone()));
    match &cnf.http_addr {
        Some(addr) => http::run(addr, sm).await?,
        None => tcp_task.await.map_err(|e| common_err(e.to_string()))?,
    }
    Ok(())
}

async fn query(cnf: &Config, args: &[String]) -> CustomResult<()> {
    if args.len() < 3 {
        return Err(common_err(String::from(
            "用法: query <host:port> <album> <artist> [song]",
        )));
    }
    let response = client::send_query(
        &args[0],
        &args[1],
        &args[2],
        args.get(3).map(String::as_str),
        cnf.read_timeout(),
    )
    .await?;
    println!("{}", response);
    Ok(())
}

fn print_usage() {
    println!("Spotify 专辑/歌手索引与查询服务");
    println!();
    println!("用法:");
    println!("  spotify-index [--config <config.json>] index");
    println!("  spotify-index [--config <config.json>] serve");
    println!("  spotify-index [--config <config.json>] query <host:port> <album> <artist> [song]");
}

/// 初始化日志，找不到配置文件时只输出到控制台
pub fn init_log(config_path: &Path) -> CustomResult<()> {
    if config_path.exists() {
        log4rs::init_file(config_path, Default::default()).map_err(|e| common_err(e.to_string()))?;
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} {l} {M} - {m}{n}")))
            .build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
        log4rs::init_config(config)?;
    }
    info!("日志初始化成功！");
    Ok(())
}

/// djb2，按字节计算，溢出回绕
pub fn calc_hash(key: &str) -> u64 {
    key.bytes()
        .fold(5381u64, |hash, c| hash.wrapping_mul(33).wrapping_add(c as u64))
}

#[cfg(test)]
mod tests {
    use crate::{calc_hash, parse_args};

    #[test]
    fn test_calc_hash() {
        assert_eq!(calc_hash(""), 5381);
        assert_eq!(calc_hash("a"), 5381 * 33 + 97);
        assert_eq!(calc_hash("ab"), (5381 * 33 + 97) * 33 + 98);
        // 长键会溢出回绕，结果必须稳定
        let key = "Random Access Memories|Daft Punk".repeat(8);
        let manual = key.bytes().fold(5381u64, |h, c| (h << 5).wrapping_add(h).wrapping_add(c as u64));
        assert_eq!(calc_hash(&key), manual);
    }

    #[test]
    fn test_parse_args() {
        let args: Vec<String> = vec!["serve".to_string()];
        let (cnf, command) = parse_args(&args).unwrap();
        assert_eq!(command, vec!["serve"]);
        assert_eq!(cnf.tcp_addr, "0.0.0.0:8080");

        let args: Vec<String> = vec!["--config".to_string()];
        assert!(parse_args(&args).is_err());

        let args: Vec<String> = vec!["query", "127.0.0.1:8080", "Discovery", "Daft Punk"]
            .into_iter()
            .map(String::from)
            .collect();
        let (_, command) = parse_args(&args).unwrap();
        assert_eq!(command.len(), 4);
    }
}
