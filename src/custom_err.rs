pub type CustomResult<T> = std::result::Result<T, CustomError>;

/// 通用错误
pub const COMMON_ERR: usize = 10001;
/// 文件/网络读写错误
pub const IO_ERR: usize = 10002;
/// 索引文件格式错误
pub const INDEX_FORMAT_ERR: usize = 10003;
/// 超时
pub const TIMEOUT_ERR: usize = 10004;
/// 配置错误
pub const CONFIG_ERR: usize = 10005;
/// 查询参数错误
pub const INVALID_QUERY_ERR: usize = 10006;

#[derive(Debug, PartialEq)]
pub struct CustomError {
    pub code: usize,
    pub message: String,
}

pub fn common_err(msg: String) -> CustomError {
    CustomError {
        code: COMMON_ERR,
        message: msg,
    }
}

pub fn index_format_err(msg: String) -> CustomError {
    CustomError {
        code: INDEX_FORMAT_ERR,
        message: msg,
    }
}

pub fn config_err(msg: String) -> CustomError {
    CustomError {
        code: CONFIG_ERR,
        message: msg,
    }
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CustomError {}

impl From<std::io::Error> for CustomError {
    fn from(e: std::io::Error) -> Self {
        CustomError {
            code: IO_ERR,
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for CustomError {
    fn from(e: serde_json::Error) -> Self {
        config_err(e.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for CustomError {
    fn from(e: tokio::time::error::Elapsed) -> Self {
        CustomError {
            code: TIMEOUT_ERR,
            message: e.to_string(),
        }
    }
}

impl From<log::SetLoggerError> for CustomError {
    fn from(e: log::SetLoggerError) -> Self {
        common_err(e.to_string())
    }
}

impl From<log4rs::config::runtime::ConfigErrors> for CustomError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        config_err(e.to_string())
    }
}
