//! 全局错误处理机制

use thiserror::Error;

/// Augur 统一错误类型
#[derive(Error, Debug)]
pub enum AugurError {
    #[error("No engines registered for this run")]
    NoEngines,

    #[error("Duplicate engine id: {0}")]
    DuplicateEngine(String),

    #[error("Invalid engine: {0}")]
    InvalidEngine(String),

    #[error("Precondition error: {0}")]
    Precondition(String),

    /// 引擎执行失败，消息即引擎自身给出的错误文本
    #[error("{0}")]
    EngineExecution(String),

    #[error("Engine timed out after {0} ms")]
    Timeout(u64),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AugurError {
    /// 便捷构造: 引擎执行失败
    pub fn engine(message: impl Into<String>) -> Self {
        AugurError::EngineExecution(message.into())
    }
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, AugurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_displays_bare_message() {
        assert_eq!(AugurError::engine("boom").to_string(), "boom");
        assert_eq!(AugurError::Timeout(250).to_string(), "Engine timed out after 250 ms");
    }
}
