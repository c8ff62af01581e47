// crates/wq_config/src/error.rs

//! 配置层错误类型

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] serde_json::Error),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: &'static str,
        /// 配置值
        value: f64,
        /// 原因
        reason: &'static str,
    },
}

impl ConfigError {
    /// 无效值
    pub fn invalid(key: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidValue { key, value, reason }
    }

    /// 要求值为正
    #[inline]
    pub fn require_positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(Self::invalid(key, value, "必须为正"))
        }
    }

    /// 要求值非负
    #[inline]
    pub fn require_non_negative(key: &'static str, value: f64) -> Result<(), ConfigError> {
        if value >= 0.0 {
            Ok(())
        } else {
            Err(Self::invalid(key, value, "不得为负"))
        }
    }
}
