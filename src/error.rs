use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 本地校验错误（未发起任何网络请求）
    #[error("校验错误: {0}")]
    Validation(String),

    /// 服务端返回非 2xx 状态
    #[error("请求失败 ({endpoint}): HTTP {status} {reason}")]
    Transport {
        endpoint: String,
        status: u16,
        reason: String,
    },

    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 其他错误（网络中断、响应解析失败等）
    #[error("错误: {0}")]
    Unexpected(String),
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Unexpected(format!("请求超时: {}", err))
        } else if err.is_connect() {
            AppError::Unexpected(format!("无法连接到生成服务: {}", err))
        } else {
            AppError::Unexpected(err.to_string())
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(format!("TOML解析失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建校验错误
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// 创建传输错误（非 2xx 响应）
    pub fn transport(endpoint: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        AppError::Transport {
            endpoint: endpoint.into(),
            status,
            reason: reason.into(),
        }
    }

    /// 创建文件操作错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建其他错误
    pub fn unexpected(msg: impl Into<String>) -> Self {
        AppError::Unexpected(msg.into())
    }

    /// 是否为本地校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_contains_status_and_reason() {
        let err = AppError::transport("/upload", 500, "Internal Server Error");
        let msg = err.to_string();
        assert!(msg.contains("/upload"));
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn test_validation_display() {
        let err = AppError::validation("请先选择要上传的文件");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "校验错误: 请先选择要上传的文件");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parse_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Config(_)));
    }
}
