use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AppResult};

/// 默认配置文件路径
const CONFIG_FILE: &str = "quizgen.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 生成服务基础地址
    pub api_base_url: String,
    /// 请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 启动时上传并生成题目的本地文件（可选）
    pub upload_file: Option<String>,
    /// 每份文档生成的题目数量
    pub num_questions: usize,
    /// 文档列表每页条数（5 / 10 / 20）
    pub page_size: usize,
    /// 文档列表搜索关键词（可选）
    pub search_query: Option<String>,
    /// 是否为列表当前页的文档重新生成题目
    pub regenerate_listed: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 120,
            upload_file: None,
            num_questions: 5,
            page_size: 10,
            search_query: None,
            regenerate_listed: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::overlay_env(Self::default())
    }

    /// 加载配置
    ///
    /// 存在 quizgen.toml 时先读取文件，环境变量仍可覆盖文件中的值
    pub fn load() -> Self {
        let base = if std::path::Path::new(CONFIG_FILE).exists() {
            match Self::from_file(CONFIG_FILE) {
                Ok(config) => config,
                Err(e) => {
                    warn!("⚠️ 读取配置文件 {} 失败: {}，使用默认配置", CONFIG_FILE, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        Self::overlay_env(base)
    }

    /// 从 TOML 文件加载配置
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::file(path, e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 在 `base` 的基础上用环境变量覆盖各项配置
    fn overlay_env(base: Self) -> Self {
        Self {
            api_base_url: std::env::var("QUIZGEN_API_BASE_URL").unwrap_or(base.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.request_timeout_secs),
            upload_file: std::env::var("UPLOAD_FILE").ok().or(base.upload_file),
            num_questions: std::env::var("NUM_QUESTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.num_questions),
            page_size: std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.page_size),
            search_query: std::env::var("SEARCH_QUERY").ok().or(base.search_query),
            regenerate_listed: std::env::var("REGENERATE_LISTED").ok().and_then(|v| v.parse().ok()).unwrap_or(base.regenerate_listed),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.num_questions, 5);
        assert_eq!(config.page_size, 10);
        assert!(config.upload_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_base_url = "http://192.168.1.10:8000"
            page_size = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://192.168.1.10:8000");
        assert_eq!(config.page_size, 20);
        // 未出现在文件中的字段保持默认值
        assert_eq!(config.num_questions, 5);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = toml::from_str::<Config>("page_size = \"twenty\"");
        assert!(result.is_err());
    }
}
