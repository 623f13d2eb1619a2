//! HTTP 生成服务客户端
//!
//! 通过 reqwest 调用生成服务的 REST 接口
//!
//! 服务端接口：
//! - GET  /documents?limit=L&offset=O&q=Q   列出文档（q 为空时省略）
//! - POST /upload                           上传文件（multipart，字段名 file）
//! - POST /generate                         生成题目（JSON）
//! - GET  /files/{doc_id}                   下载原始文件（仅拼接链接，不请求）
//! - GET  /health                           健康检查

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use tracing::debug;

use crate::clients::GenerationApi;
use crate::error::{AppError, AppResult};
use crate::models::{
    Document, DocumentListResponse, GenerateRequest, GenerateResponse, Mcq, UploadResponse,
};

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// 生成服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 生成服务客户端
pub struct HttpGenerationClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpGenerationClient {
    /// 创建新的客户端
    pub fn new(config: HttpClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::unexpected(format!("构建 HTTP 客户端失败: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> AppResult<Self> {
        Self::new(HttpClientConfig::default())
    }

    fn documents_url(&self) -> String {
        format!("{}/documents", self.config.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.config.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url)
    }

    /// 校验响应状态，非 2xx 转为传输错误
    fn ensure_success(endpoint: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::transport(
                endpoint,
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ))
        }
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationClient {
    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
        query: Option<&str>,
    ) -> AppResult<Vec<Document>> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        // 关键词为空时整个省略 q 参数
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }

        debug!("📄 请求文档列表: limit={} offset={} q={:?}", limit, offset, query);

        let response = self
            .client
            .get(self.documents_url())
            .query(&params)
            .send()
            .await?;
        let response = Self::ensure_success("/documents", response)?;
        let body: DocumentListResponse = response.json().await?;

        Ok(body.documents)
    }

    async fn upload_document(&self, filename: &str, data: Vec<u8>) -> AppResult<String> {
        let part = multipart::Part::bytes(data).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        let response = Self::ensure_success("/upload", response)?;
        let body: UploadResponse = response.json().await?;

        debug!("📤 上传完成: doc_id={}", body.doc_id);
        Ok(body.doc_id)
    }

    async fn generate_mcqs(&self, doc_id: &str, num_questions: usize) -> AppResult<Vec<Mcq>> {
        let request = GenerateRequest {
            doc_id: doc_id.to_string(),
            num_questions,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await?;
        let response = Self::ensure_success("/generate", response)?;
        let body: GenerateResponse = response.json().await?;

        Ok(body.mcqs)
    }

    fn download_url(&self, doc_id: &str) -> String {
        format!("{}/files/{}", self.config.base_url, doc_id)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpClientConfig::new("http://192.168.1.10:9000").with_timeout(30);
        assert_eq!(config.base_url, "http://192.168.1.10:9000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_download_url_format() {
        let client =
            HttpGenerationClient::new(HttpClientConfig::new("http://127.0.0.1:8000")).unwrap();
        assert_eq!(
            client.download_url("abc-123"),
            "http://127.0.0.1:8000/files/abc-123"
        );
    }
}
