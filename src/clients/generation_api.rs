//! 生成服务接口抽象
//!
//! 定义与题目生成服务交互的统一接口，具体实现见 http_client / fake_client

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Document, Mcq};

/// 生成服务客户端接口
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// 分页查询文档列表
    ///
    /// # 参数
    /// - `limit`: 每页条数
    /// - `offset`: 起始偏移
    /// - `query`: 搜索关键词，None 时不参与过滤
    ///
    /// # 返回
    /// 返回当前页的文档，按上传时间倒序
    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
        query: Option<&str>,
    ) -> AppResult<Vec<Document>>;

    /// 上传文档
    ///
    /// # 参数
    /// - `filename`: 原始文件名
    /// - `data`: 文件内容
    ///
    /// # 返回
    /// 返回服务端分配的文档 ID
    async fn upload_document(&self, filename: &str, data: Vec<u8>) -> AppResult<String>;

    /// 为指定文档生成选择题
    async fn generate_mcqs(&self, doc_id: &str, num_questions: usize) -> AppResult<Vec<Mcq>>;

    /// 构造文档原始文件的下载链接（不发起请求）
    fn download_url(&self, doc_id: &str) -> String;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
