//! 内存版生成服务客户端
//!
//! 不访问网络，用内存数据模拟服务端行为，供测试与离线演示使用。
//! 列表语义与真实服务保持一致：按上传时间倒序存放、limit/offset 分页、
//! 关键词匹配文件名（忽略大小写）。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::GenerationApi;
use crate::error::{AppError, AppResult};
use crate::models::{Document, Mcq};

/// 记录的列表请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedListCall {
    pub limit: usize,
    pub offset: usize,
    pub query: Option<String>,
}

/// 记录的上传请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUploadCall {
    pub filename: String,
    pub size: usize,
}

/// 记录的生成请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedGenerateCall {
    pub doc_id: String,
    pub num_questions: usize,
}

/// 内存版生成服务客户端
pub struct FakeGenerationClient {
    base_url: String,
    /// 文档库，始终保持展示顺序（最新在前）
    documents: Mutex<Vec<Document>>,
    next_doc_seq: AtomicUsize,
    /// 预设的生成结果，每次生成弹出一组；为空时返回默认题目
    scripted_mcqs: Mutex<VecDeque<Vec<Mcq>>>,
    /// 预设的列表结果，每次列表请求弹出一组；为空时按文档库过滤
    scripted_lists: Mutex<VecDeque<Vec<Document>>>,
    /// 每次列表请求消耗一个延时，用于模拟慢响应
    list_delays: Mutex<VecDeque<Duration>>,
    /// 每次生成请求消耗一个延时
    generate_delays: Mutex<VecDeque<Duration>>,
    fail_list: AtomicBool,
    fail_upload: AtomicBool,
    fail_generate: AtomicBool,
    healthy: AtomicBool,
    list_calls: Mutex<Vec<RecordedListCall>>,
    upload_calls: Mutex<Vec<RecordedUploadCall>>,
    generate_calls: Mutex<Vec<RecordedGenerateCall>>,
}

/// 锁中毒时直接取回内部数据，状态本身始终有效
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeGenerationClient {
    pub fn new() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            documents: Mutex::new(Vec::new()),
            next_doc_seq: AtomicUsize::new(0),
            scripted_mcqs: Mutex::new(VecDeque::new()),
            scripted_lists: Mutex::new(VecDeque::new()),
            list_delays: Mutex::new(VecDeque::new()),
            generate_delays: Mutex::new(VecDeque::new()),
            fail_list: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            fail_generate: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            list_calls: Mutex::new(Vec::new()),
            upload_calls: Mutex::new(Vec::new()),
            generate_calls: Mutex::new(Vec::new()),
        }
    }

    /// 以给定文档库创建，`documents` 的顺序即展示顺序
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let client = Self::new();
        *lock(&client.documents) = documents;
        client
    }

    // ========== 测试辅助：预设行为 ==========

    /// 预设下一次生成请求返回的题目
    pub fn script_mcqs(&self, mcqs: Vec<Mcq>) {
        lock(&self.scripted_mcqs).push_back(mcqs);
    }

    /// 预设下一次列表请求返回的文档
    pub fn script_list(&self, documents: Vec<Document>) {
        lock(&self.scripted_lists).push_back(documents);
    }

    /// 预设下一次列表请求的响应延时
    pub fn push_list_delay(&self, delay: Duration) {
        lock(&self.list_delays).push_back(delay);
    }

    /// 预设下一次生成请求的响应延时
    pub fn push_generate_delay(&self, delay: Duration) {
        lock(&self.generate_delays).push_back(delay);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_generate(&self, fail: bool) {
        self.fail_generate.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    // ========== 测试辅助：观察请求 ==========

    pub fn list_calls(&self) -> Vec<RecordedListCall> {
        lock(&self.list_calls).clone()
    }

    pub fn upload_calls(&self) -> Vec<RecordedUploadCall> {
        lock(&self.upload_calls).clone()
    }

    pub fn generate_calls(&self) -> Vec<RecordedGenerateCall> {
        lock(&self.generate_calls).clone()
    }

    /// 当前文档库快照（展示顺序）
    pub fn documents(&self) -> Vec<Document> {
        lock(&self.documents).clone()
    }

    /// 构造默认的生成结果，形状与服务端保底题目一致
    fn default_mcqs(num_questions: usize) -> Vec<Mcq> {
        (0..num_questions)
            .map(|i| Mcq {
                question: format!("问题 {}", i + 1),
                options: vec![
                    "选项 A".to_string(),
                    "选项 B".to_string(),
                    "选项 C".to_string(),
                    "选项 D".to_string(),
                ],
                answer_index: Some(0),
            })
            .collect()
    }
}

impl Default for FakeGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationApi for FakeGenerationClient {
    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
        query: Option<&str>,
    ) -> AppResult<Vec<Document>> {
        lock(&self.list_calls).push(RecordedListCall {
            limit,
            offset,
            query: query.map(|q| q.to_string()),
        });

        let delay = lock(&self.list_delays).pop_front();
        let scripted = lock(&self.scripted_lists).pop_front();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::transport(
                "/documents",
                500,
                "Internal Server Error",
            ));
        }

        if let Some(documents) = scripted {
            return Ok(documents);
        }

        let documents = lock(&self.documents);
        let filtered: Vec<Document> = documents
            .iter()
            .filter(|doc| match query {
                // 真实服务还会匹配正文，内存版只按文件名匹配
                Some(q) if !q.is_empty() => {
                    doc.filename.to_lowercase().contains(&q.to_lowercase())
                }
                _ => true,
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(filtered)
    }

    async fn upload_document(&self, filename: &str, data: Vec<u8>) -> AppResult<String> {
        lock(&self.upload_calls).push(RecordedUploadCall {
            filename: filename.to_string(),
            size: data.len(),
        });

        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(AppError::transport("/upload", 500, "Internal Server Error"));
        }

        let seq = self.next_doc_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let doc_id = format!("doc-{}", seq);
        let document = Document {
            id: doc_id.clone(),
            filename: filename.to_string(),
            uploaded_at: chrono::Utc::now().to_rfc3339(),
        };

        // 最新文档排在列表最前
        lock(&self.documents).insert(0, document);

        Ok(doc_id)
    }

    async fn generate_mcqs(&self, doc_id: &str, num_questions: usize) -> AppResult<Vec<Mcq>> {
        lock(&self.generate_calls).push(RecordedGenerateCall {
            doc_id: doc_id.to_string(),
            num_questions,
        });

        let delay = lock(&self.generate_delays).pop_front();
        let scripted = lock(&self.scripted_mcqs).pop_front();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_generate.load(Ordering::SeqCst) {
            return Err(AppError::transport(
                "/generate",
                500,
                "Internal Server Error",
            ));
        }

        if let Some(mcqs) = scripted {
            return Ok(mcqs);
        }

        let known = lock(&self.documents).iter().any(|doc| doc.id == doc_id);
        if !known {
            return Err(AppError::transport("/generate", 404, "Not Found"));
        }

        Ok(Self::default_mcqs(num_questions))
    }

    fn download_url(&self, doc_id: &str) -> String {
        format!("{}/files/{}", self.base_url, doc_id)
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
