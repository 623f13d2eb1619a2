//! 上传并生成流程 - 流程层
//!
//! 核心职责：定义"一份文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验：未选择文件直接以校验错误结束，不发起任何网络请求
//! 2. 上传：读取本地文件，multipart 提交到 /upload，记录返回的 doc_id
//! 3. 生成：携带 doc_id 请求 /generate
//!
//! 上传成功但生成失败时，文档保留在服务端不回滚，
//! doc_id 留在状态中供稍后重新生成。

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::clients::GenerationApi;
use crate::error::{AppError, AppResult};
use crate::models::Mcq;

/// 流程状态快照
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    /// 是否有阶段进行中
    pub loading: bool,
    /// 最近一次失败的错误信息
    pub error: Option<String>,
    /// 上传成功后服务端返回的文档 ID
    pub doc_id: Option<String>,
    /// 生成成功的题目
    pub mcqs: Vec<Mcq>,
}

/// 流程结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowResult {
    /// 上传并生成全部成功
    Success,
    /// 某一阶段失败（详情见状态中的 error）
    Failed,
}

/// 上传并生成流程
pub struct UploadGenerateFlow {
    client: Arc<dyn GenerationApi>,
    state: RwLock<FlowState>,
}

impl UploadGenerateFlow {
    pub fn new(client: Arc<dyn GenerationApi>) -> Self {
        Self {
            client,
            state: RwLock::new(FlowState::default()),
        }
    }

    /// 当前状态快照
    pub fn state(&self) -> FlowState {
        self.state_read().clone()
    }

    /// 执行完整流程：校验 → 上传 → 生成
    ///
    /// `file` 为 None 表示用户未选择文件
    pub async fn run(&self, file: Option<&Path>, num_questions: usize) -> FlowResult {
        {
            let mut state = self.state_write();
            state.loading = true;
            state.error = None;
        }

        let result = self.execute(file, num_questions).await;

        // 收尾：任何路径都要清除进行中标记
        let mut state = self.state_write();
        state.loading = false;
        match result {
            Ok(()) => FlowResult::Success,
            Err(e) => {
                warn!("❌ 上传生成流程失败: {}", e);
                state.error = Some(e.to_string());
                FlowResult::Failed
            }
        }
    }

    async fn execute(&self, file: Option<&Path>, num_questions: usize) -> AppResult<()> {
        // ========== 阶段 1: 校验 ==========
        let path = file.ok_or_else(|| AppError::validation("请先选择要上传的文件"))?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file(path.display().to_string(), e))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        // ========== 阶段 2: 上传 ==========
        info!("📤 正在上传 {} ({} 字节)...", filename, data.len());
        let doc_id = self.client.upload_document(&filename, data).await?;
        info!("✓ 上传成功: doc_id={}", doc_id);

        // 上传已经落库，先记录 doc_id（之后生成失败也不回滚）
        self.state_write().doc_id = Some(doc_id.clone());

        // ========== 阶段 3: 生成 ==========
        info!("🎯 正在生成 {} 道题目...", num_questions);
        let mcqs = self.client.generate_mcqs(&doc_id, num_questions).await?;
        info!("✓ 生成完成: {} 道题目", mcqs.len());

        self.state_write().mcqs = mcqs;

        Ok(())
    }

    // 锁中毒时直接取回内部数据，状态本身始终有效
    fn state_read(&self) -> RwLockReadGuard<'_, FlowState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, FlowState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
