//! 按文档维度的生成状态跟踪器 - 状态控制层
//!
//! 每个文档独立跟踪生成请求的进行状态、最近结果和错误信息，
//! 任意多个文档可以同时生成，互不干扰。
//!
//! 同一文档同一时刻只允许一个生成请求：检查与标记进行中
//! 在同一次持锁中完成，重复触发直接忽略且不发起请求。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clients::GenerationApi;
use crate::models::Mcq;

/// 单个文档的生成状态
#[derive(Debug, Clone, Default)]
pub struct GenerationEntry {
    /// 是否有生成请求进行中
    pub in_flight: bool,
    /// 最近一次成功生成的题目
    pub mcqs: Option<Vec<Mcq>>,
    /// 最近一次失败的错误信息
    pub error: Option<String>,
}

/// 单次生成的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// 生成成功
    Success,
    /// 生成失败（错误信息已写入对应条目）
    Failed,
    /// 该文档已有生成请求进行中，本次直接忽略
    Rejected,
}

/// 生成状态跟踪器
pub struct GenerationTracker {
    client: Arc<dyn GenerationApi>,
    /// doc_id -> GenerationEntry，条目创建后在会话内一直保留
    entries: DashMap<String, GenerationEntry>,
}

impl GenerationTracker {
    pub fn new(client: Arc<dyn GenerationApi>) -> Self {
        Self {
            client,
            entries: DashMap::new(),
        }
    }

    /// 某文档当前状态快照（从未请求过时为 None）
    pub fn entry(&self, doc_id: &str) -> Option<GenerationEntry> {
        self.entries.get(doc_id).map(|e| e.value().clone())
    }

    /// 某文档是否有生成请求进行中
    pub fn is_in_flight(&self, doc_id: &str) -> bool {
        self.entries
            .get(doc_id)
            .map(|e| e.in_flight)
            .unwrap_or(false)
    }

    /// 为指定文档生成题目
    ///
    /// 成功时整组替换该文档的题目并清除错误；失败时保留旧题目、
    /// 写入该文档自己的错误槽。进行中标记在任何结算路径都会清除。
    pub async fn generate(&self, doc_id: &str, num_questions: usize) -> GenerationOutcome {
        // 检查与标记必须在同一次持锁中完成，锁在发起请求前释放
        {
            let mut entry = self.entries.entry(doc_id.to_string()).or_default();
            if entry.in_flight {
                info!("[文档 {}] 已有生成请求进行中，跳过", doc_id);
                return GenerationOutcome::Rejected;
            }
            entry.in_flight = true;
        }

        info!("[文档 {}] 🎯 开始生成 {} 道题目", doc_id, num_questions);

        let result = self.client.generate_mcqs(doc_id, num_questions).await;

        let mut entry = self.entries.entry(doc_id.to_string()).or_default();
        entry.in_flight = false;
        match result {
            Ok(mcqs) => {
                info!("[文档 {}] ✓ 生成完成: {} 道题目", doc_id, mcqs.len());
                entry.mcqs = Some(mcqs);
                entry.error = None;
                GenerationOutcome::Success
            }
            Err(e) => {
                warn!("[文档 {}] ❌ 生成失败: {}", doc_id, e);
                entry.error = Some(e.to_string());
                GenerationOutcome::Failed
            }
        }
    }

    /// 在独立任务中为指定文档生成题目
    pub fn spawn_generate(
        self: &Arc<Self>,
        doc_id: String,
        num_questions: usize,
    ) -> JoinHandle<GenerationOutcome> {
        let tracker = Arc::clone(self);
        tokio::spawn(async move { tracker.generate(&doc_id, num_questions).await })
    }
}
