//! 会话编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次客户端会话的组装与调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：构建 HTTP 客户端，注入各控制器
//! 2. **服务探测**：会话开始前等待生成服务就绪
//! 3. **上传生成**：按配置执行"校验 → 上传 → 生成"流程
//! 4. **文档列表**：初次拉取、可选搜索、打印当前页
//! 5. **并发重新生成**：为当前页的每个文档各起一个任务
//! 6. **全局统计**：汇总本次会话的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个请求的细节，向下委托各控制器
//! - **显式注入**：服务地址来自配置，组件在组装时拿到客户端
//! - **并发安全**：每个文档的生成在独立任务中进行，互不等待

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::clients::{GenerationApi, HttpClientConfig, HttpGenerationClient};
use crate::config::Config;
use crate::controller::{DocumentListController, GenerationOutcome, GenerationTracker, ListState};
use crate::models::{Document, Mcq};
use crate::utils::logging::truncate_text;
use crate::workflow::{FlowResult, UploadGenerateFlow};

/// 题目数量输入允许的范围
const NUM_QUESTIONS_RANGE: (usize, usize) = (1, 50);
/// 服务就绪探测次数
const HEALTH_ATTEMPTS: usize = 3;

/// 应用主结构
pub struct App {
    config: Config,
    client: Arc<dyn GenerationApi>,
    list_controller: DocumentListController,
    tracker: Arc<GenerationTracker>,
    upload_flow: UploadGenerateFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let http_config =
            HttpClientConfig::new(&config.api_base_url).with_timeout(config.request_timeout_secs);
        let client: Arc<dyn GenerationApi> = Arc::new(
            HttpGenerationClient::new(http_config).context("初始化生成服务客户端失败")?,
        );

        Ok(Self::with_client(config, client))
    }

    /// 使用指定客户端组装应用（测试与离线演示入口）
    pub fn with_client(mut config: Config, client: Arc<dyn GenerationApi>) -> Self {
        let (min_q, max_q) = NUM_QUESTIONS_RANGE;
        if config.num_questions < min_q || config.num_questions > max_q {
            warn!(
                "⚠️ 题目数量 {} 超出范围 [{}, {}]，已调整",
                config.num_questions, min_q, max_q
            );
            config.num_questions = config.num_questions.clamp(min_q, max_q);
        }

        let list_controller = DocumentListController::new(Arc::clone(&client), config.page_size);
        let tracker = Arc::new(GenerationTracker::new(Arc::clone(&client)));
        let upload_flow = UploadGenerateFlow::new(Arc::clone(&client));

        Self {
            config,
            client,
            list_controller,
            tracker,
            upload_flow,
        }
    }

    /// 运行一次完整会话
    pub async fn run(&self) -> Result<()> {
        log_startup(&self.config);

        let mut stats = SessionStats::default();

        // 等待服务就绪（失败时继续，由后续请求自行报错）
        if !self.wait_for_service().await {
            warn!("⚠️ 生成服务暂不可用: {}", self.config.api_base_url);
        }

        // 可选：上传并生成
        if let Some(file) = self.config.upload_file.clone() {
            self.run_upload_flow(Path::new(&file), &mut stats).await;
        }

        // 文档列表：初次拉取
        self.list_controller.refetch().await;

        // 可选：搜索
        if let Some(query) = self.config.search_query.clone() {
            self.list_controller.set_query(query);
            self.list_controller.submit_search();
            self.list_controller.refetch_if_pending().await;
        }

        let state = self.list_controller.state();
        print_document_table(&state, self.client.as_ref());
        stats.listed = state.documents.len();

        // 可选：为当前页的所有文档并发重新生成
        if self.config.regenerate_listed && !state.documents.is_empty() {
            self.regenerate_page(&state.documents, &mut stats).await;
        }

        print_final_stats(&stats);
        Ok(())
    }

    /// 探测服务是否就绪，最多尝试 HEALTH_ATTEMPTS 次
    async fn wait_for_service(&self) -> bool {
        for attempt in 1..=HEALTH_ATTEMPTS {
            if self.client.health_check().await {
                info!("✓ 生成服务就绪");
                return true;
            }
            if attempt < HEALTH_ATTEMPTS {
                info!("⏳ 等待生成服务就绪 ({}/{})...", attempt, HEALTH_ATTEMPTS);
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }
        false
    }

    /// 执行上传并生成流程，并打印结果
    async fn run_upload_flow(&self, path: &Path, stats: &mut SessionStats) {
        info!("\n{}", "=".repeat(60));
        info!("📤 上传并生成: {}", path.display());
        info!("{}", "=".repeat(60));

        let result = self
            .upload_flow
            .run(Some(path), self.config.num_questions)
            .await;
        let state = self.upload_flow.state();

        match result {
            FlowResult::Success => {
                stats.uploaded += 1;
                stats.generated += 1;
                if let Some(doc_id) = &state.doc_id {
                    info!("📎 下载链接: {}", self.client.download_url(doc_id));
                }
                let title = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("上传文件");
                print_mcqs(title, &state.mcqs, self.config.verbose_logging);
            }
            FlowResult::Failed => {
                stats.failed += 1;
                // 上传成功但生成失败时，文档仍保留在服务端
                if let Some(doc_id) = &state.doc_id {
                    info!("📎 文档已上传 (doc_id={})，可稍后重新生成", doc_id);
                }
            }
        }
    }

    /// 为本页所有文档并发生成题目
    async fn regenerate_page(&self, documents: &[Document], stats: &mut SessionStats) {
        info!("\n{}", "=".repeat(60));
        info!("📦 开始为本页 {} 个文档并发生成题目", documents.len());
        info!("{}", "=".repeat(60));

        let handles: Vec<_> = documents
            .iter()
            .map(|doc| {
                self.tracker
                    .spawn_generate(doc.id.clone(), self.config.num_questions)
            })
            .collect();

        let outcomes = join_all(handles).await;

        for (doc, outcome) in documents.iter().zip(outcomes) {
            match outcome {
                Ok(GenerationOutcome::Success) => {
                    stats.generated += 1;
                    if let Some(entry) = self.tracker.entry(&doc.id) {
                        if let Some(mcqs) = entry.mcqs {
                            print_mcqs(&doc.filename, &mcqs, self.config.verbose_logging);
                        }
                    }
                }
                Ok(GenerationOutcome::Failed) => {
                    stats.failed += 1;
                    if let Some(entry) = self.tracker.entry(&doc.id) {
                        warn!(
                            "[文档 {}] ❌ 生成失败: {}",
                            doc.id,
                            entry.error.unwrap_or_default()
                        );
                    }
                }
                Ok(GenerationOutcome::Rejected) => {}
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", doc.id, e);
                    stats.failed += 1;
                }
            }
        }
    }
}

/// 会话统计
#[derive(Debug, Default)]
struct SessionStats {
    uploaded: usize,
    generated: usize,
    failed: usize,
    listed: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档题目生成客户端");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!(
        "📊 每页条数: {} / 每份文档题目数: {}",
        config.page_size, config.num_questions
    );
    info!("{}", "=".repeat(60));
}

fn print_document_table(state: &ListState, client: &dyn GenerationApi) {
    if let Some(err) = &state.error {
        warn!("❌ 文档列表加载失败: {}", err);
        return;
    }
    if state.documents.is_empty() {
        info!("暂无文档");
        return;
    }

    info!(
        "\n📚 文档列表 (第 {} 页, 每页 {} 条):",
        state.page + 1,
        state.page_size
    );
    for (i, doc) in state.documents.iter().enumerate() {
        info!(
            "  {}. {} | 上传于 {} | {}",
            i + 1,
            doc.filename,
            doc.uploaded_at_display(),
            client.download_url(&doc.id)
        );
    }
}

fn print_mcqs(title: &str, mcqs: &[Mcq], verbose: bool) {
    info!("\n📝 {} 的题目 ({} 道):", title, mcqs.len());
    for (qi, mcq) in mcqs.iter().enumerate() {
        let question = if verbose {
            mcq.question.clone()
        } else {
            truncate_text(&mcq.question, 80)
        };
        info!("  {}. {}", qi + 1, question);
        for (oi, option) in mcq.options.iter().enumerate() {
            let marker = if mcq.is_correct_option(oi) { "✓" } else { " " };
            info!("    {} {}. {}", marker, option_label(oi), option);
        }
    }
}

fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn print_final_stats(stats: &SessionStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 上传: {} / 生成成功: {}", stats.uploaded, stats.generated);
    info!("❌ 失败: {}", stats.failed);
    info!("📚 列出文档: {}", stats.listed);
    info!("{}", "=".repeat(60));
}
