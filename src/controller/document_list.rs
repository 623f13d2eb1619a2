//! 文档列表控制器 - 状态控制层
//!
//! ## 职责
//!
//! 维护文档列表视图的全部可观察状态：当前页数据、分页参数、
//! 搜索关键词、加载中标记和错误信息。
//!
//! ## 设计特点
//!
//! - **集中变更**：状态只能通过命名方法修改，便于审计每一次变化
//! - **先改参数后拉取**：改分页、提交搜索只更新状态并登记待拉取标记，
//!   由调用方统一触发 `refetch()`，每次参数变化恰好对应一次请求
//! - **代次保护**：每次拉取领取一个递增代次，过期响应整体丢弃，
//!   晚到的旧响应不会覆盖新结果
//! - **错误自理**：拉取失败只写入本控制器的错误槽，不影响其他组件

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::clients::GenerationApi;
use crate::models::Document;

/// 可选的每页条数
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 20];
/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 文档列表状态快照
#[derive(Debug, Clone)]
pub struct ListState {
    /// 当前页的文档
    pub documents: Vec<Document>,
    /// 是否有列表请求进行中
    pub loading: bool,
    /// 最近一次拉取的错误信息
    pub error: Option<String>,
    /// 当前页码（从 0 开始）
    pub page: usize,
    /// 每页条数
    pub page_size: usize,
    /// 搜索关键词
    pub query: String,
}

impl ListState {
    fn new(page_size: usize) -> Self {
        Self {
            documents: Vec::new(),
            loading: false,
            error: None,
            page: 0,
            page_size,
            query: String::new(),
        }
    }

    /// 是否还有上一页
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// 是否可能还有下一页（本页满员时才可能）
    pub fn has_next(&self) -> bool {
        self.documents.len() == self.page_size
    }
}

/// 文档列表控制器
pub struct DocumentListController {
    client: Arc<dyn GenerationApi>,
    state: RwLock<ListState>,
    /// 请求代次，单调递增
    epoch: AtomicU64,
    /// 参数变化后登记的待拉取标记
    fetch_pending: AtomicBool,
}

impl DocumentListController {
    /// 创建控制器
    ///
    /// `page_size` 不在可选范围内时回退为默认值
    pub fn new(client: Arc<dyn GenerationApi>, page_size: usize) -> Self {
        let page_size = if PAGE_SIZE_OPTIONS.contains(&page_size) {
            page_size
        } else {
            warn!("⚠️ 不支持的每页条数: {}，使用默认值 {}", page_size, DEFAULT_PAGE_SIZE);
            DEFAULT_PAGE_SIZE
        };

        Self {
            client,
            state: RwLock::new(ListState::new(page_size)),
            epoch: AtomicU64::new(0),
            fetch_pending: AtomicBool::new(false),
        }
    }

    /// 当前状态快照
    pub fn state(&self) -> ListState {
        self.state_read().clone()
    }

    /// 更新搜索关键词（仅更新输入，不触发拉取）
    pub fn set_query(&self, text: impl Into<String>) {
        self.state_write().query = text.into();
    }

    /// 提交搜索：回到第一页并登记拉取
    pub fn submit_search(&self) {
        let mut state = self.state_write();
        state.page = 0;
        info!("🔍 提交搜索: {:?}", state.query);
        drop(state);
        self.mark_fetch_pending();
    }

    /// 跳转到指定页（页码未变化时不登记拉取）
    pub fn set_page(&self, page: usize) {
        let mut state = self.state_write();
        if state.page == page {
            return;
        }
        debug!("📄 页码: {} -> {}", state.page, page);
        state.page = page;
        drop(state);
        self.mark_fetch_pending();
    }

    /// 下一页（本页未满员时视为已到末页，不动作）
    pub fn next_page(&self) {
        let page = {
            let state = self.state_read();
            if !state.has_next() {
                return;
            }
            state.page + 1
        };
        self.set_page(page);
    }

    /// 上一页（已在第一页时不动作）
    pub fn prev_page(&self) {
        let page = {
            let state = self.state_read();
            if !state.has_prev() {
                return;
            }
            state.page - 1
        };
        self.set_page(page);
    }

    /// 修改每页条数：仅接受 5 / 10 / 20，变化时回到第一页并登记拉取
    pub fn set_page_size(&self, page_size: usize) {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            warn!("⚠️ 不支持的每页条数: {}", page_size);
            return;
        }
        let mut state = self.state_write();
        if state.page_size == page_size {
            return;
        }
        debug!("📄 每页条数: {} -> {}", state.page_size, page_size);
        state.page_size = page_size;
        state.page = 0;
        drop(state);
        self.mark_fetch_pending();
    }

    /// 取走待拉取标记
    pub fn take_fetch_pending(&self) -> bool {
        self.fetch_pending.swap(false, Ordering::SeqCst)
    }

    /// 如有待拉取标记则执行一次拉取
    pub async fn refetch_if_pending(&self) {
        if self.take_fetch_pending() {
            self.refetch().await;
        }
    }

    /// 按当前分页参数拉取一页文档
    ///
    /// 成功时整页替换文档并清除错误；失败时保留原文档、写入错误信息。
    /// 无论成败，进行中标记都会在结算时清除；过期响应整体丢弃。
    pub async fn refetch(&self) {
        // 领取代次与设置进行中标记必须在同一次持锁中完成，
        // 否则更早的请求可能在新请求结算后才把 loading 置位
        let (epoch, limit, offset, query) = {
            let mut state = self.state_write();
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            (
                epoch,
                state.page_size,
                state.page.saturating_mul(state.page_size),
                state.query.clone(),
            )
        };

        debug!("📄 拉取文档列表: limit={} offset={} q={:?}", limit, offset, query);

        let q = if query.is_empty() { None } else { Some(query.as_str()) };
        let result = self.client.list_documents(limit, offset, q).await;

        let mut state = self.state_write();
        // 过期判断与结算同样在同一次持锁中完成；期间有更新的请求时
        // 本次结果整体作废，loading 归新请求管理
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("忽略过期的列表响应 (代次 {})", epoch);
            return;
        }
        match result {
            Ok(documents) => {
                info!("✓ 文档列表更新: {} 条", documents.len());
                state.documents = documents;
                state.error = None;
            }
            Err(e) => {
                warn!("❌ 拉取文档列表失败: {}", e);
                state.error = Some(e.to_string());
            }
        }
        state.loading = false;
    }

    fn mark_fetch_pending(&self) {
        self.fetch_pending.store(true, Ordering::SeqCst);
    }

    // 锁中毒时直接取回内部数据，状态本身始终有效
    fn state_read(&self) -> RwLockReadGuard<'_, ListState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, ListState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::FakeGenerationClient;
    use std::time::Duration;

    fn sample_document(id: &str, filename: &str) -> Document {
        Document {
            id: id.to_string(),
            filename: filename.to_string(),
            uploaded_at: "2025-01-02T03:04:05+00:00".to_string(),
        }
    }

    fn controller_with_docs(count: usize) -> (Arc<FakeGenerationClient>, DocumentListController) {
        let docs: Vec<Document> = (0..count)
            .map(|i| sample_document(&format!("d{}", i), &format!("file{}.txt", i)))
            .collect();
        let client = Arc::new(FakeGenerationClient::with_documents(docs));
        let controller = DocumentListController::new(client.clone(), DEFAULT_PAGE_SIZE);
        (client, controller)
    }

    #[test]
    fn test_initial_state() {
        let client = Arc::new(FakeGenerationClient::new());
        let controller = DocumentListController::new(client, 10);
        let state = controller.state();

        assert!(state.documents.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.page, 0);
        assert_eq!(state.page_size, 10);
        assert!(!controller.take_fetch_pending());
    }

    #[test]
    fn test_invalid_page_size_falls_back_to_default() {
        let client = Arc::new(FakeGenerationClient::new());
        let controller = DocumentListController::new(client, 7);
        assert_eq!(controller.state().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_set_page_size_rejects_unsupported_value() {
        let (_, controller) = controller_with_docs(0);
        controller.set_page_size(15);

        assert_eq!(controller.state().page_size, DEFAULT_PAGE_SIZE);
        assert!(!controller.take_fetch_pending());
    }

    #[test]
    fn test_unchanged_values_do_not_mark_fetch() {
        let (_, controller) = controller_with_docs(0);

        controller.set_page(0);
        controller.set_page_size(DEFAULT_PAGE_SIZE);

        assert!(!controller.take_fetch_pending());
    }

    #[test]
    fn test_page_size_change_resets_page_and_marks_fetch() {
        let (_, controller) = controller_with_docs(0);
        controller.set_page(3);
        assert!(controller.take_fetch_pending());

        controller.set_page_size(20);
        let state = controller.state();
        assert_eq!(state.page_size, 20);
        assert_eq!(state.page, 0);
        assert!(controller.take_fetch_pending());
    }

    #[test]
    fn test_submit_search_resets_page() {
        let (_, controller) = controller_with_docs(0);
        controller.set_page(2);
        controller.take_fetch_pending();

        controller.set_query("报告");
        assert!(!controller.take_fetch_pending());

        controller.submit_search();
        assert_eq!(controller.state().page, 0);
        assert!(controller.take_fetch_pending());
    }

    #[tokio::test]
    async fn test_refetch_success_replaces_documents() {
        let (_, controller) = controller_with_docs(3);

        controller.refetch().await;

        let state = controller.state();
        assert_eq!(state.documents.len(), 3);
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_loading() {
        let (_, controller) = controller_with_docs(0);

        controller.refetch().await;

        let state = controller.state();
        assert!(state.documents.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_refetch_failure_keeps_documents_and_sets_error() {
        let (client, controller) = controller_with_docs(3);
        controller.refetch().await;

        client.set_fail_list(true);
        controller.refetch().await;

        let state = controller.state();
        assert_eq!(state.documents.len(), 3);
        assert!(!state.loading);
        let error = state.error.unwrap();
        assert!(error.contains("500"));
    }

    #[tokio::test]
    async fn test_error_cleared_after_successful_refetch() {
        let (client, controller) = controller_with_docs(2);

        client.set_fail_list(true);
        controller.refetch().await;
        assert!(controller.state().error.is_some());

        client.set_fail_list(false);
        controller.refetch().await;
        assert!(controller.state().error.is_none());
    }

    #[tokio::test]
    async fn test_offset_follows_page_and_page_size() {
        let (client, controller) = controller_with_docs(50);

        controller.refetch().await;
        controller.set_page(2);
        controller.refetch_if_pending().await;
        controller.set_page_size(5);
        controller.refetch_if_pending().await;

        let calls = client.list_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!((calls[0].limit, calls[0].offset), (10, 0));
        assert_eq!((calls[1].limit, calls[1].offset), (10, 20));
        // 每页条数变化后回到第一页
        assert_eq!((calls[2].limit, calls[2].offset), (5, 0));
    }

    #[tokio::test]
    async fn test_query_sent_only_when_non_empty() {
        let (client, controller) = controller_with_docs(3);

        controller.refetch().await;
        controller.set_query("file1");
        controller.submit_search();
        controller.refetch_if_pending().await;

        let calls = client.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].query, None);
        assert_eq!(calls[1].query, Some("file1".to_string()));
    }

    #[tokio::test]
    async fn test_each_transition_triggers_exactly_one_request() {
        let (client, controller) = controller_with_docs(50);

        controller.set_page(1);
        controller.refetch_if_pending().await;
        controller.refetch_if_pending().await; // 标记已清除，不应再发请求

        assert_eq!(client.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_response_discarded() {
        let (client, controller) = controller_with_docs(0);

        // 第一次请求慢且返回旧数据，第二次请求快且返回新数据
        client.script_list(vec![sample_document("stale", "stale.txt")]);
        client.script_list(vec![sample_document("fresh", "fresh.txt")]);
        client.push_list_delay(Duration::from_millis(80));
        client.push_list_delay(Duration::from_millis(5));

        tokio::join!(controller.refetch(), controller.refetch());

        let state = controller.state();
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.documents[0].id, "fresh");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_next_and_prev_page_respect_bounds() {
        let (client, controller) = controller_with_docs(12);

        controller.prev_page(); // 已在第一页
        assert!(!controller.take_fetch_pending());

        controller.refetch().await; // 第一页满员（10 条）
        controller.next_page();
        assert_eq!(controller.state().page, 1);
        controller.refetch_if_pending().await;

        // 第二页只有 2 条，不再翻页
        controller.next_page();
        assert_eq!(controller.state().page, 1);
        assert!(!controller.take_fetch_pending());

        assert_eq!(client.list_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_huge_page_offset_saturates() {
        let (client, controller) = controller_with_docs(3);

        controller.set_page(usize::MAX / 2);
        controller.refetch_if_pending().await;

        let state = controller.state();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.documents.is_empty());
        assert_eq!(client.list_calls()[0].offset, usize::MAX);
    }

    // 多线程下反复并发拉取：无论结算顺序如何，loading 最终都必须
    // 归位，数据保持完整的一页
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refetches_always_settle_loading() {
        let docs: Vec<Document> = (0..3)
            .map(|i| sample_document(&format!("d{}", i), &format!("file{}.txt", i)))
            .collect();
        let client = Arc::new(FakeGenerationClient::with_documents(docs));
        let controller = Arc::new(DocumentListController::new(
            client.clone(),
            DEFAULT_PAGE_SIZE,
        ));

        for _ in 0..25 {
            client.push_list_delay(Duration::from_millis(2));
            client.push_list_delay(Duration::from_millis(1));

            let tasks: Vec<_> = (0..3)
                .map(|_| {
                    let controller = Arc::clone(&controller);
                    tokio::spawn(async move { controller.refetch().await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let state = controller.state();
            assert!(!state.loading);
            assert!(state.error.is_none());
            assert_eq!(state.documents.len(), 3);
        }
    }
}
