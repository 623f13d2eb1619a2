//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次客户端会话的组装与调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 会话编排器
//! - 管理应用生命周期（初始化、运行、统计）
//! - 组装 HTTP 客户端并注入各组件
//! - 调度上传生成流程与文档列表刷新
//! - 并发触发本页文档的题目生成
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次会话)
//!     ↓
//! workflow::UploadGenerateFlow (校验 → 上传 → 生成)
//! controller::DocumentListController (分页 / 搜索 / 刷新)
//! controller::GenerationTracker (按文档跟踪生成)
//!     ↓
//! clients::GenerationApi (HTTP 能力)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：App 管会话，控制器管各自的状态
//! 2. **资源注入**：只有编排层构建客户端，向下以 Arc 注入
//! 3. **向下依赖**：编排层 → workflow / controller → clients
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;

// 重新导出主要类型
pub use app::App;
