//! 状态控制层（Controller Layer）
//!
//! ## 职责
//!
//! 本层持有展示层可观察的全部状态，每个控制器独立管理自己的
//! 数据、进行中标记与错误槽，互不影响。
//!
//! ## 模块划分
//!
//! ### `document_list` - 文档列表控制器
//! - 服务端分页（5 / 10 / 20 每页）与关键词搜索
//! - 参数变化登记待拉取标记，由调用方统一触发拉取
//! - 请求代次保护，过期响应整体丢弃
//!
//! ### `generation_tracker` - 生成状态跟踪器
//! - doc_id 维度的独立条目（进行中 / 题目 / 错误）
//! - 同一文档的重复生成请求直接忽略
//! - 任意多个文档可并发生成

pub mod document_list;
pub mod generation_tracker;

// 重新导出主要类型
pub use document_list::{DocumentListController, ListState, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
pub use generation_tracker::{GenerationEntry, GenerationOutcome, GenerationTracker};
