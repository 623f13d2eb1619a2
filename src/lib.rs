//! # Quizgen Client
//!
//! 一个面向文档题目生成服务的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有 HTTP 连接，只暴露能力
//! - `GenerationApi` - 生成服务的统一接口（列表 / 上传 / 生成 / 下载链接）
//! - `HttpGenerationClient` - 基于 reqwest 的实现
//! - `FakeGenerationClient` - 内存实现，用于测试与离线演示
//!
//! ### ② 状态控制层（Controller）
//! - `controller/` - 描述"界面状态如何变化"，每个控制器管一块状态
//! - `DocumentListController` - 分页 / 搜索 / 刷新
//! - `GenerationTracker` - 按文档跟踪生成任务与结果缓存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份文档"的完整处理流程
//! - `UploadGenerateFlow` - 流程编排（校验 → 上传 → 生成）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 会话编排器，组装组件并调度一次会话
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod controller;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{FakeGenerationClient, GenerationApi, HttpClientConfig, HttpGenerationClient};
pub use config::Config;
pub use controller::{DocumentListController, GenerationOutcome, GenerationTracker, ListState};
pub use error::{AppError, AppResult};
pub use models::{Document, Mcq};
pub use orchestrator::App;
pub use workflow::{FlowResult, UploadGenerateFlow};
