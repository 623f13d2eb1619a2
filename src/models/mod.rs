pub mod document;
pub mod mcq;

// 重新导出常用类型
pub use document::{Document, DocumentListResponse};
pub use mcq::{GenerateRequest, GenerateResponse, Mcq, UploadResponse};
