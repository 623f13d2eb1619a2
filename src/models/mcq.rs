use serde::{Deserialize, Serialize};

/// 单选题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// 正确选项下标（部分接口可能不返回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_index: Option<usize>,
}

impl Mcq {
    /// 判断第 `index` 个选项是否为正确答案
    ///
    /// answer_index 缺失或越界时不标记任何选项
    pub fn is_correct_option(&self, index: usize) -> bool {
        match self.answer_index {
            Some(answer) => answer == index && answer < self.options.len(),
            None => false,
        }
    }
}

/// POST /upload 响应
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub doc_id: String,
}

/// POST /generate 请求体
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub doc_id: String,
    pub num_questions: usize,
}

/// POST /generate 响应
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub doc_id: String,
    /// 字段缺失时视为空列表
    #[serde(default)]
    pub mcqs: Vec<Mcq>,
}
