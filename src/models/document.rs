use serde::{Deserialize, Serialize};

/// 已上传的文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    /// 上传时间（服务端返回的原始字符串，通常为 UTC ISO 格式）
    pub uploaded_at: String,
}

impl Document {
    /// 格式化上传时间用于展示，无法解析时原样返回
    pub fn uploaded_at_display(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.uploaded_at)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.uploaded_at.clone())
    }
}

/// GET /documents 响应
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListResponse {
    /// 字段缺失时视为空列表
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_documents_field_is_empty() {
        let response: DocumentListResponse = serde_json::from_str("{}").unwrap();
        assert!(response.documents.is_empty());
    }

    #[test]
    fn test_parse_document_list() {
        let body = r#"{
            "documents": [
                {"id": "a", "filename": "x.pdf", "uploaded_at": "2025-01-02T03:04:05+00:00"}
            ]
        }"#;
        let response: DocumentListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.documents.len(), 1);
        assert_eq!(response.documents[0].id, "a");
        assert_eq!(response.documents[0].filename, "x.pdf");
    }

    #[test]
    fn test_uploaded_at_display_formats_rfc3339() {
        let doc = Document {
            id: "a".to_string(),
            filename: "x.pdf".to_string(),
            uploaded_at: "2025-01-02T03:04:05+00:00".to_string(),
        };
        assert_eq!(doc.uploaded_at_display(), "2025-01-02 03:04:05");
    }

    #[test]
    fn test_uploaded_at_display_falls_back_to_raw() {
        let doc = Document {
            id: "a".to_string(),
            filename: "x.pdf".to_string(),
            uploaded_at: "昨天".to_string(),
        };
        assert_eq!(doc.uploaded_at_display(), "昨天");
    }
}
