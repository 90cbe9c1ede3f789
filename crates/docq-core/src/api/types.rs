//! Wire types for the backend API.
//!
//! The chat response is deliberately permissive: every field is optional
//! and absent fields fall back to safe defaults downstream, so a partial
//! payload never fails the request cycle.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub use_rag: bool,
}

/// Reply payload of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    /// Generated reply text. Absent or empty replies are substituted with
    /// a fallback string by the transcript layer.
    #[serde(default)]
    pub response: Option<String>,
    /// Retrieved passages backing the reply, when retrieval ran.
    #[serde(default)]
    pub sources: Option<Vec<SourcePayload>>,
}

/// One retrieved passage as shipped by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcePayload {
    /// Document label, e.g. a file name.
    #[serde(default)]
    pub source: Option<String>,
    /// Chunk index within the document.
    #[serde(default)]
    pub chunk: Option<u32>,
    /// The passage text.
    #[serde(default)]
    pub text: Option<String>,
}

/// Reply payload of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub document_count: u64,
    pub model: String,
    pub collection: String,
}

impl HealthResponse {
    /// Returns true when the backend reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Reply payload of `GET /api/documents/count`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_field_names() {
        let body = serde_json::to_value(ChatRequest {
            message: "hi".to_string(),
            use_rag: true,
        })
        .unwrap();
        assert_eq!(body["message"], "hi");
        assert_eq!(body["use_rag"], true);
    }

    #[test]
    fn test_chat_response_full_payload() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "response": "See the manual.",
                "sources": [{"source": "manual.pdf", "chunk": 3, "text": "quoted"}]
            }"#,
        )
        .unwrap();
        assert_eq!(response.response.as_deref(), Some("See the manual."));
        let sources = response.sources.unwrap();
        assert_eq!(sources[0].source.as_deref(), Some("manual.pdf"));
        assert_eq!(sources[0].chunk, Some(3));
        assert_eq!(sources[0].text.as_deref(), Some("quoted"));
    }

    #[test]
    fn test_chat_response_all_fields_optional() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.response.is_none());
        assert!(response.sources.is_none());
    }

    #[test]
    fn test_source_payload_defaults_missing_fields() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"response": "r", "sources": [{"chunk": 1}]}"#).unwrap();
        let sources = response.sources.unwrap();
        assert!(sources[0].source.is_none());
        assert_eq!(sources[0].chunk, Some(1));
        assert!(sources[0].text.is_none());
    }

    #[test]
    fn test_health_response_decodes() {
        let health: HealthResponse = serde_json::from_str(
            r#"{"status": "healthy", "document_count": 42, "model": "grok-4", "collection": "docs"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.document_count, 42);
    }

    #[test]
    fn test_unhealthy_status() {
        let health: HealthResponse = serde_json::from_str(
            r#"{"status": "degraded", "document_count": 0, "model": "m", "collection": "c"}"#,
        )
        .unwrap();
        assert!(!health.is_healthy());
    }
}
