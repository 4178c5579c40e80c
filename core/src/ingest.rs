use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestionRequest {
    Text {
        content: String,
        metadata: HashMap<String, String>,
    },
    File {
        filename: String,
        content: Vec<u8>,
        mime_type: String,
        metadata: HashMap<String, String>,
    },
}

impl IngestionRequest {
    pub fn text(content: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self::Text {
            content: content.into(),
            metadata,
        }
    }

    pub fn file(
        filename: impl Into<String>,
        content: Vec<u8>,
        mime_type: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self::File {
            filename: filename.into(),
            content,
            mime_type: mime_type.into(),
            metadata,
        }
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        match self {
            IngestionRequest::Text { metadata, .. } => metadata,
            IngestionRequest::File { metadata, .. } => metadata,
        }
    }
}

/// One text-bearing piece of a document, in original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl Segment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }
}

pub trait ContentHash {
    fn content_hash(&self) -> String;
}

impl ContentHash for IngestionRequest {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        match self {
            IngestionRequest::Text { content, .. } => {
                hasher.update(b"text");
                hasher.update(content.as_bytes());
            }
            IngestionRequest::File {
                content,
                mime_type,
                filename,
                ..
            } => {
                hasher.update(b"file");
                hasher.update(mime_type.as_bytes());
                hasher.update(filename.as_bytes());
                hasher.update(content);
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

impl ContentHash for Segment {
    fn content_hash(&self) -> String {
        self.content.as_str().content_hash()
    }
}

impl ContentHash for str {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_hash_depends_only_on_content() {
        let mut a = Segment::new("Revenue grew 20% YoY");
        a.metadata.insert("page".to_string(), "1".to_string());
        let b = Segment::new("Revenue grew 20% YoY");

        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash(), "Revenue grew 20% YoY".content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn text_and_file_requests_hash_differently() {
        let text = IngestionRequest::text("same", HashMap::new());
        let file = IngestionRequest::file("a.txt", b"same".to_vec(), "text/plain", HashMap::new());
        assert_ne!(text.content_hash(), file.content_hash());
    }
}
