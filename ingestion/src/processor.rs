use crate::chunker::{Chunker, ChunkingConfig, SemanticChunker};
use crate::embedding::{DeterministicEmbedder, Embedder};
use crate::extract::{detect_content_kind, extract_pdf_text, extract_utf8, split_pages, ContentKind};
use crate::index::DocumentIndex;
use doctopic_core::config::IngestionSettings;
use doctopic_core::error::{DoctopicError, ErrorCode};
use doctopic_core::ingest::{ContentHash, IngestionRequest, Segment};
use std::collections::HashMap;
use std::sync::Arc;
use storage::index::IndexError;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("No documents provided.")]
    NoDocuments,
    #[error("No valid pages found in the uploaded files.")]
    NoValidPages,
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),
    #[error("Invalid UTF-8 content in {0}")]
    InvalidUtf8(String),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

impl DoctopicError for IngestionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            IngestionError::NoDocuments
            | IngestionError::NoValidPages
            | IngestionError::UnsupportedType(_)
            | IngestionError::InvalidUtf8(_) => ErrorCode::InvalidArgument,
            IngestionError::Index(_) => ErrorCode::Internal,
        }
    }
}

/// Segments in document order plus the similarity index built over them.
pub struct ProcessedDocument {
    pub segments: Vec<Segment>,
    pub index: Arc<DocumentIndex>,
}

pub struct DocumentProcessor {
    chunker: Box<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    embedding_model: String,
}

impl DocumentProcessor {
    pub fn new() -> Self {
        Self::from_settings(&IngestionSettings::default())
    }

    pub fn from_settings(settings: &IngestionSettings) -> Self {
        Self {
            chunker: Box::new(SemanticChunker::new(ChunkingConfig::from(settings))),
            embedder: Arc::new(DeterministicEmbedder::from(settings)),
            embedding_model: settings.embedding_model.clone(),
        }
    }

    pub fn with_components(
        chunker: Box<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        embedding_model: &str,
    ) -> Self {
        Self {
            chunker,
            embedder,
            embedding_model: embedding_model.to_string(),
        }
    }

    pub async fn process(
        &self,
        requests: Vec<IngestionRequest>,
    ) -> Result<ProcessedDocument, IngestionError> {
        let segments = self.segment(requests).await?;
        let index =
            DocumentIndex::build(&segments, self.embedder.clone(), &self.embedding_model).await?;

        info!(segments = segments.len(), "documents processed");
        Ok(ProcessedDocument {
            segments,
            index: Arc::new(index),
        })
    }

    /// Extracts, pages and splits every request. Each segment carries its
    /// source metadata plus `page`, `content_hash` and a global
    /// `segment_index`.
    pub async fn segment(
        &self,
        requests: Vec<IngestionRequest>,
    ) -> Result<Vec<Segment>, IngestionError> {
        if requests.is_empty() {
            return Err(IngestionError::NoDocuments);
        }

        let mut segments = Vec::new();
        for request in requests {
            let content_hash = request.content_hash();
            let Some((text, mut metadata)) = extract_request_text(request)? else {
                continue;
            };
            metadata.insert("content_hash".to_string(), content_hash);

            for (page, page_text) in split_pages(&text) {
                let mut page_metadata = metadata.clone();
                page_metadata.insert("page".to_string(), page.to_string());
                segments.extend(self.chunker.chunk(page_text, page_metadata).await);
            }
        }

        if segments.is_empty() {
            return Err(IngestionError::NoValidPages);
        }

        for (i, segment) in segments.iter_mut().enumerate() {
            segment
                .metadata
                .insert("segment_index".to_string(), i.to_string());
        }
        Ok(segments)
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// `Ok(None)` for a PDF without extractable text: it contributes no pages
/// but does not fail the batch.
fn extract_request_text(
    request: IngestionRequest,
) -> Result<Option<(String, HashMap<String, String>)>, IngestionError> {
    match request {
        IngestionRequest::Text { content, metadata } => Ok(Some((content, metadata))),
        IngestionRequest::File {
            filename,
            content,
            mime_type,
            mut metadata,
        } => {
            let kind = detect_content_kind(&mime_type, Some(&filename));
            metadata.insert("filename".to_string(), filename.clone());
            metadata.insert("mime_type".to_string(), mime_type.clone());

            match kind {
                ContentKind::Text | ContentKind::Markdown | ContentKind::Json => {
                    let text =
                        extract_utf8(&content).map_err(|_| IngestionError::InvalidUtf8(filename))?;
                    Ok(Some((text, metadata)))
                }
                ContentKind::Pdf => match extract_pdf_text(&content) {
                    Some(text) => Ok(Some((text, metadata))),
                    None => {
                        warn!(filename = %filename, "no text extracted from pdf");
                        Ok(None)
                    }
                },
                ContentKind::Unsupported => Err(IngestionError::UnsupportedType(mime_type)),
            }
        }
    }
}
