use crate::extract::normalize_mime;
use doctopic_core::error::{DoctopicError, ErrorCode};
use doctopic_core::ingest::IngestionRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No files uploaded.")]
    NoFiles,
    #[error("No valid PDF files uploaded.")]
    NoPdfFiles,
}

impl DoctopicError for UploadError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

/// One multipart file as handed over by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Only the declared content type counts; the extension is ignored.
    pub fn is_pdf(&self) -> bool {
        normalize_mime(&self.content_type) == "application/pdf"
    }

    pub fn into_request(self) -> IngestionRequest {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), self.filename.clone());
        IngestionRequest::File {
            filename: self.filename,
            content: self.bytes,
            mime_type: self.content_type,
            metadata,
        }
    }
}

/// Keeps the PDF uploads, preserving order.
pub fn select_pdf_uploads(files: Vec<UploadedFile>) -> Result<Vec<IngestionRequest>, UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    let requests: Vec<IngestionRequest> = files
        .into_iter()
        .filter(UploadedFile::is_pdf)
        .map(UploadedFile::into_request)
        .collect();

    if requests.is_empty() {
        return Err(UploadError::NoPdfFiles);
    }
    Ok(requests)
}
