use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Markdown,
    Json,
    Pdf,
    Unsupported,
}

pub fn normalize_mime(mime_type: &str) -> String {
    mime_type.split(';').next().unwrap_or("").trim().to_lowercase()
}

pub fn detect_content_kind(mime_type: &str, filename: Option<&str>) -> ContentKind {
    match normalize_mime(mime_type).as_str() {
        "text/plain" => ContentKind::Text,
        "text/markdown" => ContentKind::Markdown,
        "application/json" => ContentKind::Json,
        "application/pdf" => ContentKind::Pdf,
        _ => {
            let Some(name) = filename else {
                return ContentKind::Unsupported;
            };
            let ext = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            match ext.as_str() {
                "txt" => ContentKind::Text,
                "md" | "markdown" => ContentKind::Markdown,
                "json" => ContentKind::Json,
                "pdf" => ContentKind::Pdf,
                _ => ContentKind::Unsupported,
            }
        }
    }
}

pub fn extract_utf8(bytes: &[u8]) -> Result<String, std::string::FromUtf8Error> {
    String::from_utf8(bytes.to_vec())
}

/// Whole-document text, or None when the PDF cannot be read or has no text.
pub fn extract_pdf_text(bytes: &[u8]) -> Option<String> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match extracted {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            tracing::debug!("pdf extraction failed: {}", e);
            None
        }
        Err(_) => {
            tracing::debug!("pdf extraction panicked");
            None
        }
    }
}

/// Splits extracted text on form feeds into 1-based pages, dropping blank
/// pages. Text without form feeds is a single page.
pub fn split_pages(text: &str) -> Vec<(usize, &str)> {
    text.split('\u{c}')
        .enumerate()
        .map(|(i, page)| (i + 1, page))
        .filter(|(_, page)| !page.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_wins_over_extension() {
        assert_eq!(
            detect_content_kind("application/pdf; charset=binary", Some("notes.txt")),
            ContentKind::Pdf
        );
        assert_eq!(
            detect_content_kind("application/octet-stream", Some("CIM.PDF")),
            ContentKind::Pdf
        );
        assert_eq!(
            detect_content_kind("application/octet-stream", None),
            ContentKind::Unsupported
        );
    }

    #[test]
    fn split_pages_numbers_from_one_and_skips_blank_pages() {
        let pages = split_pages("first page\u{c}  \u{c}third page");
        assert_eq!(pages, vec![(1, "first page"), (3, "third page")]);

        assert_eq!(split_pages("no breaks"), vec![(1, "no breaks")]);
        assert!(split_pages("   ").is_empty());
    }

    #[test]
    fn garbage_pdf_bytes_yield_none() {
        assert_eq!(extract_pdf_text(b"definitely not a pdf"), None);
    }
}
