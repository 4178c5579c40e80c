use doctopic_core::config::IngestionSettings;
use doctopic_core::ingest::Segment;
use std::collections::HashMap;
use text_splitter::TextSplitter;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 2000,
            overlap_chars: 200,
        }
    }
}

impl From<&IngestionSettings> for ChunkingConfig {
    fn from(settings: &IngestionSettings) -> Self {
        Self {
            max_chars: settings.max_chars,
            overlap_chars: settings.overlap_chars,
        }
    }
}

use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Chunker: Send + Sync {
    fn chunk<'a>(
        &'a self,
        content: &'a str,
        base_metadata: HashMap<String, String>,
    ) -> BoxFuture<'a, Vec<Segment>>;
}

/// Splits on semantic boundaries up to `max_chars`, prefixing each segment
/// after the first with the tail of its predecessor.
pub struct SemanticChunker {
    splitter: TextSplitter<text_splitter::Characters>,
    config: ChunkingConfig,
}

impl SemanticChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            splitter: TextSplitter::default().with_trim_chunks(true),
            config,
        }
    }
}

impl Default for SemanticChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

impl Chunker for SemanticChunker {
    fn chunk<'a>(
        &'a self,
        content: &'a str,
        base_metadata: HashMap<String, String>,
    ) -> BoxFuture<'a, Vec<Segment>> {
        Box::pin(async move {
            let max_chars = self.config.max_chars.max(1);
            let overlap_chars = self.config.overlap_chars.min(max_chars);

            let pieces: Vec<&str> = self.splitter.chunks(content, max_chars).collect();

            let mut out = Vec::with_capacity(pieces.len());
            for (i, piece) in pieces.iter().enumerate() {
                let text = if i > 0 && overlap_chars > 0 {
                    let overlap = tail_chars(pieces[i - 1], overlap_chars);
                    format!("{}{}", overlap, piece)
                } else {
                    piece.to_string()
                };

                let mut metadata = base_metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                metadata.insert("chunk_chars".to_string(), text.chars().count().to_string());
                metadata.insert("chunk_overlap".to_string(), overlap_chars.to_string());

                out.push(Segment {
                    content: text,
                    metadata,
                });
            }

            out
        })
    }
}

fn tail_chars(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }

    let mut chars: Vec<char> = text.chars().rev().take(count).collect();
    chars.reverse();
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_text_is_one_segment_without_overlap() {
        let chunker = SemanticChunker::default();
        let mut meta = HashMap::new();
        meta.insert("page".to_string(), "1".to_string());

        let segments = chunker.chunk("Revenue grew 20% YoY.", meta).await;

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "Revenue grew 20% YoY.");
        assert_eq!(segments[0].metadata.get("page").unwrap(), "1");
        assert_eq!(segments[0].metadata.get("chunk_index").unwrap(), "0");
    }

    #[tokio::test]
    async fn later_segments_carry_previous_tail() {
        let chunker = SemanticChunker::new(ChunkingConfig {
            max_chars: 20,
            overlap_chars: 5,
        });
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";

        let segments = chunker.chunk(text, HashMap::new()).await;

        assert!(segments.len() > 1);
        for pair in segments.windows(2) {
            let tail = tail_chars(&pair[0].content, 5);
            assert!(
                pair[1].content.starts_with(&tail),
                "{:?} should start with {:?}",
                pair[1].content,
                tail
            );
        }
    }

    #[test]
    fn tail_chars_is_char_aware() {
        assert_eq!(tail_chars("héllo", 3), "llo");
        assert_eq!(tail_chars("ab", 5), "ab");
        assert_eq!(tail_chars("ab", 0), "");
    }
}
