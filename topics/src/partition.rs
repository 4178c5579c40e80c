use doctopic_core::ingest::Segment;

/// Splits `items` into exactly `fan_out` contiguous groups whose sizes
/// differ by at most one; the first `len % fan_out` groups get the extra
/// item. Groups may be empty when there are fewer items than groups. A
/// fan-out of zero is treated as one.
pub fn partition<T>(items: &[T], fan_out: usize) -> Vec<&[T]> {
    let fan_out = fan_out.max(1);
    let base = items.len() / fan_out;
    let remainder = items.len() % fan_out;

    let mut groups = Vec::with_capacity(fan_out);
    let mut start = 0;
    for i in 0..fan_out {
        let size = base + usize::from(i < remainder);
        groups.push(&items[start..start + size]);
        start += size;
    }
    groups
}

/// A contiguous run of segments analysed as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub index: usize,
    pub segments: Vec<Segment>,
}

impl DocumentChunk {
    /// Segment contents joined by a single space.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

pub fn chunk_document(segments: &[Segment], fan_out: usize) -> Vec<DocumentChunk> {
    partition(segments, fan_out)
        .into_iter()
        .enumerate()
        .map(|(index, group)| DocumentChunk {
            index,
            segments: group.to_vec(),
        })
        .collect()
}
