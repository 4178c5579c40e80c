//! Prompt templates for the two topic judgments.
//!
//! Both calls share one response schema; they differ in the instructions
//! and in what fills the `{text}` slot (document text for a chunk, a JSON
//! array of chunk results for the merge).

use serde_json::{json, Value};

pub const TEXT_SLOT: &str = "{text}";

pub const CHUNK_PROMPT_HEADER: &str =
    "You are an investment analyst reviewing a confidential information memorandum.";

pub const MERGE_PROMPT_HEADER: &str =
    "You are an expert topic analyst. Combine these separate analyses into one coherent structure.";

const CHUNK_TEMPLATE: &str = r#"You are an investment analyst reviewing a confidential information memorandum.
Classify the content of the text below into mutually exclusive topics, subtopics and sub-subtopics.
For every entry give 2 to 3 lines quoted directly from the text as its citation, and the page and
line range the quote comes from.

Weights:
- top-level topic values sum to 100
- subtopic values sum to their topic's value
- sub-subtopic values sum to their subtopic's value

Reply with a single JSON object matching this schema:
{schema}

Text for analysis: {text}
"#;

const MERGE_TEMPLATE: &str = r#"You are an expert topic analyst. Combine these separate analyses into one coherent structure.
Previous analyses: {text}

Guidelines:
1. Identify themes common to the analyses and merge topics that describe the same thing.
2. Prefer topics that appear consistently across analyses.
3. Re-derive the values so that top-level topics sum to 100, subtopics sum to their topic's
   value and sub-subtopics sum to their subtopic's value.
4. Keep a citation and page reference on every entry.

Reply with a single JSON object matching this schema:
{schema}
"#;

/// Shape shared by chunk and merge replies.
pub fn topic_schema() -> Value {
    let leaf = json!({
        "name": "string",
        "value": "number",
        "citation": "string",
        "pages": "string"
    });

    let mut subtopic = leaf.clone();
    subtopic["subsubtopics"] = json!([leaf.clone()]);

    let mut topic = leaf;
    topic["subtopics"] = json!([subtopic]);

    json!({ "topics": [topic] })
}

pub fn render_chunk_prompt(text: &str) -> String {
    render(CHUNK_TEMPLATE, text)
}

pub fn render_merge_prompt(analyses_json: &str) -> String {
    render(MERGE_TEMPLATE, analyses_json)
}

pub fn is_merge_prompt(prompt: &str) -> bool {
    prompt.starts_with(MERGE_PROMPT_HEADER)
}

fn render(template: &str, text: &str) -> String {
    let schema = serde_json::to_string_pretty(&topic_schema()).unwrap_or_default();
    // Schema first: the document text may itself contain "{schema}".
    template
        .replace("{schema}", &schema)
        .replacen(TEXT_SLOT, text, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_nests_three_levels() {
        let schema = topic_schema();
        let topic = &schema["topics"][0];
        let sub = &topic["subtopics"][0];
        let subsub = &sub["subsubtopics"][0];

        assert_eq!(topic["value"], "number");
        assert_eq!(subsub["name"], "string");
        assert!(subsub.get("subsubtopics").is_none());
    }

    #[test]
    fn chunk_prompt_embeds_text_once() {
        let prompt = render_chunk_prompt("Revenue grew 20% YoY {text}");
        assert!(prompt.starts_with(CHUNK_PROMPT_HEADER));
        assert!(prompt.contains("Text for analysis: Revenue grew 20% YoY {text}"));
        assert!(prompt.contains("\"subsubtopics\""));
        assert!(!is_merge_prompt(&prompt));
    }

    #[test]
    fn merge_prompt_carries_previous_analyses() {
        let prompt = render_merge_prompt("[]");
        assert!(is_merge_prompt(&prompt));
        assert!(prompt.contains("Previous analyses: []"));
    }
}
