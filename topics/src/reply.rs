use crate::error::ReplyError;
use crate::normalize::normalize;
use crate::validate::ResponseValidator;
use doctopic_core::config::WeightStrategy;
use doctopic_core::model::TopicTree;
use serde_json::Value;

/// Turns raw judge output into a tree: parse, shape check, weight repair,
/// then (when `check_weights`) the weight checks.
pub fn interpret_reply(
    raw: &str,
    validator: &ResponseValidator,
    strategy: WeightStrategy,
    check_weights: bool,
) -> Result<TopicTree, ReplyError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let tree = validator.decode(&value)?;
    let tree = normalize(&tree, strategy)?;
    if check_weights {
        validator.validate_tree(&tree)?;
    }
    Ok(tree)
}

/// Removes a surrounding Markdown code fence such as "```json ... ```".
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with('{') => body[newline..].trim(),
        _ => body.trim(),
    }
}
