//! Parse model output into answers and rolling findings

use crate::error::AnalyzeError;
use pdflens_domain::QueryResponse;
use serde_json::Value;
use tracing::warn;

/// Structured reply from one analysis call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// Answers in the order the model gave them
    pub responses: Vec<QueryResponse>,

    /// Rolling findings, when the call asked for them and the model supplied them
    pub findings_summary: Option<String>,
}

/// Parse a model reply
///
/// An empty reply counts as `{}`. A missing `responses` array yields no
/// answers, leaving reconciliation to fill placeholders. Malformed entries
/// keep their position with whatever text they carry.
pub fn parse_model_reply(response: &str) -> Result<ModelReply, AnalyzeError> {
    let json_str = extract_json(response)?;
    if json_str.trim().is_empty() {
        return Ok(ModelReply::default());
    }

    let json: Value = serde_json::from_str(&json_str)?;

    let obj = json
        .as_object()
        .ok_or_else(|| AnalyzeError::InvalidResponse("Expected JSON object".to_string()))?;

    let responses = match obj.get("responses") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| parse_entry(idx, item))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            return Err(AnalyzeError::InvalidResponse(
                "'responses' is not an array".to_string(),
            ))
        }
    };

    let findings_summary = obj
        .get("findings_summary")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(ModelReply {
        responses,
        findings_summary,
    })
}

fn parse_entry(idx: usize, item: &Value) -> QueryResponse {
    let field = |name: &str| item.get(name).and_then(|v| v.as_str());
    if field("query").is_none() || field("answer").is_none() {
        warn!("Response entry {} is missing 'query' or 'answer'", idx);
    }
    QueryResponse::new(
        field("query").unwrap_or_default(),
        field("answer").unwrap_or_default(),
    )
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, AnalyzeError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(AnalyzeError::InvalidResponse("Empty code block".to_string()));
        }

        // Skip the opening fence line and the closing fence
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
