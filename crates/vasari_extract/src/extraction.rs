//! Utilities for extracting structured records from completion responses.
//!
//! Extraction tries progressively more forgiving strategies:
//! 1. Parse the trimmed text directly.
//! 2. Markdown code blocks: ```json ... ```
//! 3. The substring from the first opening delimiter to the last closer.
//! 4. The longest balanced prefix of the candidate (recovers output that
//!    was cut off mid-stream or followed by stray delimiters).
//!
//! Whatever parses is then validated against the stage schema. Validation
//! happens here, once — a record that reaches downstream code satisfies its
//! schema by construction.

use serde_json::Value as JsonValue;
use vasari_core::{Record, Schema};
use vasari_error::{ExtractionError, ExtractionErrorKind};

/// Extract a schema-validated record from a raw completion response.
///
/// # Errors
///
/// - `NoCandidate` if the text holds no structural delimiter, or no
///   candidate parses.
/// - `UnbalancedDelimiters` if the best candidate never balances (the
///   generation was likely truncated).
/// - `SchemaViolation` naming the missing required paths if a candidate
///   parses but does not satisfy the schema.
///
/// # Examples
///
/// ```
/// use vasari_core::Schema;
/// use vasari_extract::extract_record;
///
/// let schema = Schema::new(["title", "items"]);
/// let response = r#"Sure! Here is the result: {"title":"X","items":[1,2,3]} Hope that helps."#;
///
/// let record = extract_record(response, &schema).unwrap();
/// assert_eq!(record.get_path("title").unwrap(), "X");
/// ```
pub fn extract_record(raw: &str, schema: &Schema) -> Result<Record, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::new(ExtractionErrorKind::NoCandidate(0)));
    }

    // Strategy 1: the whole response is the payload
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        tracing::debug!(strategy = "direct", "Parsed response directly");
        return validate(value, schema);
    }

    // Strategy 2: markdown code blocks
    if let Some(block) = extract_from_code_block(trimmed, "json") {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&block) {
            tracing::debug!(strategy = "fence", "Parsed fenced code block");
            return validate(value, schema);
        }
        // A fenced block holding structural delimiters is still the best
        // candidate: the fence tells us where the payload starts. A fence
        // of plain text falls through to the scan path.
        if block.contains(['{', '[']) {
            return repair_and_validate(&block, schema);
        }
    }

    // Strategy 3: first opening delimiter to last closer
    let Some(start) = trimmed.find(['{', '[']) else {
        tracing::error!(
            response_length = trimmed.len(),
            "No structured candidate found in response"
        );
        return Err(ExtractionError::new(ExtractionErrorKind::NoCandidate(
            trimmed.len(),
        )));
    };
    let end = trimmed.rfind(['}', ']']).filter(|e| *e > start);
    let candidate = match end {
        Some(end) => &trimmed[start..=end],
        None => &trimmed[start..],
    };

    if let Ok(value) = serde_json::from_str::<JsonValue>(candidate) {
        tracing::debug!(strategy = "scan", "Parsed delimited substring");
        return validate(value, schema);
    }

    // Strategy 4: longest balanced prefix of the candidate
    repair_and_validate(candidate, schema)
}

fn validate(value: JsonValue, schema: &Schema) -> Result<Record, ExtractionError> {
    let missing = schema.missing_paths(&value);
    if missing.is_empty() {
        Ok(Record::new(value))
    } else {
        tracing::warn!(missing = ?missing, "Extracted record violates schema");
        Err(ExtractionError::new(ExtractionErrorKind::SchemaViolation {
            missing,
        }))
    }
}

/// Parse the longest balanced prefix of a candidate, walking backward
/// through shorter balance points when the longest does not parse.
fn repair_and_validate(candidate: &str, schema: &Schema) -> Result<Record, ExtractionError> {
    let points = balance_points(candidate);
    if points.is_empty() {
        tracing::warn!(
            candidate_length = candidate.len(),
            "Candidate delimiters never balance, response likely truncated"
        );
        return Err(ExtractionError::new(
            ExtractionErrorKind::UnbalancedDelimiters,
        ));
    }

    for end in points.iter().rev() {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&candidate[..=*end]) {
            tracing::debug!(
                strategy = "repair",
                prefix_length = end + 1,
                candidate_length = candidate.len(),
                "Parsed balanced prefix of candidate"
            );
            return validate(value, schema);
        }
    }

    Err(ExtractionError::new(ExtractionErrorKind::NoCandidate(
        candidate.len(),
    )))
}

/// Extract content from markdown code blocks.
///
/// Looks for patterns like:
/// - ```language\n...\n```
/// - ``` ... ``` (no language specified)
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    // Pattern: ```language\n...\n```
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        if let Some(end) = response[content_start..].find("```") {
            let content = &response[content_start..content_start + end];
            return Some(content.trim().to_string());
        }
        // No closing fence found - likely truncated response
        return Some(response[content_start..].trim().to_string());
    }

    // Try without language specifier
    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        // Skip to next newline (in case there's a language specifier)
        let skip_to = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);

        if let Some(end) = response[skip_to..].find("```") {
            let content = &response[skip_to..skip_to + end];
            return Some(content.trim().to_string());
        }
        // No closing fence found - likely truncated response
        return Some(response[skip_to..].trim().to_string());
    }

    None
}

/// Byte offsets at which the candidate's delimiters balance.
///
/// Tracks a stack of expected closers for `{}` and `[]`, skipping anything
/// inside quoted strings (escape-aware). Scanning stops at a mismatched
/// closer; the text beyond it cannot belong to the payload.
fn balance_points(candidate: &str) -> Vec<usize> {
    let mut stack: Vec<char> = Vec::new();
    let mut points = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in candidate.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                    if stack.is_empty() {
                        points.push(i);
                    }
                } else {
                    break;
                }
            }
            _ => {}
        }
    }

    points
}
