//! JSON extraction from model text.
//!
//! Gemini honours `responseMimeType` most of the time, but occasionally
//! wraps the payload in a markdown fence or adds a preamble.

/// Extract the JSON document from a model response.
///
/// Tries, in order: the whole trimmed text, a fenced code block, and the
/// first balanced `{...}` or `[...]` region. Returns `None` if nothing
/// looks like JSON.
///
/// # Examples
///
/// ```
/// use tableau_models::extract_json;
///
/// let response = "Sure!\n```json\n{\"title\": \"Night Ferry\"}\n```";
/// assert_eq!(extract_json(response).as_deref(), Some("{\"title\": \"Night Ferry\"}"));
/// ```
pub fn extract_json(response: &str) -> Option<String> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed.to_string());
    }
    if let Some(fenced) = from_code_block(trimmed) {
        return Some(fenced);
    }

    let brace = trimmed.find('{');
    let bracket = trimmed.find('[');
    match (brace, bracket) {
        (Some(b), Some(k)) if k < b => balanced(trimmed, '[', ']'),
        (Some(_), _) => balanced(trimmed, '{', '}'),
        (None, Some(_)) => balanced(trimmed, '[', ']'),
        (None, None) => None,
    }
}

fn from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")? + 3;
    // Skip an optional language tag
    let body_start = response[start..]
        .find('\n')
        .map(|n| start + n + 1)
        .unwrap_or(start);
    let body = match response[body_start..].find("```") {
        Some(end) => &response[body_start..body_start + end],
        None => &response[body_start..],
    };
    Some(body.trim().to_string())
}

fn balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_is_returned_as_is() {
        assert_eq!(extract_json("  [1, 2]  ").as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn preamble_is_skipped() {
        let text = "Here you go: {\"a\": \"}\"} trailing";
        assert_eq!(extract_json(text).as_deref(), Some("{\"a\": \"}\"}"));
    }

    #[test]
    fn prose_only_yields_none() {
        assert_eq!(extract_json("no data here"), None);
        assert_eq!(extract_json("   "), None);
    }
}
