//! Response body decoding with readable failure messages.

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Width of the body excerpt shown around a decode failure.
const SNIPPET_WIDTH: usize = 24;

/// Deserialize `body`, reporting the JSON path and surrounding text on failure.
///
/// Hacker News answers `null` for unknown items, so callers usually decode into
/// an `Option<T>`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());

        let mut message = String::new();
        if !path.is_empty() && path != "." {
            message.push_str(&format!("at '{path}': "));
        }
        message.push_str(&describe(&inner.to_string()));
        message.push_str(&format!(
            " (line {line} col {column})\n{}",
            snippet(body, line, column)
        ));
        anyhow::anyhow!(message)
    })
}

/// Strip serde's trailing location and rephrase type mismatches as "expected X, got Y".
fn describe(message: &str) -> String {
    let message = message.split(" at line ").next().unwrap_or(message);
    match message
        .strip_prefix("invalid type: ")
        .and_then(|rest| rest.split_once(", expected "))
    {
        Some((actual, expected)) => format!("expected {expected}, got {actual}"),
        None => message.to_string(),
    }
}

fn snippet(body: &str, line: usize, column: usize) -> String {
    let Some(text) = body.lines().nth(line.saturating_sub(1)) else {
        return "(no content)".to_string();
    };
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return "(empty line)".to_string();
    }

    let at = column.saturating_sub(1).min(chars.len() - 1);
    let start = at.saturating_sub(SNIPPET_WIDTH / 2);
    let end = (at + SNIPPET_WIDTH / 2).min(chars.len());
    let excerpt: String = chars[start..end].iter().collect();

    format!("...{excerpt}...\n   {}^", " ".repeat(at - start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hackernews::HackerNewsStory;

    #[test]
    fn null_decodes_to_none() {
        let ids: Option<Vec<u64>> = decode("null").unwrap();
        assert!(ids.is_none());

        let story: Option<HackerNewsStory> = decode("null").unwrap();
        assert!(story.is_none());
    }

    #[test]
    fn id_list_decodes_in_order() {
        let ids: Option<Vec<u64>> = decode("[3, 1, 2]").unwrap();
        assert_eq!(ids, Some(vec![3, 1, 2]));
    }

    #[test]
    fn type_mismatch_reports_path() {
        let err = decode::<Option<HackerNewsStory>>(r#"{"id": 1, "score": "high"}"#)
            .unwrap_err()
            .to_string();

        assert!(err.contains("score"), "{err}");
        assert!(err.contains("expected i32, got string \"high\""), "{err}");
        assert!(err.contains('^'), "{err}");
    }

    #[test]
    fn truncated_body_is_an_error() {
        let err = decode::<Option<Vec<u64>>>("[1, 2,").unwrap_err().to_string();
        assert!(err.contains("line 1"), "{err}");
    }

    #[test]
    fn describe_keeps_unrecognized_messages() {
        assert_eq!(
            describe("trailing characters at line 1 column 5"),
            "trailing characters"
        );
    }
}
