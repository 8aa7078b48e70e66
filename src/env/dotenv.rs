// src/env/dotenv.rs

//! Minimal `.env` parser.

use std::collections::HashMap;

/// Parse `KEY=VALUE` lines.
///
/// Supported:
/// - blank lines and `#` comments
/// - an optional `export ` prefix
/// - single-quoted values (taken literally)
/// - double-quoted values (`\n` is unescaped)
/// - trailing ` # comment` on unquoted values
///
/// Lines without `=` or with an invalid key are ignored.
pub fn parse_dotenv(contents: &str) -> HashMap<String, String> {
    contents.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if !is_valid_key(key) {
        return None;
    }

    Some((key.to_string(), parse_value(raw.trim())))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

fn parse_value(raw: &str) -> String {
    if let Some(inner) = quoted(raw, '\'') {
        return inner.to_string();
    }
    if let Some(inner) = quoted(raw, '"') {
        return inner.replace("\\n", "\n").replace("\\\"", "\"");
    }

    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

fn quoted(raw: &str, quote: char) -> Option<&str> {
    let rest = raw.strip_prefix(quote)?;
    let end = rest.rfind(quote)?;
    Some(&rest[..end])
}
