use crate::error::StoreError;
use crate::node::{Literal, Node, NodeShape};
use std::collections::BTreeMap;

pub const MAX_NESTING: usize = 128;

pub fn parse(text: &str) -> Result<Node, StoreError> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return Err(StoreError::syntax("empty input"));
    }
    log::debug!("parsing {} bytes of save text", cleaned.len());
    fragment(&cleaned, 0)
}

pub fn classify(text: &str) -> NodeShape {
    shape_of(&clean(text))
}

pub fn parse_array(text: &str) -> Result<Node, StoreError> {
    let cleaned = clean(text);
    expect_shape(&cleaned, NodeShape::Array)?;
    array(&cleaned, 0)
}

pub fn parse_object(text: &str) -> Result<Node, StoreError> {
    let cleaned = clean(text);
    expect_shape(&cleaned, NodeShape::Object)?;
    object(&cleaned, 0)
}

pub fn parse_scalar(text: &str) -> Result<Literal, StoreError> {
    let cleaned = clean(text);
    expect_shape(&cleaned, NodeShape::Scalar)?;
    scalar(&cleaned)
}

/// `separator` must not be a quote, a backslash or a bracket.
pub fn safe_split(text: &str, separator: char) -> Result<Vec<&str>, StoreError> {
    let mut parts = Vec::new();
    let mut open: Vec<char> = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = false;
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            '[' => open.push(']'),
            '{' => open.push('}'),
            ']' | '}' => {
                if open.pop() != Some(ch) {
                    return Err(StoreError::syntax(format!(
                        "unbalanced '{}' at offset {}",
                        ch, i
                    )));
                }
            }
            c if c == separator && open.is_empty() => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(StoreError::syntax("unterminated string literal"));
    }
    if let Some(closer) = open.last() {
        return Err(StoreError::syntax(format!("missing '{}'", closer)));
    }

    parts.push(&text[start..]);
    Ok(parts)
}

// Line breaks and tabs carry no meaning in the format; the printer escapes
// them inside strings, so they can be dropped before scanning.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn shape_of(text: &str) -> NodeShape {
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        NodeShape::Array
    } else if text.len() >= 2 && text.starts_with('{') && text.ends_with('}') {
        NodeShape::Object
    } else {
        NodeShape::Scalar
    }
}

fn expect_shape(text: &str, expected: NodeShape) -> Result<(), StoreError> {
    let found = shape_of(text);
    if found != expected {
        return Err(StoreError::syntax(format!(
            "expected {}, found {}",
            expected.describe(),
            found.describe()
        )));
    }
    Ok(())
}

fn fragment(text: &str, depth: usize) -> Result<Node, StoreError> {
    let text = text.trim();
    match shape_of(text) {
        NodeShape::Array => array(text, depth),
        NodeShape::Object => object(text, depth),
        NodeShape::Scalar => scalar(text).map(Node::Scalar),
    }
}

fn enter(depth: usize) -> Result<usize, StoreError> {
    if depth >= MAX_NESTING {
        return Err(StoreError::syntax(format!(
            "nesting deeper than {} levels",
            MAX_NESTING
        )));
    }
    Ok(depth + 1)
}

fn array(text: &str, depth: usize) -> Result<Node, StoreError> {
    let depth = enter(depth)?;
    let body = &text[1..text.len() - 1];
    let mut items = Vec::new();
    for segment in safe_split(body, ',')? {
        if segment.trim().is_empty() {
            continue;
        }
        items.push(fragment(segment, depth)?);
    }
    Ok(Node::Array(items))
}

fn object(text: &str, depth: usize) -> Result<Node, StoreError> {
    let depth = enter(depth)?;
    let body = &text[1..text.len() - 1];
    let mut entries = BTreeMap::new();
    for segment in safe_split(body, ',')? {
        if segment.trim().is_empty() {
            continue;
        }
        let pair = safe_split(segment, ':')?;
        if pair.len() != 2 {
            return Err(StoreError::syntax(format!(
                "expected one ':' in object entry '{}', found {}",
                segment.trim(),
                pair.len() - 1
            )));
        }

        let raw_key = pair[0].trim();
        if !is_quoted(raw_key) {
            return Err(StoreError::syntax(format!(
                "object key must be a quoted string, found '{}'",
                raw_key
            )));
        }
        let key = unescape(&raw_key[1..raw_key.len() - 1])?;
        let value = fragment(pair[1], depth)?;
        if entries.insert(key.clone(), value).is_some() {
            return Err(StoreError::syntax(format!("duplicate key '{}'", key)));
        }
    }
    Ok(Node::Object(entries))
}

fn scalar(text: &str) -> Result<Literal, StoreError> {
    if is_quoted(text) {
        return unescape(&text[1..text.len() - 1]).map(Literal::Str);
    }

    if is_numeric(text) {
        return match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Literal::Number(n)),
            _ => Err(StoreError::syntax(format!("malformed number '{}'", text))),
        };
    }

    match text.to_ascii_lowercase().as_str() {
        "true" => Ok(Literal::Bool(true)),
        "false" => Ok(Literal::Bool(false)),
        _ => Err(StoreError::syntax(format!(
            "unrecognized scalar token '{}'",
            text
        ))),
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn is_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn unescape(raw: &str) -> Result<String, StoreError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('/') => out.push('/'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('u') => out.push(unicode_escape(&mut chars)?),
                Some(other) => {
                    return Err(StoreError::syntax(format!(
                        "unsupported escape '\\{}'",
                        other
                    )));
                }
                None => return Err(StoreError::syntax("dangling '\\' at end of string")),
            },
            '"' => return Err(StoreError::syntax("unescaped '\"' inside string")),
            c => out.push(c),
        }
    }
    Ok(out)
}

// Reads the four hex digits of a `\uXXXX` escape.
fn unicode_escape(chars: &mut std::str::Chars<'_>) -> Result<char, StoreError> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::syntax(format!("malformed escape '\\u{}'", hex)));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| StoreError::syntax(format!("escape '\\u{}' is not a character", hex)))
}
