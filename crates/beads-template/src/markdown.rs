//! Markdown adapter (C5): parses a file into `{frontmatter, body}` and emits
//! it back out in a deterministic field order. Frontmatter is a minimal YAML
//! subset -- scalar `key: value`, block arrays (`-` items), inline arrays
//! (`[a, b]`), quoted/unquoted strings, booleans, null, integers, floats,
//! and `#` comments. No generic YAML feature (anchors, tags, multi-doc)
//! beyond this subset is recognized.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Result, TemplateError};

/// A scalar or list value recovered from frontmatter YAML.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<YamlValue>),
}

impl YamlValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[YamlValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A parsed document: frontmatter key/value map plus body text.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub frontmatter: HashMap<String, YamlValue>,
    pub body: String,
}

/// The deterministic field order frontmatter is emitted in.
const FIELD_ORDER: &[&str] = &[
    "id",
    "title",
    "status",
    "priority",
    "type",
    "labels",
    "assignees",
    "milestone",
    "depends_on",
    "blocks",
    "external_refs",
];

/// Parses `content` into a [`Document`]. If the title is absent from
/// frontmatter but the body begins with a `# Heading`, the heading text is
/// lifted into `title` and stripped from the body.
pub fn parse(content: &str) -> Result<Document> {
    let (frontmatter, mut body) = parse_frontmatter(content)?;
    let mut doc = Document { frontmatter, body: String::new() };

    if !doc.frontmatter.contains_key("title") {
        if let Some(rest) = body.strip_prefix("# ") {
            let (heading, remainder) = match rest.find('\n') {
                Some(idx) => (rest[..idx].trim().to_string(), rest[idx + 1..].to_string()),
                None => (rest.trim().to_string(), String::new()),
            };
            doc.frontmatter.insert("title".to_string(), YamlValue::Str(heading));
            body = remainder.trim_start_matches('\n').to_string();
        }
    }

    doc.body = body;
    Ok(doc)
}

fn parse_frontmatter(content: &str) -> Result<(HashMap<String, YamlValue>, String)> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.first().map(|l| l.trim()) != Some("---") {
        return Ok((HashMap::new(), content.to_string()));
    }

    let end = lines[1..]
        .iter()
        .position(|l| l.trim() == "---")
        .map(|i| i + 1);

    let Some(end) = end else {
        return Err(TemplateError::InvalidFrontmatter(
            "unterminated frontmatter block".to_string(),
        ));
    };

    let fm_lines = &lines[1..end];
    let map = parse_yaml_lines(fm_lines)?;

    let body_lines = &lines[end + 1..];
    let mut body = body_lines.join("\n").trim_start_matches('\n').to_string();
    // `str::lines` strips the final line terminator; restore it so the body
    // matches what was actually on disk.
    if content.ends_with('\n') {
        body.push('\n');
    }

    Ok((map, body))
}

fn parse_yaml_lines(lines: &[&str]) -> Result<HashMap<String, YamlValue>> {
    let mut map = HashMap::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        let Some((key, rest)) = trimmed.split_once(':') else {
            return Err(TemplateError::InvalidFrontmatter(format!(
                "expected 'key: value', found: {trimmed}"
            )));
        };
        let key = key.trim().to_string();
        let value_str = rest.trim();

        if value_str.is_empty() {
            let mut items = Vec::new();
            let mut j = i + 1;
            while j < lines.len() {
                let t = lines[j].trim_start();
                if let Some(item) = t.strip_prefix("- ") {
                    items.push(parse_scalar(item.trim()));
                    j += 1;
                } else if t == "-" {
                    items.push(YamlValue::Null);
                    j += 1;
                } else {
                    break;
                }
            }
            if j > i + 1 {
                map.insert(key, YamlValue::List(items));
                i = j;
            } else {
                map.insert(key, YamlValue::Null);
                i += 1;
            }
        } else if value_str.starts_with('[') && value_str.ends_with(']') {
            let inner = &value_str[1..value_str.len() - 1];
            let items = split_inline_list(inner).into_iter().map(parse_scalar).collect();
            map.insert(key, YamlValue::List(items));
            i += 1;
        } else {
            map.insert(key, parse_scalar(value_str));
            i += 1;
        }
    }

    Ok(map)
}

fn split_inline_list(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|s| s.trim()).collect()
}

fn parse_scalar(s: &str) -> YamlValue {
    let s = s.trim();
    if s.is_empty() || s == "null" || s == "~" {
        return YamlValue::Null;
    }
    if s == "true" {
        return YamlValue::Bool(true);
    }
    if s == "false" {
        return YamlValue::Bool(false);
    }
    if s.len() >= 2 {
        if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            return YamlValue::Str(inner.to_string());
        }
        if let Some(inner) = s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            return YamlValue::Str(inner.to_string());
        }
    }
    if let Ok(i) = s.parse::<i64>() {
        return YamlValue::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return YamlValue::Float(f);
    }
    YamlValue::Str(s.to_string())
}

/// Emits `doc` back to a full document string: frontmatter in the
/// deterministic [`FIELD_ORDER`] (known keys first, any remaining keys
/// sorted after), then the body.
pub fn emit(doc: &Document) -> String {
    let mut out = String::from("---\n");

    let mut remaining: Vec<&String> = doc
        .frontmatter
        .keys()
        .filter(|k| !FIELD_ORDER.contains(&k.as_str()))
        .collect();
    remaining.sort();

    for key in FIELD_ORDER.iter().map(|s| s.to_string()).chain(remaining.into_iter().cloned()) {
        if let Some(value) = doc.frontmatter.get(&key) {
            let _ = writeln!(out, "{key}: {}", emit_scalar(value));
        }
    }

    out.push_str("---\n\n");
    out.push_str(&doc.body);
    out
}

fn emit_scalar(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Int(i) => i.to_string(),
        YamlValue::Float(f) => f.to_string(),
        YamlValue::Str(s) => {
            if needs_quoting(s) {
                format!("\"{s}\"")
            } else {
                s.clone()
            }
        }
        YamlValue::List(items) => {
            let inner: Vec<String> = items.iter().map(emit_scalar).collect();
            format!("[{}]", inner.join(", "))
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.contains(':')
        || s.contains('#')
        || s.contains('[')
        || s != s.trim()
        || matches!(s, "true" | "false" | "null" | "~")
        || s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_inline_array_frontmatter() {
        let content = "---\nid: bd-1\nlabels: [bug, urgent]\npriority: 1\n---\n\nbody text\n";
        let doc = parse(content).unwrap();
        assert_eq!(doc.frontmatter.get("id").unwrap().as_str(), Some("bd-1"));
        assert_eq!(doc.frontmatter.get("priority").unwrap(), &YamlValue::Int(1));
        let labels = doc.frontmatter.get("labels").unwrap().as_list().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(doc.body, "body text\n");
    }

    #[test]
    fn parses_block_array_frontmatter() {
        let content = "---\ndepends_on:\n  - bd-1\n  - bd-2\n---\nbody\n";
        let doc = parse(content).unwrap();
        let items = doc.frontmatter.get("depends_on").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("bd-1"));
    }

    #[test]
    fn no_frontmatter_delimiter_yields_empty_map_and_full_body() {
        let content = "just a plain file\nwith two lines\n";
        let doc = parse(content).unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, content);
    }

    #[test]
    fn lifts_heading_into_title_when_absent() {
        let content = "---\nid: bd-1\n---\n\n# My Heading\n\nrest of body\n";
        let doc = parse(content).unwrap();
        assert_eq!(doc.frontmatter.get("title").unwrap().as_str(), Some("My Heading"));
        assert_eq!(doc.body, "rest of body\n");
    }

    #[test]
    fn does_not_lift_heading_when_title_already_present() {
        let content = "---\nid: bd-1\ntitle: Existing\n---\n\n# My Heading\n";
        let doc = parse(content).unwrap();
        assert_eq!(doc.frontmatter.get("title").unwrap().as_str(), Some("Existing"));
        assert_eq!(doc.body, "# My Heading\n");
    }

    #[test]
    fn unterminated_frontmatter_is_an_error() {
        let content = "---\nid: bd-1\nbody without closing delimiter";
        assert!(parse(content).is_err());
    }

    #[test]
    fn emit_uses_deterministic_field_order() {
        let mut doc = Document::default();
        doc.frontmatter.insert("priority".to_string(), YamlValue::Int(1));
        doc.frontmatter.insert("id".to_string(), YamlValue::Str("bd-1".to_string()));
        doc.frontmatter.insert("title".to_string(), YamlValue::Str("Fix it".to_string()));
        doc.body = "body\n".to_string();

        let out = emit(&doc);
        let id_pos = out.find("id:").unwrap();
        let title_pos = out.find("title:").unwrap();
        let priority_pos = out.find("priority:").unwrap();
        assert!(id_pos < title_pos);
        assert!(title_pos < priority_pos);
    }

    #[test]
    fn round_trips_through_parse_and_emit() {
        let content = "---\nid: bd-1\ntitle: Fix it\npriority: 2\nlabels: [bug, urgent]\n---\n\nbody text\n";
        let doc = parse(content).unwrap();
        let re_parsed = parse(&emit(&doc)).unwrap();
        assert_eq!(doc.frontmatter.get("id"), re_parsed.frontmatter.get("id"));
        assert_eq!(doc.frontmatter.get("labels"), re_parsed.frontmatter.get("labels"));
        assert_eq!(doc.body, re_parsed.body);
    }
}
