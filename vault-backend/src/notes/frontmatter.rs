//! Parse and generate YAML frontmatter for notes.
//!
//! Hand-rolled YAML covering the subset vault notes use: scalar keys,
//! inline lists (`tags: [a, b]`) and block lists (`tags:` followed by `- a`).
//! Also extracts [[wikilinks]], markdown note links and #tags from body content.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Parsed note frontmatter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFrontmatter {
    pub title: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub tags: Vec<String>,
    pub aliases: Vec<String>,
    pub template: Option<String>,
    pub project: Option<String>,
    /// Every top-level key with its raw (unquoted) value; lists are joined with ", "
    pub fields: BTreeMap<String, String>,
}

/// A fully parsed note (frontmatter + body)
#[derive(Debug, Clone)]
pub struct ParsedNote {
    pub frontmatter: NoteFrontmatter,
    pub body: String,
}

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+\.md)\)").unwrap());
static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([a-zA-Z][a-zA-Z0-9_-]*)").unwrap());

/// Parse a complete note file (frontmatter + body)
pub fn parse_note(content: &str) -> ParsedNote {
    let (yaml, body) = split_frontmatter(content);
    ParsedNote {
        frontmatter: parse_frontmatter(&yaml),
        body,
    }
}

/// Split content into (frontmatter_yaml, body). Returns empty frontmatter if none found.
pub fn split_frontmatter(content: &str) -> (String, String) {
    let stripped = content.strip_prefix('\u{feff}').unwrap_or(content);
    let trimmed = stripped.trim_start();
    if !trimmed.starts_with("---") {
        return (String::new(), content.to_string());
    }

    let after_open = &trimmed[3..];
    if let Some(close_idx) = after_open.find("\n---") {
        let yaml = after_open[..close_idx].trim().to_string();
        let rest = &after_open[close_idx + 4..];
        // Drop the remainder of the closing delimiter line
        let body = match rest.find('\n') {
            Some(nl) => rest[nl + 1..].trim_start_matches('\n').to_string(),
            None => String::new(),
        };
        (yaml, body)
    } else {
        (String::new(), content.to_string())
    }
}

/// Parse YAML frontmatter string into NoteFrontmatter
pub fn parse_frontmatter(yaml: &str) -> NoteFrontmatter {
    let mut fm = NoteFrontmatter::default();
    let mut list_key: Option<String> = None;

    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix('-') {
            if let Some(key) = &list_key {
                let item = unquote(item);
                if !item.is_empty() {
                    push_list_item(&mut fm, key, item);
                }
            }
            continue;
        }

        // Nested maps are outside the supported subset
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        list_key = None;

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = value.trim();

        if value.is_empty() {
            list_key = Some(key.clone());
            fm.fields.insert(key, String::new());
            continue;
        }

        match key.as_str() {
            "title" => fm.title = Some(unquote(value)),
            "created" => fm.created = Some(unquote(value)),
            "date" => {
                if fm.created.is_none() {
                    fm.created = Some(unquote(value));
                }
            }
            "updated" | "modified" => fm.updated = Some(unquote(value)),
            "template" => fm.template = Some(unquote(value)),
            "project" => fm.project = Some(unquote(value)),
            "tags" | "tag" => fm.tags = parse_list(value),
            "aliases" => fm.aliases = parse_list(value),
            _ => {}
        }

        let raw = if value.starts_with('[') {
            parse_inline_list(value).join(", ")
        } else {
            unquote(value)
        };
        fm.fields.insert(key, raw);
    }

    fm
}

fn push_list_item(fm: &mut NoteFrontmatter, key: &str, item: String) {
    match key {
        "tags" | "tag" => fm.tags.push(item.clone()),
        "aliases" => fm.aliases.push(item.clone()),
        _ => {}
    }
    let entry = fm.fields.entry(key.to_string()).or_default();
    if !entry.is_empty() {
        entry.push_str(", ");
    }
    entry.push_str(&item);
}

/// Generate YAML frontmatter block (including both `---` delimiters)
pub fn generate_frontmatter(fm: &NoteFrontmatter) -> String {
    let mut lines = vec!["---".to_string()];

    if let Some(title) = &fm.title {
        lines.push(format!("title: \"{}\"", title.replace('"', "\\\"")));
    }
    if let Some(created) = &fm.created {
        lines.push(format!("created: {}", created));
    }
    if let Some(updated) = &fm.updated {
        lines.push(format!("updated: {}", updated));
    }
    if let Some(template) = &fm.template {
        lines.push(format!("template: {}", template));
    }
    if let Some(project) = &fm.project {
        lines.push(format!("project: \"{}\"", project.replace('"', "\\\"")));
    }
    if !fm.tags.is_empty() {
        let tags: Vec<String> = fm.tags.iter().map(|t| list_item(t)).collect();
        lines.push(format!("tags: [{}]", tags.join(", ")));
    }
    if !fm.aliases.is_empty() {
        let aliases: Vec<String> = fm.aliases.iter().map(|a| list_item(a)).collect();
        lines.push(format!("aliases: [{}]", aliases.join(", ")));
    }

    lines.push("---".to_string());
    lines.join("\n")
}

fn list_item(s: &str) -> String {
    if s.contains([',', '[', ']', '"', ':']) || s.trim() != s {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

/// Extract raw link targets: `[[Target]]`, `[[Target|alias]]`, `[[Target#heading]]`
/// and `[text](Target.md)`. Duplicates are removed, first occurrence kept.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for cap in WIKILINK_RE.captures_iter(text) {
        let target = cap[1].split('|').next().unwrap_or_default();
        let target = target.split('#').next().unwrap_or_default().trim();
        if !target.is_empty() && !links.iter().any(|l| l == target) {
            links.push(target.to_string());
        }
    }

    for cap in MARKDOWN_LINK_RE.captures_iter(text) {
        let target = cap[2].trim();
        if !target.is_empty() && !links.iter().any(|l| l == target) {
            links.push(target.to_string());
        }
    }

    links
}

/// Extract #inline-tags from text
pub fn extract_inline_tags(text: &str) -> Vec<String> {
    INLINE_TAG_RE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Split comma-separated user input into trimmed, non-empty items
pub fn parse_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Remove surrounding quotes from a string
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].replace("\\\"", "\"")
    } else {
        s.to_string()
    }
}

fn parse_list(value: &str) -> Vec<String> {
    if value.starts_with('[') {
        parse_inline_list(value)
    } else {
        parse_csv(&unquote(value))
    }
}

/// Parse an inline YAML list like [foo, bar, "baz qux"]
fn parse_inline_list(s: &str) -> Vec<String> {
    let s = s.trim();
    let inner = if s.starts_with('[') && s.ends_with(']') {
        &s[1..s.len() - 1]
    } else {
        s
    };

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in inner.chars() {
        match (quote, c) {
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (Some(q), _) if c == q => {
                quote = None;
                current.push(c);
            }
            (None, ',') => {
                items.push(unquote(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    items.push(unquote(&current));

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_with_frontmatter() {
        let content = r#"---
title: "Test Note"
created: 2026-02-18T14:32:00
tags: [ml, "deep learning"]
template: research
---

# Test Note

Body with [[wikilink]] and #inline-tag.
"#;
        let parsed = parse_note(content);
        assert_eq!(parsed.frontmatter.title.as_deref(), Some("Test Note"));
        assert_eq!(parsed.frontmatter.created.as_deref(), Some("2026-02-18T14:32:00"));
        assert_eq!(parsed.frontmatter.tags, vec!["ml", "deep learning"]);
        assert_eq!(parsed.frontmatter.template.as_deref(), Some("research"));
        assert!(parsed.body.starts_with("# Test Note"));
        assert!(!parsed.body.contains("---"));
        assert_eq!(
            parsed.frontmatter.fields.get("tags").map(String::as_str),
            Some("ml, deep learning")
        );
    }

    #[test]
    fn test_parse_block_list_tags() {
        let yaml = "title: Block\ntags:\n  - alpha\n  - \"beta\"\ndate: 2026-01-01";
        let fm = parse_frontmatter(yaml);
        assert_eq!(fm.tags, vec!["alpha", "beta"]);
        assert_eq!(fm.created.as_deref(), Some("2026-01-01"));
        assert_eq!(fm.fields.get("tags").map(String::as_str), Some("alpha, beta"));
    }

    #[test]
    fn test_parse_scalar_tags() {
        let fm = parse_frontmatter("tags: rust, notes");
        assert_eq!(fm.tags, vec!["rust", "notes"]);
    }

    #[test]
    fn test_parse_note_no_frontmatter() {
        let content = "# Just a heading\n\nSome body text.";
        let parsed = parse_note(content);
        assert!(parsed.frontmatter.title.is_none());
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_generate_frontmatter_round_trips() {
        let fm = NoteFrontmatter {
            title: Some("My \"Quoted\" Note".to_string()),
            created: Some("2026-02-18T14:00:00".to_string()),
            tags: vec!["tag1".to_string(), "with, comma".to_string()],
            ..Default::default()
        };
        let text = generate_frontmatter(&fm);
        assert!(text.starts_with("---\n"));
        assert!(text.ends_with("\n---"));

        let parsed = parse_note(&format!("{}\nbody", text));
        assert_eq!(parsed.frontmatter.title, fm.title);
        assert_eq!(parsed.frontmatter.tags, fm.tags);
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_extract_links() {
        let text = "See [[foo]], [[bar baz|alias]], [[foo]] again, [[Heading#Part]] \
                    and [the doc](folder/Doc.md) plus [web](https://example.com).";
        let links = extract_links(text);
        assert_eq!(links, vec!["foo", "bar baz", "Heading", "folder/Doc.md"]);
    }

    #[test]
    fn test_extract_inline_tags() {
        let text = "This is #rust and #web3 related.\n#another tag here, not a#tag";
        let tags = extract_inline_tags(text);
        assert_eq!(tags, vec!["rust", "web3", "another"]);
    }

    #[test]
    fn test_parse_csv() {
        assert_eq!(parse_csv(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_csv("").is_empty());
    }
}
