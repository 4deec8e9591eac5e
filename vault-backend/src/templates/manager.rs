use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::builtin::{BUILTIN_TEMPLATES, STATIC_DEFAULTS};
use crate::error::{Result, VaultError};

struct TemplateEntry {
    body: String,
    category: String,
    description: String,
}

/// Per-template details returned by `template_info`
#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub category: String,
    pub description: String,
    pub variables: Vec<String>,
}

/// Where a dated note should live and how to fill it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePlan {
    pub path: String,
    pub label: String,
    pub template: String,
    pub suggested_tags: String,
}

/// Named note templates filled by `{placeholder}` substitution with default fallback
pub struct TemplateManager {
    templates: BTreeMap<String, TemplateEntry>,
    defaults: HashMap<String, String>,
}

impl TemplateManager {
    pub fn new() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|t| {
                (
                    t.name.to_string(),
                    TemplateEntry {
                        body: t.body.to_string(),
                        category: t.category.to_string(),
                        description: t.description.to_string(),
                    },
                )
            })
            .collect();
        let defaults = STATIC_DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self { templates, defaults }
    }

    pub fn get_template(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|t| t.body.as_str())
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn categories(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.templates.values().map(|t| t.category.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    pub fn templates_in_category(&self, category: &str) -> Vec<String> {
        self.templates
            .iter()
            .filter(|(_, t)| t.category == category)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Add or replace a template
    pub fn create_custom_template(&mut self, name: &str, body: &str, category: Option<&str>) {
        self.templates.insert(
            name.to_string(),
            TemplateEntry {
                body: body.to_string(),
                category: category.unwrap_or("custom").to_string(),
                description: "Custom template".to_string(),
            },
        );
    }

    /// Fill a template: defaults, then clock-derived values, then caller variables.
    pub fn fill_template(&self, name: &str, variables: &HashMap<String, String>) -> Result<String> {
        let entry = self
            .templates
            .get(name)
            .ok_or_else(|| VaultError::UnknownTemplate {
                name: name.to_string(),
                available: self.names(),
            })?;

        let now = Local::now();
        let mut values = self.defaults.clone();
        values.insert("date".to_string(), now.format("%Y-%m-%d").to_string());
        values.insert("time".to_string(), now.format("%H:%M").to_string());
        values.insert("week".to_string(), now.format("%Y-W%W").to_string());
        for (k, v) in variables {
            values.insert(k.clone(), v.clone());
        }

        render(&entry.body, &values).map_err(|missing| VaultError::Template {
            template: name.to_string(),
            missing,
        })
    }

    pub fn template_info(&self) -> Vec<TemplateInfo> {
        self.templates
            .iter()
            .map(|(name, t)| TemplateInfo {
                name: name.clone(),
                category: t.category.clone(),
                description: t.description.clone(),
                variables: placeholders(&t.body).into_iter().collect(),
            })
            .collect()
    }
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new()
    }
}

enum Piece<'a> {
    Text(&'a str),
    Literal(char),
    Placeholder(&'a str),
}

/// Tokenize a template body. Unterminated `{` is kept as text.
fn pieces(body: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = body;

    while let Some(idx) = rest.find(['{', '}']) {
        if idx > 0 {
            out.push(Piece::Text(&rest[..idx]));
        }
        let tail = &rest[idx..];
        if tail.starts_with("{{") {
            out.push(Piece::Literal('{'));
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push(Piece::Literal('}'));
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail[1..].find(['}', '{']) {
                Some(end) if tail.as_bytes()[1 + end] == b'}' => {
                    out.push(Piece::Placeholder(&tail[1..1 + end]));
                    rest = &tail[end + 2..];
                }
                _ => {
                    out.push(Piece::Text("{"));
                    rest = &tail[1..];
                }
            }
        } else {
            out.push(Piece::Text("}"));
            rest = &tail[1..];
        }
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}

/// Substitute placeholders. Returns the first missing variable name on failure.
pub fn render(body: &str, values: &HashMap<String, String>) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(body.len());
    for piece in pieces(body) {
        match piece {
            Piece::Text(t) => out.push_str(t),
            Piece::Literal(c) => out.push(c),
            Piece::Placeholder(key) => match values.get(key.trim()) {
                Some(v) => out.push_str(v),
                None => return Err(key.to_string()),
            },
        }
    }
    Ok(out)
}

/// Placeholder names used by a template body
pub fn placeholders(body: &str) -> BTreeSet<String> {
    pieces(body)
        .into_iter()
        .filter_map(|p| match p {
            Piece::Placeholder(key) => Some(key.trim().to_string()),
            _ => None,
        })
        .collect()
}

/// Daily note location for `date` (defaults to `today`)
pub fn daily_note_plan(date: Option<NaiveDate>, today: NaiveDate) -> NotePlan {
    let date = date.unwrap_or(today);
    let label = date.format("%Y-%m-%d").to_string();
    NotePlan {
        path: format!("Daily Notes/{}.md", label),
        template: "daily-note".to_string(),
        suggested_tags: format!(
            "daily-note, {}, {}",
            date.format("%Y"),
            date.format("%B").to_string().to_lowercase()
        ),
        label,
    }
}

/// Weekly review location for the week containing `today` (weeks start Monday)
pub fn weekly_review_plan(today: NaiveDate) -> NotePlan {
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let label = week_start.format("%Y-W%W").to_string();
    NotePlan {
        path: format!("Weekly Reviews/{}.md", label),
        template: "weekly-review".to_string(),
        suggested_tags: format!("weekly-review, {}, planning", week_start.format("%Y")),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_every_builtin_fills_with_defaults_only() {
        let manager = TemplateManager::new();
        for name in manager.names() {
            let filled = manager.fill_template(&name, &HashMap::new());
            assert!(filled.is_ok(), "template {} failed: {:?}", name, filled.err());
        }
    }

    #[test]
    fn test_fill_template_overrides_defaults() {
        let manager = TemplateManager::new();
        let filled = manager
            .fill_template("research", &vars(&[("title", "Attention"), ("status", "Final")]))
            .unwrap();
        assert!(filled.starts_with("# Attention"));
        assert!(filled.contains("**Status**: Final"));
        assert!(filled.contains("**Confidence Level**: 7/10"));
    }

    #[test]
    fn test_unknown_template() {
        let manager = TemplateManager::new();
        let err = manager.fill_template("nope", &HashMap::new()).unwrap_err();
        match err {
            VaultError::UnknownTemplate { name, available } => {
                assert_eq!(name, "nope");
                assert!(available.contains(&"research".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_template_missing_variable() {
        let mut manager = TemplateManager::new();
        manager.create_custom_template("snippet", "Hi {name}, {{literal}}", None);
        assert_eq!(manager.templates_in_category("custom"), vec!["snippet"]);

        let err = manager.fill_template("snippet", &HashMap::new()).unwrap_err();
        assert!(matches!(err, VaultError::Template { ref missing, .. } if missing == "name"));

        let ok = manager.fill_template("snippet", &vars(&[("name", "Ada")])).unwrap();
        assert_eq!(ok, "Hi Ada, {literal}");
    }

    #[test]
    fn test_render_keeps_unterminated_brace() {
        let out = render("a { b } c {x}", &vars(&[("x", "1")]));
        // "{ b }" is a placeholder named " b " -> trimmed "b", which is missing
        assert_eq!(out.unwrap_err(), " b ");
        assert_eq!(render("open { only", &HashMap::new()).unwrap(), "open { only");
        assert_eq!(render("close } only", &HashMap::new()).unwrap(), "close } only");
    }

    #[test]
    fn test_template_info_lists_variables() {
        let manager = TemplateManager::new();
        let info = manager.template_info();
        let daily = info.iter().find(|t| t.name == "daily-note").unwrap();
        assert_eq!(daily.category, "productivity");
        assert!(daily.variables.contains(&"main_priority".to_string()));
        assert!(manager.categories().contains(&"technical".to_string()));
    }

    #[test]
    fn test_daily_and_weekly_plans() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(); // Wednesday
        let daily = daily_note_plan(None, today);
        assert_eq!(daily.path, "Daily Notes/2026-10-14.md");
        assert_eq!(daily.suggested_tags, "daily-note, 2026, october");

        let weekly = weekly_review_plan(today);
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(weekly.label, monday.format("%Y-W%W").to_string());
        assert_eq!(weekly.template, "weekly-review");
    }
}
