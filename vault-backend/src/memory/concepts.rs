//! Heuristic concept extraction from free text

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Capitalized two-word phrases ("Neural Networks")
static PROPER_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").unwrap());
/// Hyphen or underscore compounds ("machine-learning", "gene_therapy")
static COMPOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+(?:[-_]\w+)+\b").unwrap());
static ACRONYM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").unwrap());

pub const DOMAIN_KEYWORDS: &[&str] = &[
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural networks",
    "transformer",
    "attention mechanism",
    "quantum computing",
    "blockchain",
    "cryptography",
    "bioinformatics",
    "crispr",
    "gene therapy",
    "climate change",
    "renewable energy",
    "sustainability",
];

/// Deduplicated, sorted concept names found in `text`
pub fn extract_concepts(text: &str) -> Vec<String> {
    let mut concepts = BTreeSet::new();

    for re in [&*PROPER_PHRASE_RE, &*COMPOUND_RE, &*ACRONYM_RE] {
        for m in re.find_iter(text) {
            let concept = m.as_str().trim();
            if !concept.is_empty() {
                concepts.insert(concept.to_string());
            }
        }
    }

    let lower = text.to_lowercase();
    for keyword in DOMAIN_KEYWORDS {
        if lower.contains(keyword) {
            concepts.insert(title_case(keyword));
        }
    }

    concepts.into_iter().collect()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_patterns_and_keywords() {
        let concepts = extract_concepts(
            "We compared Neural Networks with a machine-learning baseline using NLP and a transformer.",
        );
        assert_eq!(
            concepts,
            vec!["NLP", "Neural Networks", "Transformer", "machine-learning"]
        );
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let concepts = extract_concepts("notes on crispr and Climate Change");
        assert!(concepts.contains(&"Crispr".to_string()));
        assert!(concepts.contains(&"Climate Change".to_string()));
        assert!(extract_concepts("plain lowercase text").is_empty());
    }
}
