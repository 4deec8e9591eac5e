use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::lexical::{IndexedNote, LexicalIndex};

pub const PREVIEW_LEN: usize = 200;
pub const MERGE_SUGGESTION: &str = "Consider merging or cross-referencing these notes";

#[derive(Debug, Clone, Serialize)]
pub struct SimilarNote {
    pub path: String,
    pub title: String,
    pub similarity: f64,
    pub word_count: usize,
    pub common_tags: Vec<String>,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteRef {
    pub path: String,
    pub title: String,
    pub word_count: usize,
}

impl NoteRef {
    fn of(note: &IndexedNote) -> Self {
        Self {
            path: note.path.clone(),
            title: note.title.clone(),
            word_count: note.word_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub note1: NoteRef,
    pub note2: NoteRef,
    pub similarity: f64,
    pub suggestion: String,
}

/// Cosine similarity of two raw term-count vectors, in [0, 1]
pub fn cosine_similarity(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: u64 = small
        .iter()
        .filter_map(|(term, &x)| large.get(term).map(|&y| x as u64 * y as u64))
        .sum();
    if dot == 0 {
        return 0.0;
    }
    let norm_a: u64 = a.values().map(|&x| x as u64 * x as u64).sum();
    let norm_b: u64 = b.values().map(|&x| x as u64 * x as u64).sum();

    // Integer norms make identical vectors come out at exactly 1.0
    let score = dot as f64 / ((norm_a as f64) * (norm_b as f64)).sqrt();
    score.clamp(0.0, 1.0)
}

pub fn common_tags(a: &[String], b: &[String]) -> Vec<String> {
    let left: BTreeSet<&String> = a.iter().collect();
    let right: BTreeSet<&String> = b.iter().collect();
    left.intersection(&right).map(|t| (*t).clone()).collect()
}

pub fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_LEN {
        let mut out: String = body.chars().take(PREVIEW_LEN).collect();
        out.push_str("...");
        out
    } else {
        body.to_string()
    }
}

/// Notes scoring at least `threshold` against `path`, best first
pub fn find_similar(index: &LexicalIndex, path: &str, threshold: f64, limit: usize) -> Vec<SimilarNote> {
    let Some(target) = index.get(path) else {
        return vec![];
    };

    let mut matches: Vec<SimilarNote> = index
        .iter()
        .filter(|other| other.path != target.path)
        .filter_map(|other| {
            let similarity = cosine_similarity(&target.term_frequency, &other.term_frequency);
            (similarity >= threshold).then(|| SimilarNote {
                path: other.path.clone(),
                title: other.title.clone(),
                similarity,
                word_count: other.word_count,
                common_tags: common_tags(&target.tags, &other.tags),
                preview: preview(&other.body),
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.path.cmp(&b.path))
    });
    matches.truncate(limit.max(1));
    matches
}

/// Every unordered pair scoring at least `threshold`, best first
pub fn detect_duplicates(index: &LexicalIndex, threshold: f64) -> Vec<DuplicatePair> {
    let notes: Vec<&IndexedNote> = index.iter().collect();
    let mut pairs = Vec::new();

    for (i, a) in notes.iter().enumerate() {
        for b in &notes[i + 1..] {
            let similarity = cosine_similarity(&a.term_frequency, &b.term_frequency);
            if similarity >= threshold {
                pairs.push(DuplicatePair {
                    note1: NoteRef::of(a),
                    note2: NoteRef::of(b),
                    similarity,
                    suggestion: MERGE_SUGGESTION.to_string(),
                });
            }
        }
    }

    pairs.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.note1.path.cmp(&b.note1.path))
            .then_with(|| a.note2.path.cmp(&b.note2.path))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::lexical::term_frequency;
    use crate::notes::Note;
    use chrono::Local;

    fn index(notes: &[(&str, &str)]) -> LexicalIndex {
        let now = Local::now();
        LexicalIndex::from_notes(
            notes
                .iter()
                .map(|(p, b)| Note::from_content(p, b, now, now))
                .collect(),
        )
    }

    #[test]
    fn test_cosine_bounds_and_symmetry() {
        let a = term_frequency("machine learning neural network");
        let b = term_frequency("deep learning neural network");
        let c = term_frequency("cooking pasta recipe");
        let ab = cosine_similarity(&a, &b);
        assert_eq!(ab, cosine_similarity(&b, &a));
        assert!((ab - 0.75).abs() < 1e-12);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
        assert_eq!(cosine_similarity(&a, &a), 1.0);
        assert_eq!(cosine_similarity(&a, &HashMap::new()), 0.0);
    }

    #[test]
    fn test_identical_repeated_content_is_exactly_one() {
        let text = "alpha beta gamma alpha alpha delta epsilon beta ".repeat(37);
        let a = term_frequency(&text);
        let b = term_frequency(&text);
        assert_eq!(cosine_similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_find_similar_excludes_self_and_respects_limit() {
        let idx = index(&[
            ("a.md", "---\ntags: [ml, ai]\n---\nmachine learning neural network"),
            ("b.md", "---\ntags: [ai]\n---\ndeep learning neural network"),
            ("c.md", "machine learning neural network"),
            ("d.md", "nothing shared here"),
        ]);

        let results = find_similar(&idx, "a.md", 0.3, 10);
        let paths: Vec<&str> = results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["c.md", "b.md"]);
        assert_eq!(results[0].similarity, 1.0);
        assert_eq!(results[1].common_tags, vec!["ai"]);

        assert_eq!(find_similar(&idx, "a.md", 0.3, 0).len(), 1);
        assert!(find_similar(&idx, "ghost.md", 0.0, 10).is_empty());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_LEN + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_detect_duplicates_pairs_once() {
        let idx = index(&[
            ("b.md", "identical body about rust ownership"),
            ("a.md", "identical body about rust ownership"),
            ("c.md", "completely different words entirely"),
        ]);
        let pairs = detect_duplicates(&idx, 0.7);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].note1.path, "a.md");
        assert_eq!(pairs[0].note2.path, "b.md");
        assert_eq!(pairs[0].similarity, 1.0);
        assert_eq!(pairs[0].suggestion, MERGE_SUGGESTION);
    }
}
