//! Lightweight content analysis: type detection, keyword tags, summaries.
//!
//! These heuristics are deliberately simple keyword checks — good enough to
//! give untyped documents a useful default type and a handful of searchable
//! tags without any model involvement.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chunking::count_words;

static TAG_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("urgent", r"urgent|priority|asap|immediate"),
        ("confidential", r"confidential|secret|private|restricted"),
        ("financial", r"financial|budget|cost|revenue|profit"),
        ("technical", r"technical|engineering|development|code"),
        ("meeting", r"meeting|conference|discussion|agenda"),
        ("project", r"project|milestone|deadline|deliverable"),
    ]
    .into_iter()
    .map(|(tag, pattern)| (tag, Regex::new(pattern).expect("tag pattern")))
    .collect()
});

/// Infer a coarse document type from title and content keywords.
pub fn detect_doc_type(content: &str, title: &str) -> &'static str {
    let text = format!("{title} {content}").to_lowercase();
    if ["policy", "procedure", "guideline"].iter().any(|k| text.contains(k)) {
        "policy"
    } else if ["research", "study", "analysis"].iter().any(|k| text.contains(k)) {
        "research"
    } else if ["manual", "instructions", "how to"].iter().any(|k| text.contains(k)) {
        "manual"
    } else if ["report", "summary", "findings"].iter().any(|k| text.contains(k)) {
        "report"
    } else {
        "document"
    }
}

/// Keyword-derived tags for a document.
pub fn extract_tags(content: &str) -> Vec<String> {
    let text = content.to_lowercase();
    TAG_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Sentence-bounded preview of at most `max_length` characters.
///
/// Whole sentences are appended while they fit; an ellipsis marks truncation.
pub fn summarize(content: &str, max_length: usize) -> String {
    let sentences: Vec<&str> = content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let Some(first) = sentences.first() else {
        return String::new();
    };

    let mut summary = first.to_string();
    for sentence in &sentences[1..] {
        if summary.len() >= max_length || summary.len() + sentence.len() + 2 > max_length {
            break;
        }
        summary.push_str(". ");
        summary.push_str(sentence);
    }

    if summary.len() < content.len() {
        summary.push_str("...");
    }
    summary
}

/// One entry in the key-phrase frequency list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub word: String,
    pub frequency: usize,
}

/// Aggregate analysis of a document's content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub char_count: usize,
    pub sentences: usize,
    pub avg_words_per_sentence: usize,
    pub readability_score: i32,
    pub readability_level: &'static str,
    pub key_phrases: Vec<KeyPhrase>,
    pub doc_type: &'static str,
    pub tags: Vec<String>,
    pub summary: String,
}

/// Analyze a document: counts, readability, key phrases, type, tags, summary.
pub fn analyze(content: &str, title: &str) -> ContentAnalysis {
    let word_count = count_words(content);
    let char_count = content.len();
    let sentences = content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let avg_words_per_sentence = if sentences > 0 {
        (word_count as f64 / sentences as f64).round() as usize
    } else {
        0
    };

    // Simplified Flesch reading ease with a fixed syllable estimate.
    let avg_syllables_per_word = 1.5;
    let readability =
        206.835 - 1.015 * avg_words_per_sentence as f64 - 84.6 * avg_syllables_per_word;
    let readability_score = readability.round() as i32;
    let readability_level = match readability_score {
        90.. => "Very Easy",
        80..=89 => "Easy",
        70..=79 => "Fairly Easy",
        60..=69 => "Standard",
        50..=59 => "Fairly Difficult",
        30..=49 => "Difficult",
        _ => "Very Difficult",
    };

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in content.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
        if word.len() > 3 {
            *frequencies.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    let mut key_phrases: Vec<KeyPhrase> = frequencies
        .into_iter()
        .map(|(word, frequency)| KeyPhrase { word, frequency })
        .collect();
    key_phrases.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.word.cmp(&b.word))
    });
    key_phrases.truncate(10);

    ContentAnalysis {
        word_count,
        char_count,
        sentences,
        avg_words_per_sentence,
        readability_score,
        readability_level,
        key_phrases,
        doc_type: detect_doc_type(content, title),
        tags: extract_tags(content),
        summary: summarize(content, 200),
    }
}
