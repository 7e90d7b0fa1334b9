//! Granularity detection and unit splitting for the chunker.
//!
//! Chunking walks an ordered ladder of granularities: structural sections,
//! then blank-line paragraphs, then sentences. Each granularity knows how to
//! split text into units and how to reassemble accumulated units into a chunk,
//! so the assembly logic itself stays granularity-agnostic.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s+").expect("heading pattern"));
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("numbered pattern"));
static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z \t]*:").expect("label pattern"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern"));
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

/// The granularity ladder, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    /// Heading-delimited sections (`#` runs, numbered prefixes, label lines).
    Structure,
    /// Blank-line separated paragraphs.
    Paragraph,
    /// Sentences delimited by `.`, `!`, `?`.
    Sentence,
}

impl Granularity {
    /// The next, finer granularity to recurse into for oversized units.
    /// `None` at sentence level: an oversized sentence is terminal.
    pub fn finer(self) -> Option<Granularity> {
        match self {
            Granularity::Structure => Some(Granularity::Paragraph),
            Granularity::Paragraph => Some(Granularity::Sentence),
            Granularity::Sentence => None,
        }
    }

    /// Split `text` into trimmed, non-empty units at this granularity.
    pub fn split(self, text: &str) -> Vec<String> {
        let raw: Vec<String> = match self {
            Granularity::Structure => split_sections(text),
            Granularity::Paragraph => {
                PARAGRAPH_BREAK.split(text).map(str::to_string).collect()
            }
            Granularity::Sentence => {
                SENTENCE_BREAK.split(text).map(str::to_string).collect()
            }
        };
        raw.into_iter()
            .map(|unit| unit.trim().to_string())
            .filter(|unit| !unit.is_empty())
            .collect()
    }

    /// Reassemble accumulated units into one chunk string.
    ///
    /// Sentences are rejoined with `". "` and a closing period; the original
    /// `!`/`?` terminators are normalized away by the split, matching the
    /// chunk format downstream embedding expects.
    pub fn join(self, units: &[String]) -> String {
        match self {
            Granularity::Structure => units.join("\n"),
            Granularity::Paragraph => units.join("\n\n"),
            Granularity::Sentence => format!("{}.", units.join(". ")),
        }
    }
}

/// Pick the coarsest granularity the document supports.
///
/// Structured when any line carries a heading marker (or literal
/// `SECTION`/`CHAPTER` labels), multi-paragraph when more than two blank-line
/// blocks exist, otherwise flat sentence chunking.
pub fn detect_granularity(text: &str) -> Granularity {
    if is_structured(text) {
        Granularity::Structure
    } else if PARAGRAPH_BREAK.split(text).count() > 2 {
        Granularity::Paragraph
    } else {
        Granularity::Sentence
    }
}

fn is_structured(text: &str) -> bool {
    if text.contains("SECTION") || text.contains("CHAPTER") {
        return true;
    }
    text.lines().any(starts_section)
}

fn starts_section(line: &str) -> bool {
    HEADING_LINE.is_match(line) || NUMBERED_LINE.is_match(line) || LABEL_LINE.is_match(line)
}

/// `true` when the text carries at least one sentence terminator.
pub fn has_sentence_terminator(text: &str) -> bool {
    text.contains(['.', '!', '?'])
}

/// Split text into sections, each beginning at a heading-marker line.
///
/// Any preamble before the first heading becomes its own section.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if starts_section(line) && !current.trim().is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

/// Whitespace-delimited word count, the unit all chunk budgets are measured in.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
