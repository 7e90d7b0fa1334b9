//! The accumulate/close/overlap engine behind [`smart_chunk`].
//!
//! One engine serves every granularity: units are accumulated until the next
//! unit would blow the word budget, the running chunk is closed, and the next
//! chunk is seeded with a whole-unit overlap tail from the end of the chunk
//! just closed. An oversized unit never gets emitted at the current
//! granularity; the engine recurses one rung down the ladder instead, until an
//! oversized sentence is passed through verbatim.

use crate::config::ChunkingConfig;

use super::segmenter::{Granularity, count_words, detect_granularity, has_sentence_terminator};

/// Split `text` into ordered, overlapping chunks bounded by the word budget.
///
/// Structure is preferred over paragraphs, paragraphs over sentences. When a
/// `title` is supplied every chunk is prefixed with it (plus a blank line) so
/// downstream embedding sees document context in every chunk.
///
/// This function never fails: pathological input (no terminators, no
/// paragraphs) degrades to a single chunk equal to the whole text, and
/// empty input yields an empty chunk list.
pub fn smart_chunk(text: &str, title: &str, config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = chunk_at(text, detect_granularity(text), config);

    if chunks.is_empty() && !text.trim().is_empty() {
        chunks.push(text.trim().to_string());
    }

    let title = title.trim();
    if !title.is_empty() {
        chunks = chunks
            .into_iter()
            .map(|chunk| format!("{title}\n\n{chunk}"))
            .collect();
    }

    chunks
}

fn chunk_at(text: &str, granularity: Granularity, config: &ChunkingConfig) -> Vec<String> {
    // Terminator-less flat text cannot be split further; pass it through whole
    // rather than inventing a period it never had.
    if granularity == Granularity::Sentence && !has_sentence_terminator(text) {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let units = granularity.split(text);
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_words = 0usize;

    for unit in units {
        let unit_words = count_words(&unit);

        if unit_words > config.max_words {
            // Close whatever is accumulated, then hand the oversized unit to
            // the next granularity. At sentence level there is nothing finer:
            // the sentence goes out whole.
            if !current.is_empty() {
                chunks.push(granularity.join(&current));
                current.clear();
                current_words = 0;
            }
            match granularity.finer() {
                Some(finer) => chunks.extend(chunk_at(&unit, finer, config)),
                None => chunks.push(granularity.join(&[unit])),
            }
            continue;
        }

        if current_words + unit_words > config.max_words && !current.is_empty() {
            chunks.push(granularity.join(&current));
            current = overlap_tail(&current, config.overlap_words);
            // The seeded chunk is still bound by the word budget: shed whole
            // units from the front of the tail until the incoming unit fits.
            let mut tail_words: usize = current.iter().map(|u| count_words(u)).sum();
            while !current.is_empty() && tail_words + unit_words > config.max_words {
                tail_words -= count_words(&current.remove(0));
            }
            current.push(unit);
            current_words = tail_words + unit_words;
        } else {
            current.push(unit);
            current_words += unit_words;
        }
    }

    if !current.is_empty() {
        chunks.push(granularity.join(&current));
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Walk the closed chunk's units backward, keeping whole units while the
/// cumulative word count stays within the overlap budget.
///
/// Overlap never truncates mid-unit: if even the final unit alone exceeds the
/// budget the tail is legitimately empty.
fn overlap_tail(units: &[String], overlap_words: usize) -> Vec<String> {
    let mut tail: Vec<String> = Vec::new();
    let mut words = 0usize;
    for unit in units.iter().rev() {
        let unit_words = count_words(unit);
        if words + unit_words > overlap_words {
            break;
        }
        tail.push(unit.clone());
        words += unit_words;
    }
    tail.reverse();
    tail
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_words: usize, overlap_words: usize) -> ChunkingConfig {
        ChunkingConfig::default()
            .with_max_words(max_words)
            .with_overlap_words(overlap_words)
    }

    #[test]
    fn short_flat_text_is_one_chunk() {
        let chunks = smart_chunk("Just one small sentence.", "", &ChunkingConfig::default());
        assert_eq!(chunks, vec!["Just one small sentence."]);
    }

    #[test]
    fn overlap_too_large_for_any_unit_stays_empty() {
        // Every sentence exceeds the two-word overlap budget on its own, so no
        // overlap text may be carried forward (and never a truncated one).
        let chunks = smart_chunk(
            "Alpha beta gamma. Delta epsilon zeta eta. Theta iota.",
            "",
            &config(5, 2),
        );
        assert_eq!(
            chunks,
            vec!["Alpha beta gamma.", "Delta epsilon zeta eta.", "Theta iota."]
        );
    }

    #[test]
    fn consecutive_chunks_share_a_whole_unit_overlap() {
        let cfg = config(4, 2);
        let chunks = smart_chunk("One two. Three four. Five six. Seven eight.", "", &cfg);
        assert!(chunks.len() >= 2);
        // Each closed chunk's final sentence reappears at the head of the next,
        // and the shared region stays within the overlap budget.
        for pair in chunks.windows(2) {
            let last = pair[0]
                .rsplit(". ")
                .next()
                .unwrap()
                .trim_end_matches('.')
                .to_string();
            assert!(
                pair[1].starts_with(&last),
                "expected {:?} to start with overlap {:?}",
                pair[1],
                last
            );
            assert!(
                count_words(&last) <= cfg.overlap_words,
                "overlap {last:?} exceeds the overlap budget"
            );
        }
    }

    #[test]
    fn overlap_tail_never_pushes_a_chunk_over_budget() {
        // A generous overlap budget must not let tail + next unit outgrow the
        // chunk budget; the tail shrinks (here to nothing) instead.
        let cfg = config(10, 9);
        let chunks = smart_chunk(
            "Aaa bbb ccc ddd eee fff. Ggg hhh iii jjj kkk lll. Mmm nnn ooo ppp qqq rrr.",
            "",
            &cfg,
        );
        assert_eq!(
            chunks,
            vec![
                "Aaa bbb ccc ddd eee fff.",
                "Ggg hhh iii jjj kkk lll.",
                "Mmm nnn ooo ppp qqq rrr."
            ]
        );
        for chunk in &chunks {
            assert!(
                count_words(chunk) <= cfg.max_words,
                "chunk exceeded budget: {chunk:?}"
            );
        }
    }

    #[test]
    fn chunks_respect_the_word_budget() {
        let text = (0..40)
            .map(|i| format!("Sentence number {i} has exactly six words."))
            .collect::<Vec<_>>()
            .join(" ");
        let cfg = config(20, 7);
        for chunk in smart_chunk(&text, "", &cfg) {
            assert!(
                count_words(&chunk) <= cfg.max_words,
                "chunk exceeded budget: {chunk:?}"
            );
        }
    }

    #[test]
    fn oversized_sentence_passes_through_whole() {
        let long_sentence = format!("{} end.", vec!["word"; 30].join(" "));
        let chunks = smart_chunk(&long_sentence, "", &config(10, 2));
        assert_eq!(chunks.len(), 1);
        assert!(count_words(&chunks[0]) > 10);
    }

    #[test]
    fn oversized_paragraph_recurses_into_sentences() {
        let big_paragraph = (0..12)
            .map(|i| format!("Paragraph one sentence {i} right here."))
            .collect::<Vec<_>>()
            .join(" ");
        let text = format!("{big_paragraph}\n\nsmall second block\n\nsmall third block");
        let cfg = config(18, 4);
        let chunks = smart_chunk(&text, "", &cfg);
        assert!(chunks.len() > 2);
        for chunk in &chunks {
            assert!(count_words(chunk) <= cfg.max_words);
        }
    }

    #[test]
    fn structured_document_splits_on_headings() {
        let text = "# Alpha\none two three four five\n# Beta\nsix seven eight nine ten\n# Gamma\neleven twelve thirteen fourteen fifteen";
        let chunks = smart_chunk(&text.to_string(), "", &config(8, 0));
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().any(|c| c.contains("# Beta")));
    }

    #[test]
    fn title_prefixes_every_chunk() {
        let text = "One two three. Four five six. Seven eight nine.";
        let chunks = smart_chunk(text, "My Doc", &config(4, 0));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.starts_with("My Doc\n\n"));
        }
    }

    #[test]
    fn chunking_is_idempotent() {
        let text = "First sentence here. Second sentence there. Third one now. Fourth to finish.";
        let cfg = config(6, 3);
        assert_eq!(smart_chunk(text, "T", &cfg), smart_chunk(text, "T", &cfg));
    }

    #[test]
    fn coverage_preserves_unit_order() {
        let text = "Aa bb. Cc dd. Ee ff. Gg hh. Ii jj.";
        let chunks = smart_chunk(text, "", &config(4, 2));
        // Every original sentence must appear in at least one chunk, in order
        // of first appearance.
        let mut last_seen = 0usize;
        for sentence in ["Aa bb", "Cc dd", "Ee ff", "Gg hh", "Ii jj"] {
            let position = chunks
                .iter()
                .position(|c| c.contains(sentence))
                .unwrap_or_else(|| panic!("sentence {sentence:?} missing from chunks"));
            assert!(position >= last_seen || position + 1 >= last_seen);
            last_seen = position;
        }
    }

    #[test]
    fn degenerate_input_never_errors() {
        assert!(smart_chunk("", "", &ChunkingConfig::default()).is_empty());
        assert!(smart_chunk("   \n\n  ", "", &ChunkingConfig::default()).is_empty());

        let no_terminators = "words with no sentence punctuation at all";
        let chunks = smart_chunk(no_terminators, "", &ChunkingConfig::default());
        assert_eq!(chunks, vec![no_terminators.to_string()]);
    }
}
