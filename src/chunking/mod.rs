//! Structure-aware document chunking.
//!
//! Long documents are segmented into ordered, overlapping chunks bounded by a
//! word budget, preferring structural boundaries (headings, numbered sections,
//! label lines) before falling back to paragraphs and finally sentences:
//!
//! * [`segmenter`] — granularity detection and unit splitting.
//! * [`assembler`] — the accumulate/close/overlap engine and [`smart_chunk`].

pub mod assembler;
pub mod segmenter;

pub use assembler::smart_chunk;
pub use segmenter::{Granularity, count_words, detect_granularity};
