//! Recursive text splitting for document ingestion.
//!
//! Splits a document into fragments on paragraph, then line, then word
//! boundaries, packing pieces into chunks of a bounded size with a trailing
//! overlap carried between consecutive chunks.

/// Separators tried in order, coarsest first.
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Chunking parameters.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Maximum chunk size in bytes
    pub chunk_size: usize,

    /// Bytes of the previous chunk repeated at the start of the next
    pub chunk_overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 128,
        }
    }
}

/// Split text into overlapping fragments.
///
/// Whitespace-only input yields no fragments. Pieces longer than
/// `chunk_size` that no separator can break are hard-split on char
/// boundaries.
pub fn split_text(text: &str, config: &SplitConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chunk_size = config.chunk_size.max(1);
    let overlap = config.chunk_overlap.min(chunk_size / 2);

    let pieces = split_recursive(text, SEPARATORS, chunk_size);
    merge_pieces(&pieces, chunk_size, overlap)
}

/// Recursively split text on successively finer separators until every
/// piece fits within `max` bytes.
fn split_recursive<'a>(text: &'a str, separators: &[&str], max: usize) -> Vec<&'a str> {
    if text.len() <= max {
        return vec![text];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return hard_split(text, max);
    };

    let mut pieces = Vec::new();
    for part in text.split(separator) {
        if part.trim().is_empty() {
            continue;
        }
        if part.len() > max {
            pieces.extend(split_recursive(part, rest, max));
        } else {
            pieces.push(part);
        }
    }

    if pieces.is_empty() {
        hard_split(text, max)
    } else {
        pieces
    }
}

/// Split on char boundaries when no separator applies.
fn hard_split(text: &str, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        // A char wider than `max` bytes still has to advance the cursor
        if end == start {
            end += 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }
        pieces.push(&text[start..end]);
        start = end;
    }

    pieces
}

/// Pack pieces into chunks up to `chunk_size`, seeding each new chunk with
/// the tail of the previous one.
fn merge_pieces(pieces: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    // Bytes of `current` that are carried-over overlap, not new content
    let mut seed_len = 0;

    for piece in pieces {
        let piece = piece.trim_end();
        if piece.is_empty() {
            continue;
        }

        let projected = if current.is_empty() {
            piece.len()
        } else {
            current.len() + 1 + piece.len()
        };

        if projected > chunk_size && current.len() > seed_len {
            let tail = tail_on_boundary(&current, overlap).to_string();
            chunks.push(std::mem::take(&mut current));
            if overlap > 0 {
                current = tail;
            }
            seed_len = current.len();
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(piece);
    }

    // A leftover that is nothing but seed is already covered by the
    // previous chunk
    if current.len() > seed_len {
        chunks.push(current);
    }

    chunks
}

/// Last `overlap` bytes of `s`, adjusted forward to a char boundary.
fn tail_on_boundary(s: &str, overlap: usize) -> &str {
    if s.len() <= overlap {
        return s;
    }
    let mut idx = s.len() - overlap;
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    &s[idx..]
}
