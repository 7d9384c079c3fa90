//! Recursive character text splitter.
//!
//! Tries separators from coarsest (paragraph) to finest (single character). Pieces
//! that fit are merged greedily up to `chunk_size` characters, with up to
//! `chunk_overlap` characters carried into the next chunk.

use std::collections::VecDeque;

use super::{Document, RetrievalError};

const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveTextSplitter {
    /// Sizes are in characters. `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RetrievalError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(RetrievalError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than a non-zero chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replaces the separator list. An empty string separator means "split into characters".
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Splits every document; each chunk keeps the parent metadata plus `start_index`
    /// (byte offset of the chunk in the parent content).
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();
        for doc in documents {
            let mut search_from = 0usize;
            for chunk in self.split_text(&doc.content) {
                let start = doc.content[search_from..]
                    .find(chunk.as_str())
                    .map(|i| i + search_from)
                    .or_else(|| doc.content.find(chunk.as_str()));
                let mut piece = Document {
                    content: chunk,
                    metadata: doc.metadata.clone(),
                };
                if let Some(start) = start {
                    piece.metadata.insert("start_index".into(), start.into());
                    search_from = next_char_boundary(&doc.content, start);
                }
                out.push(piece);
            }
        }
        out
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let (separator, finer) = match separators.get(idx) {
            Some(s) => (s.as_str(), &separators[idx + 1..]),
            None => ("", &separators[..0]),
        };

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut out = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                out.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if finer.is_empty() {
                out.push(piece.trim().to_string());
            } else {
                out.extend(self.split_recursive(piece, finer));
            }
        }
        if !fitting.is_empty() {
            out.extend(self.merge(&fitting, separator));
        }
        out.retain(|c| !c.is_empty());
        out
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + joiner + len > self.chunk_size && !window.is_empty() {
                chunks.push(join(&window, separator));
                while !window.is_empty()
                    && (total > self.chunk_overlap
                        || total + sep_len + len > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else { break };
                    total -= char_len(front);
                    if !window.is_empty() {
                        total -= sep_len;
                    }
                }
            }
            if !window.is_empty() {
                total += sep_len;
            }
            window.push_back(piece);
            total += len;
        }
        if !window.is_empty() {
            chunks.push(join(&window, separator));
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }
}

fn join(window: &VecDeque<&str>, separator: &str) -> String {
    window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string()
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    let mut i = from + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i.min(s.len())
}
