//! Fixed-size sliding-window text chunker.
//!
//! Splits extracted page text into [`Chunk`]s of at most `chunk_size`
//! characters, with consecutive chunks of the same page sharing
//! `chunk_overlap` characters. Offsets are recorded in characters relative
//! to the page text, so a chunk can always be located in its source.
//!
//! Each chunk receives a UUID plus a per-document contiguous index.

use uuid::Uuid;

use crate::models::{Chunk, Document};

/// Split a document's pages into overlapping chunks.
/// Chunk indices are contiguous across the whole document, starting at 0.
pub fn split_document(doc: &Document, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut chunk_index: i64 = 0;

    for page in &doc.pages {
        for (start_offset, text) in split_text(&page.text, chunk_size, chunk_overlap) {
            chunks.push(Chunk {
                id: Uuid::new_v4().to_string(),
                document: doc.name.clone(),
                page: page.number,
                chunk_index,
                start_offset,
                text,
            });
            chunk_index += 1;
        }
    }

    chunks
}

/// Split one text into `(start_offset, text)` windows.
///
/// Offsets are in characters. Whitespace-only input yields no windows
/// (an image-only page produces no chunks). Every window except possibly
/// the last is exactly `chunk_size` characters, and consecutive windows
/// share exactly `chunk_overlap` characters.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, String)> {
    assert!(
        chunk_overlap < chunk_size,
        "chunk_overlap must be smaller than chunk_size"
    );

    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, plus the end of the text, so
    // windows never split a multi-byte character.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    let mut windows = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + chunk_size).min(total_chars);
        windows.push((start, text[boundaries[start]..boundaries[end]].to_string()));
        if end == total_chars {
            break;
        }
        start = end - chunk_overlap;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    fn doc(pages: &[&str]) -> Document {
        Document {
            name: "test.pdf".to_string(),
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| Page {
                    number: i + 1,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn short_page_single_chunk() {
        let windows = split_text("Hello, world!", 800, 150);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0], (0, "Hello, world!".to_string()));
    }

    #[test]
    fn whitespace_page_yields_nothing() {
        assert!(split_text("", 800, 150).is_empty());
        assert!(split_text("   \n\t ", 800, 150).is_empty());
    }

    #[test]
    fn no_window_exceeds_chunk_size() {
        let text = "abcdefghij".repeat(300);
        for (_, w) in split_text(&text, 800, 150) {
            assert!(w.chars().count() <= 800);
        }
    }

    #[test]
    fn consecutive_windows_share_exact_overlap() {
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let windows = split_text(&text, 800, 150);
        assert!(windows.len() > 1);
        for pair in windows.windows(2) {
            let (_, ref a) = pair[0];
            let (_, ref b) = pair[1];
            let tail: String = a.chars().skip(a.chars().count() - 150).collect();
            let head: String = b.chars().take(150).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn window_count_matches_stride() {
        // 2000 chars, size 800, overlap 150: starts at 0, 650, 1300.
        let text = "x".repeat(2000);
        let windows = split_text(&text, 800, 150);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].0, 0);
        assert_eq!(windows[1].0, 650);
        assert_eq!(windows[2].0, 1300);
    }

    #[test]
    fn offsets_are_in_characters_for_multibyte_text() {
        // Every char is multi-byte; slicing must stay on boundaries.
        let text = "é".repeat(1000);
        let windows = split_text(&text, 800, 150);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].0, 650);
        assert_eq!(windows[1].1.chars().count(), 350);
    }

    #[test]
    fn indices_contiguous_across_pages() {
        let d = doc(&["first page text", "", "third page text"]);
        let chunks = split_document(&d, 800, 150);
        assert_eq!(chunks.len(), 2);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64);
        }
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[1].page, 3);
    }

    #[test]
    fn at_least_one_chunk_per_page_with_text() {
        let long = "words ".repeat(400);
        let d = doc(&[&long, "short", &long]);
        let chunks = split_document(&d, 800, 150);
        for page in [1usize, 2, 3] {
            assert!(
                chunks.iter().any(|c| c.page == page),
                "page {} produced no chunks",
                page
            );
        }
        assert!(chunks.len() >= 3);
    }
}
