//! Word-boundary chunking used to keep prompts within size limits.
//!
//! Lengths are counted in chars, not bytes, so multi-byte text never splits inside a code point.

/// Splits `text` into ordered chunks of at most `max_chars` characters without cutting words.
///
/// Walks the text in windows of `max_chars`. A window boundary that lands inside a word retreats
/// to the last whitespace in the window. When the window holds no whitespace past its start (one
/// token longer than `max_chars`), the chunk is extended to the end of that token, so the chunk
/// holds exactly that word. Chunks are trimmed and empty ones dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let max_chars = max_chars.max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + max_chars).min(len);

        if end < len && !chars[end].is_whitespace() {
            match (start + 1..end).rev().find(|&i| chars[i].is_whitespace()) {
                Some(space) => end = space,
                None => {
                    end = (end..len)
                        .find(|&i| chars[i].is_whitespace())
                        .unwrap_or(len);
                }
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        start = end;
    }

    chunks
}
