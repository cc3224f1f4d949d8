/*!
 * Document model and chunking.
 *
 * A document is split into bounded chunks along line boundaries so each
 * chunk fits into a single upstream translation request. Chunk boundaries
 * carry metadata about whether they fall on a real line break or inside an
 * over-long line, so the assembler can reproduce the original text exactly.
 */

use log::debug;

/// An immutable input document together with its derived line view
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
}

impl Document {
    /// Create a document from raw text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines of the document, split on `'\n'`
    ///
    /// An empty document still has one (empty) line, so this is always >= 1.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// A bounded slice of a document sized to fit one translation request
///
/// Chunks are produced once by [`split_into_chunks`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Position of this chunk within the document, starting at 0
    pub index: usize,

    /// The chunk text, without a trailing line break
    pub text: String,

    /// Number of lines in the chunk text
    pub line_count: usize,

    /// Whether this chunk begins on a line boundary
    ///
    /// False only for continuation slices of a line that exceeded the chunk
    /// size limit on its own. The assembler inserts a line break before a
    /// chunk exactly when this is true (and the chunk is not the first).
    pub starts_on_line_boundary: bool,
}

impl Chunk {
    fn new(index: usize, text: String, starts_on_line_boundary: bool) -> Self {
        let line_count = text.split('\n').count();
        Self { index, text, line_count, starts_on_line_boundary }
    }
}

/// Split text into line-respecting chunks of at most `max_chunk_size` characters
///
/// Lines are kept whole wherever possible. A single line longer than the
/// limit is emitted as fixed-size character slices with no line-boundary
/// respect inside that line. Sizes are measured in characters so slicing
/// never lands inside a UTF-8 sequence.
pub fn split_into_chunks(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let max_chunk_size = max_chunk_size.max(1);

    // Small documents travel as a single chunk
    if text.chars().count() <= max_chunk_size {
        return vec![Chunk::new(0, text.to_string(), true)];
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    // Pending chunk text with its accumulated character count. An empty
    // pending string is still one (empty) line, so None marks "no chunk
    // in progress", not emptiness.
    let mut current: Option<(String, usize)> = None;

    fn push_chunk(chunks: &mut Vec<Chunk>, text: String, on_boundary: bool) {
        let index = chunks.len();
        chunks.push(Chunk::new(index, text, on_boundary));
    }

    for line in text.split('\n') {
        let line_len = line.chars().count();

        // A line that cannot fit on its own gets sliced mid-line
        if line_len > max_chunk_size {
            if let Some((pending, _)) = current.take() {
                push_chunk(&mut chunks, pending, true);
            }

            let chars: Vec<char> = line.chars().collect();
            let mut offset = 0;
            let mut first_slice = true;
            while offset < chars.len() {
                let end = (offset + max_chunk_size).min(chars.len());
                let slice: String = chars[offset..end].iter().collect();
                push_chunk(&mut chunks, slice, first_slice);
                first_slice = false;
                offset = end;
            }
            continue;
        }

        current = Some(match current.take() {
            None => (line.to_string(), line_len),
            Some((mut pending, pending_len)) => {
                // Flush when appending this line plus its separator would overflow
                if pending_len + line_len + 1 > max_chunk_size {
                    push_chunk(&mut chunks, pending, true);
                    (line.to_string(), line_len)
                } else {
                    pending.push('\n');
                    pending.push_str(line);
                    (pending, pending_len + line_len + 1)
                }
            }
        });
    }

    if let Some((pending, _)) = current {
        push_chunk(&mut chunks, pending, true);
    }

    debug!("Split document into {} chunks (limit {} chars)", chunks.len(), max_chunk_size);
    chunks
}

/// Join per-chunk contents back into a whole document
///
/// `contents` holds one entry per chunk, in chunk-index order. A line break
/// is inserted before every chunk that started on a line boundary; slices of
/// an over-long line are concatenated back without one. When `contents`
/// equals the chunk texts this reproduces the original document exactly.
pub fn reassemble(chunks: &[Chunk], contents: &[String]) -> String {
    debug_assert_eq!(chunks.len(), contents.len());

    let mut out = String::new();
    for (chunk, content) in chunks.iter().zip(contents) {
        if chunk.index > 0 && chunk.starts_on_line_boundary {
            out.push('\n');
        }
        out.push_str(content);
    }
    out
}
