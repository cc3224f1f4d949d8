/*!
 * Prompt construction and response payload extraction.
 *
 * Every chunk travels with a self-contained prompt: the chunk content inside
 * a fenced block, its position within the document, and the output format
 * label. Responses come back as free-form model text, so the payload is
 * pulled out of the longest fenced block that matches the format hint.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code block with an optional language/format tag
static FENCED_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```([A-Za-z0-9_-]*)[ \t]*\n(.*?)```").unwrap());

/// Job-level inputs shared by every chunk prompt
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Output format label (e.g. "yaml", "json", "properties", "text")
    pub format_hint: String,

    /// Source language name
    pub source_language: String,

    /// Target language name
    pub target_language: String,
}

impl PromptContext {
    /// Build the prompt for one chunk
    ///
    /// `chunk_number` is 1-based, matching how positions are described to
    /// the model. The prompt depends only on the chunk itself so tasks stay
    /// independent of each other.
    pub fn chunk_prompt(&self, chunk_text: &str, chunk_number: usize, total_chunks: usize) -> String {
        format!(
            "You are an expert in translating localization files from {source} to {target}.\n\
             \n\
             This is chunk {number} of {total} from a larger file.\n\
             \n\
             ```{format}\n\
             {chunk}\n\
             ```\n\
             \n\
             Translate this chunk to {target} and return it in {format} format. \
             Only return the translated content without any explanations or markdown formatting. \
             Maintain the exact same structure, indentation, and line breaks.\n\
             \n\
             IMPORTANT:\n\
             1. Preserve any special fonts or formatting in the text\n\
             2. DO NOT translate keys, variable names, or technical parameters\n\
             3. DO NOT translate placeholders like %player%, {{player}}, <player>\n\
             4. DO NOT translate color codes like &a, &b, §a, §b\n\
             5. DO NOT add or remove any lines\n\
             6. Maintain the exact same number of lines as the original\n\
             7. Preserve all whitespace and indentation\n\
             8. If you're unsure about translating something, leave it as is\n",
            source = self.source_language,
            target = self.target_language,
            number = chunk_number,
            total = total_chunks,
            format = self.format_hint,
            chunk = chunk_text,
        )
    }

    /// Build the prompt for a short ad-hoc translation
    ///
    /// Text containing non-ASCII letter runs gets an extra instruction to
    /// keep the stylized characters, since ad-hoc messages frequently use
    /// decorative Unicode fonts.
    pub fn short_prompt(&self, text: &str) -> String {
        let stylized = text.chars().any(|c| !c.is_ascii());
        if stylized {
            format!(
                "Translate the following text from {source} to {target}.\n\
                 IMPORTANT: The text uses a special font/formatting that MUST be preserved \
                 exactly in your translation. Identify the special characters/formatting and \
                 ensure they are maintained.\n\
                 \n\
                 Text to translate: \"{text}\"\n\
                 \n\
                 Return ONLY the translated text with the same special font/formatting, nothing else.\n",
                source = self.source_language,
                target = self.target_language,
                text = text,
            )
        } else {
            format!(
                "Translate the following text from {source} to {target}:\n\
                 \n\
                 \"{text}\"\n\
                 \n\
                 Return ONLY the translated text, nothing else.\n",
                source = self.source_language,
                target = self.target_language,
                text = text,
            )
        }
    }
}

/// Extract the translation payload from a raw model response
///
/// Candidate blocks are fenced blocks whose opening fence carries no tag or
/// a tag equal to `format_hint` (case-insensitive). The longest candidate
/// wins; without any candidate the raw response is the payload.
pub fn extract_payload(raw: &str, format_hint: &str) -> String {
    let mut best: Option<&str> = None;

    for capture in FENCED_BLOCK_REGEX.captures_iter(raw) {
        let tag = capture.get(1).map_or("", |m| m.as_str());
        if !tag.is_empty() && !tag.eq_ignore_ascii_case(format_hint) {
            continue;
        }

        let body = capture.get(2).map_or("", |m| m.as_str());
        // The capture ends right before the closing fence, so it carries the
        // line break that separated the payload from the fence.
        let body = body.strip_suffix('\n').map(|b| b.strip_suffix('\r').unwrap_or(b)).unwrap_or(body);

        if best.is_none_or(|current| body.chars().count() > current.chars().count()) {
            best = Some(body);
        }
    }

    best.map(|b| b.to_string()).unwrap_or_else(|| raw.to_string())
}

/// Strip a single pair of wrapping quotes from a short translation
pub fn strip_wrapping_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
