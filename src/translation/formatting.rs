/*!
 * Format preservation for translated documents.
 *
 * Localization files carry structural tokens that must survive translation
 * unchanged: color codes (`&a`, `§b`), percent placeholders (`%player%`),
 * brace placeholders (`{player}`) and angle placeholders (`<player>`).
 * Models drop them. This pass walks the reconciled document line by line
 * and appends any token instance that went missing. Presence is guaranteed,
 * position is not.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Recognized structural token classes
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([&§][0-9a-fklmnor])|(%[A-Za-z0-9_]+%)|(\{[A-Za-z0-9_]+\})|(<[A-Za-z0-9_]+>)")
        .unwrap()
});

/// Small-caps and stylized Unicode letters used by decorative fonts
static SMALL_CAPS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("[ᴀʙᴄᴅᴇғɢʜɪᴊᴋʟᴍɴᴏᴘǫʀsᴛᴜᴠᴡxʏᴢ]").unwrap());

/// Format preserver for maintaining structural tokens during translation
pub struct FormatPreserver;

impl FormatPreserver {
    /// Restore missing tokens in `translated`, line by line against `original`
    ///
    /// Both documents are expected to have equal line counts (the fixers run
    /// first); on a mismatch the translation is returned unchanged and the
    /// mismatch is logged.
    pub fn preserve(original: &str, translated: &str) -> String {
        let original_lines: Vec<&str> = original.split('\n').collect();
        let translated_lines: Vec<&str> = translated.split('\n').collect();

        if original_lines.len() != translated_lines.len() {
            warn!(
                "Line count mismatch during format preservation: original {}, translated {}",
                original_lines.len(),
                translated_lines.len()
            );
            return translated.to_string();
        }

        original_lines
            .iter()
            .copied()
            .zip(translated_lines.iter().copied())
            .enumerate()
            .map(|(index, (original_line, translated_line))| {
                Self::preserve_line(original_line, translated_line, index)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Restore missing token instances on a single line
    fn preserve_line(original: &str, translated: &str, line_index: usize) -> String {
        let original_tokens: Vec<&str> =
            TOKEN_REGEX.find_iter(original).map(|m| m.as_str()).collect();

        Self::flag_stylized_text(original, translated, line_index);

        if original_tokens.is_empty() {
            return translated.to_string();
        }

        // Count token occurrences already present in the translation
        let mut available: HashMap<&str, usize> = HashMap::new();
        for m in TOKEN_REGEX.find_iter(translated) {
            *available.entry(m.as_str()).or_insert(0) += 1;
        }

        let mut result = translated.to_string();
        let mut restored = 0usize;

        // Walk original occurrences in order; every occurrence without a
        // matching instance left in the translation gets appended.
        for token in original_tokens {
            match available.get_mut(token) {
                Some(count) if *count > 0 => *count -= 1,
                _ => {
                    result.push_str(token);
                    restored += 1;
                }
            }
        }

        if restored > 0 {
            warn!("Restored {} missing formatting tokens on line {}", restored, line_index + 1);
        }

        result
    }

    /// Log lines whose stylized font was lost in translation
    ///
    /// Faithful conversion of decorative Unicode fonts is out of scope, so
    /// this only flags the line.
    fn flag_stylized_text(original: &str, translated: &str, line_index: usize) {
        if SMALL_CAPS_REGEX.is_match(original) && !SMALL_CAPS_REGEX.is_match(translated) {
            warn!(
                "Line {} has a stylized font that may not be preserved correctly",
                line_index + 1
            );
        }
    }
}
