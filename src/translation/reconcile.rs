/*!
 * Line-count reconciliation.
 *
 * Upstream models drop and invent lines. This positional correction keeps
 * every translated line it got, pads the tail with the corresponding
 * original lines, or truncates the excess, so the result always has exactly
 * as many lines as the original. Applied once per chunk and once more over
 * the assembled document.
 */

use log::warn;

/// Force `translated` to the exact line count of `original`
///
/// The i-th translated line is assumed to correspond to the i-th original
/// line. That holds only approximately under reordering, which is an
/// accepted trade-off: the correction favors structural integrity over
/// semantic alignment.
pub fn reconcile_line_count(original: &str, translated: &str) -> String {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let translated_lines: Vec<&str> = translated.split('\n').collect();

    if translated_lines.len() == original_lines.len() {
        return translated.to_string();
    }

    warn!(
        "Line count mismatch: original {}, translated {}. Fixing...",
        original_lines.len(),
        translated_lines.len()
    );

    let fixed: Vec<&str> = (0..original_lines.len())
        .map(|i| {
            if i < translated_lines.len() {
                translated_lines[i]
            } else {
                // Out of translated lines, keep the original content
                original_lines[i]
            }
        })
        .collect();

    fixed.join("\n")
}
