//! Helpers for putting author-supplied text into log records.

use std::fmt::Write;

/// Longest author text, in characters, copied into a single log record.
const LOG_PREVIEW_CHARS: usize = 200;

/// Make author text safe for a one-line log record.
///
/// Backslashes and line breaks are escaped, other control characters become
/// `\u{..}`, and anything past [`LOG_PREVIEW_CHARS`] is cut with an ellipsis.
pub fn escape_log(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(LOG_PREVIEW_CHARS) + 4);
    let mut chars = text.chars();
    for ch in chars.by_ref().take(LOG_PREVIEW_CHARS) {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
