//! Helpers for logging caller-supplied text (command lines, subjects, bodies).
//! Radio input can carry stray control characters; these keep each log entry on one line.

use std::fmt;

/// Longest preview of caller text written to the log, in characters.
const MAX_PREVIEW: usize = 120;

/// Caller text rendered for a single log line. Escaping happens while formatting, so
/// nothing is allocated when the record is filtered out by the log level.
#[derive(Debug, Clone, Copy)]
pub struct LogText<'a> {
    text: &'a str,
    limit: usize,
}

/// Wrap `s` for logging:
/// - `\n`, `\r`, `\t` and `\` are written as escapes
/// - other control characters become `\xNN`
/// - text past the preview limit is cut with an ellipsis
pub fn escape_log(s: &str) -> LogText<'_> {
    LogText {
        text: s,
        limit: MAX_PREVIEW,
    }
}

impl LogText<'_> {
    /// Same text with a different preview limit.
    pub fn limit(self, limit: usize) -> Self {
        Self { limit, ..self }
    }
}

impl fmt::Display for LogText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.text.chars();
        for ch in chars.by_ref().take(self.limit) {
            match ch {
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c.is_control() => write!(f, "\\x{:02X}", u32::from(c))?,
                c => fmt::Write::write_char(f, c)?,
            }
        }
        if chars.next().is_some() {
            f.write_str("…")?;
        }
        Ok(())
    }
}
