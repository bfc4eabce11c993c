//! Logging helpers for free-form host text (dialogue, item names) so log lines stay single-line.

use std::borrow::Cow;
use std::fmt::Write;

/// Greetings longer than this are cut with an ellipsis.
const MAX_PREVIEW: usize = 160;

/// Escape a string for single-line logging.
///
/// Newlines, tabs and other control characters are escaped; backslashes are
/// doubled. Text that needs no change is returned borrowed.
pub fn escape_log(s: &str) -> Cow<'_, str> {
    let clean = s.chars().count() <= MAX_PREVIEW
        && !s.chars().any(|c| c == '\\' || c.is_control());
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
