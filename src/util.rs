//! Small shared utilities.

/// Backslash-escape engine syntax in adapter-provided content.
///
/// Escapes `{`, `}`, `(`, `)`, `:` and `|` that are not already escaped, so
/// that text injected by an adapter cannot alter block behavior when it is
/// spliced into the working string.
pub fn escape_content(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    let mut previous_backslash = false;
    for ch in content.chars() {
        if matches!(ch, '{' | '}' | '(' | ')' | ':' | '|') && !previous_backslash {
            escaped.push('\\');
        }
        previous_backslash = ch == '\\';
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_engine_syntax() {
        assert_eq!(escape_content("{a(b):c|d}"), "\\{a\\(b\\)\\:c\\|d\\}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape_content("hello world"), "hello world");
    }

    #[test]
    fn does_not_double_escape() {
        assert_eq!(escape_content("\\{already}"), "\\{already\\}");
    }
}
