//! Expression and splitting helpers shared by the control-flow blocks.

/// Parse a bare boolean literal, case-insensitively.
pub fn implicit_bool(string: &str) -> Option<bool> {
    if string.eq_ignore_ascii_case("true") {
        Some(true)
    } else if string.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Evaluate a comparison expression to a boolean.
///
/// Operators are recognized in priority order — `!=`, `==`, `>=`, `<=`,
/// `>`, `<` — so `>` never matches inside `>=`. Equality operators compare
/// trimmed strings; the ordered operators compare as floats. A bare
/// `true`/`false` literal is accepted. Anything else fails to parse and
/// yields `None`.
pub fn parse_condition(expression: &str) -> Option<bool> {
    if let Some(literal) = implicit_bool(expression.trim()) {
        return Some(literal);
    }
    for operator in ["!=", "==", ">=", "<=", ">", "<"] {
        let Some((lhs, rhs)) = expression.split_once(operator) else {
            continue;
        };
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        return match operator {
            "!=" => Some(lhs != rhs),
            "==" => Some(lhs == rhs),
            ordered => {
                let lhs: f64 = lhs.parse().ok()?;
                let rhs: f64 = rhs.parse().ok()?;
                match ordered {
                    ">=" => Some(lhs >= rhs),
                    "<=" => Some(lhs <= rhs),
                    ">" => Some(lhs > rhs),
                    "<" => Some(lhs < rhs),
                    _ => None,
                }
            }
        };
    }
    None
}

/// Evaluate a separator-split list of expressions independently.
pub fn parse_condition_list(expressions: &str) -> Vec<Option<bool>> {
    split_list(expressions)
        .iter()
        .map(|expression| parse_condition(expression))
        .collect()
}

/// Byte position and length of the first unescaped `|` or `&&`.
fn find_separator(string: &str) -> Option<(usize, usize)> {
    let mut escaped = false;
    let mut iter = string.char_indices().peekable();
    while let Some((index, ch)) = iter.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '|' => return Some((index, 1)),
            '&' => {
                if let Some((_, '&')) = iter.peek() {
                    return Some((index, 2));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split at the first unescaped `|` or `&&`, when one is present.
pub fn split_payload(string: &str) -> Option<(String, String)> {
    find_separator(string)
        .map(|(index, len)| (string[..index].to_string(), string[index + len..].to_string()))
}

/// Split at every unescaped `|` or `&&`. Always returns at least one part.
pub fn split_list(string: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = string;
    while let Some((index, len)) = find_separator(rest) {
        parts.push(rest[..index].to_string());
        rest = &rest[index + len..];
    }
    parts.push(rest.to_string());
    parts
}

/// Pick a payload half by a condition result.
///
/// `None` results propagate (the expression was unparseable, so the block
/// leaves the node alone). A split payload yields its left half on true and
/// its right half on false; an unsplit payload passes through whole on true
/// and becomes empty on false.
pub fn parse_into_output(payload: Option<&str>, result: Option<bool>) -> Option<String> {
    let result = result?;
    let payload = payload?;
    match split_payload(payload) {
        Some((left, right)) => Some(if result { left } else { right }),
        None => Some(if result {
            payload.to_string()
        } else {
            String::new()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_comparisons() {
        assert_eq!(parse_condition("true"), Some(true));
        assert_eq!(parse_condition("FALSE"), Some(false));
        assert_eq!(parse_condition("this == this"), Some(true));
        assert_eq!(parse_condition("a!=b"), Some(true));
        assert_eq!(parse_condition("2>3"), Some(false));
        assert_eq!(parse_condition("40 >= 40"), Some(true));
        assert_eq!(parse_condition("5<=6"), Some(true));
        assert_eq!(parse_condition("4<8"), Some(true));
        assert_eq!(parse_condition("1"), None);
        assert_eq!(parse_condition("abc > def"), None);
    }

    #[test]
    fn operator_priority_keeps_gte_intact() {
        // ">" must not match inside ">=".
        assert_eq!(parse_condition("10>=10"), Some(true));
        assert_eq!(parse_condition("10>10"), Some(false));
    }

    #[test]
    fn payload_splits_on_first_unescaped_separator() {
        assert_eq!(
            split_payload("yes|no|maybe"),
            Some(("yes".to_string(), "no|maybe".to_string()))
        );
        assert_eq!(
            split_payload("left&&right"),
            Some(("left".to_string(), "right".to_string()))
        );
        assert_eq!(split_payload("a\\|b"), None);
        assert_eq!(split_payload("plain"), None);
    }

    #[test]
    fn list_split_handles_mixed_separators() {
        assert_eq!(split_list("a|b&&c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("single"), vec!["single"]);
    }

    #[test]
    fn output_selection() {
        assert_eq!(
            parse_into_output(Some("yes|no"), Some(true)).as_deref(),
            Some("yes")
        );
        assert_eq!(
            parse_into_output(Some("yes|no"), Some(false)).as_deref(),
            Some("no")
        );
        assert_eq!(
            parse_into_output(Some("whole"), Some(true)).as_deref(),
            Some("whole")
        );
        assert_eq!(
            parse_into_output(Some("whole"), Some(false)).as_deref(),
            Some("")
        );
        assert_eq!(parse_into_output(Some("yes|no"), None), None);
    }
}
