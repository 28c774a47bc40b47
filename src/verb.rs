//! Parser for a single brace-delimited block.
//!
//! A verb is the `{declaration(parameter):payload}` triple carried by one
//! bracketed span. Parsing is an explicit state machine over the characters
//! between the braces: a depth counter tracks nested parameter delimiters, a
//! `:` at depth zero ends declaration/parameter parsing, and a backslash
//! escapes the next character from triggering any transition.

use std::fmt;

/// Maximum number of characters parsed out of one bracketed span.
pub const DEFAULT_VERB_LIMIT: usize = 2000;

/// The parsed form of one bracketed block.
///
/// With `dot_parameter` the parameter follows a `.` instead of being wrapped
/// in parentheses:
///
/// ```text
/// {declaration(parameter):payload}
/// {declaration.parameter:payload}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verb {
    /// The text used to declare the block.
    pub declaration: Option<String>,
    /// The text passed to the block parameter.
    pub parameter: Option<String>,
    /// The text passed to the block payload after the colon.
    pub payload: Option<String>,
    dot_parameter: bool,
}

impl Verb {
    /// Parse a bracketed span (braces included) into a verb.
    ///
    /// At most `limit` characters of the inner text are considered. A span
    /// with no recognizable structure ends up entirely in `declaration`,
    /// which leaves the node inert: no block accepts it and the bracket text
    /// stays in the output.
    pub fn parse(verb_string: &str, limit: usize, dot_parameter: bool) -> Self {
        let mut verb = Verb {
            dot_parameter,
            ..Verb::default()
        };
        let chars: Vec<char> = verb_string.chars().collect();
        if chars.len() < 2 {
            return verb;
        }
        let inner: Vec<char> = chars[1..chars.len() - 1]
            .iter()
            .copied()
            .take(limit)
            .collect();

        let mut depth = 0usize;
        let mut dec_start: Option<usize> = None;
        let mut skip_next = false;
        let last = inner.len().checked_sub(1);

        for i in 0..inner.len() {
            let ch = inner[i];
            if skip_next {
                skip_next = false;
                continue;
            }
            if ch == '\\' {
                skip_next = true;
                continue;
            }
            if ch == ':' && depth == 0 {
                verb.split_payload(&inner);
                return verb;
            }

            if dot_parameter {
                if ch == '.' {
                    depth += 1;
                    if dec_start.is_none() {
                        dec_start = Some(i);
                        verb.declaration = Some(inner[..i].iter().collect());
                    }
                } else if (ch == ':' || Some(i) == last) && depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        let start = dec_start.unwrap_or(0);
                        if ch == ':' {
                            verb.parameter = Some(inner[start + 1..i].iter().collect());
                            verb.payload = Some(inner[i + 1..].iter().collect());
                        } else {
                            verb.parameter = Some(inner[start + 1..].iter().collect());
                        }
                        return verb;
                    }
                }
            } else if ch == '(' {
                depth += 1;
                if dec_start.is_none() {
                    dec_start = Some(i);
                    verb.declaration = Some(inner[..i].iter().collect());
                }
            } else if ch == ')' && depth > 0 {
                depth -= 1;
                if depth == 0 {
                    let start = dec_start.unwrap_or(0);
                    verb.parameter = Some(inner[start + 1..i].iter().collect());
                    if inner.get(i + 1) == Some(&':') {
                        verb.payload = Some(inner[i + 2..].iter().collect());
                    }
                    return verb;
                }
            }
        }

        // No delimiter ever returned depth to zero; the whole inner text is
        // declaration, optionally split on the first colon for payload.
        verb.split_payload(&inner);
        verb
    }

    fn split_payload(&mut self, inner: &[char]) {
        match inner.iter().position(|&ch| ch == ':') {
            Some(pos) => {
                self.declaration = Some(inner[..pos].iter().collect());
                self.payload = Some(inner[pos + 1..].iter().collect());
            }
            None => self.declaration = Some(inner.iter().collect()),
        }
        self.parameter = None;
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        if let Some(declaration) = &self.declaration {
            write!(f, "{declaration}")?;
        }
        if let Some(parameter) = &self.parameter {
            if self.dot_parameter {
                write!(f, ".{parameter}")?;
            } else {
                write!(f, "({parameter})")?;
            }
        }
        if let Some(payload) = &self.payload {
            write!(f, ":{payload}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Verb {
        Verb::parse(text, DEFAULT_VERB_LIMIT, false)
    }

    fn parse_dot(text: &str) -> Verb {
        Verb::parse(text, DEFAULT_VERB_LIMIT, true)
    }

    #[test]
    fn declaration_only() {
        let verb = parse("{hello}");
        assert_eq!(verb.declaration.as_deref(), Some("hello"));
        assert_eq!(verb.parameter, None);
        assert_eq!(verb.payload, None);
    }

    #[test]
    fn full_triple() {
        let verb = parse("{if(1==1):yes|no}");
        assert_eq!(verb.declaration.as_deref(), Some("if"));
        assert_eq!(verb.parameter.as_deref(), Some("1==1"));
        assert_eq!(verb.payload.as_deref(), Some("yes|no"));
    }

    #[test]
    fn declaration_and_payload() {
        let verb = parse("{random:a,b,c}");
        assert_eq!(verb.declaration.as_deref(), Some("random"));
        assert_eq!(verb.parameter, None);
        assert_eq!(verb.payload.as_deref(), Some("a,b,c"));
    }

    #[test]
    fn nested_parentheses_stay_in_parameter() {
        let verb = parse("{strf(now(utc)):%Y}");
        assert_eq!(verb.declaration.as_deref(), Some("strf"));
        assert_eq!(verb.parameter.as_deref(), Some("now(utc)"));
        assert_eq!(verb.payload.as_deref(), Some("%Y"));
    }

    #[test]
    fn unresolved_inner_braces_stay_in_parameter() {
        let verb = parse("{if({args}==63):hi|bye}");
        assert_eq!(verb.parameter.as_deref(), Some("{args}==63"));
    }

    #[test]
    fn escaped_colon_does_not_end_declaration_early() {
        // The escape keeps the loop from transitioning; the trailing split
        // still happens on the first raw colon, matching the permissive
        // behavior templates rely on.
        let verb = parse("{a\\:b:c}");
        assert_eq!(verb.declaration.as_deref(), Some("a\\"));
        assert_eq!(verb.payload.as_deref(), Some("b:c"));
    }

    #[test]
    fn escaped_paren_is_inert() {
        let verb = parse("{name\\(x}");
        assert_eq!(verb.declaration.as_deref(), Some("name\\(x"));
        assert_eq!(verb.parameter, None);
    }

    #[test]
    fn empty_braces_yield_empty_declaration() {
        let verb = parse("{}");
        assert_eq!(verb.declaration.as_deref(), Some(""));
    }

    #[test]
    fn length_cap_truncates_inner_text() {
        let verb = Verb::parse("{abcdefgh}", 4, false);
        assert_eq!(verb.declaration.as_deref(), Some("abcd"));
    }

    #[test]
    fn dot_parameter_with_payload() {
        let verb = parse_dot("{embed.title:hello}");
        assert_eq!(verb.declaration.as_deref(), Some("embed"));
        assert_eq!(verb.parameter.as_deref(), Some("title"));
        assert_eq!(verb.payload.as_deref(), Some("hello"));
    }

    #[test]
    fn dot_parameter_without_payload() {
        let verb = parse_dot("{user.name}");
        assert_eq!(verb.declaration.as_deref(), Some("user"));
        assert_eq!(verb.parameter.as_deref(), Some("name"));
        assert_eq!(verb.payload, None);
    }

    #[test]
    fn multiple_dots_never_close_and_fall_back_to_declaration() {
        let verb = parse_dot("{a.b.c}");
        assert_eq!(verb.declaration.as_deref(), Some("a.b.c"));
        assert_eq!(verb.parameter, None);
    }

    #[test]
    fn display_round_trips_structure() {
        let verb = parse("{if(x==y):a|b}");
        assert_eq!(verb.to_string(), "{if(x==y):a|b}");
    }
}
