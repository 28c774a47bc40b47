//! String slicing, substitution, and search blocks.

use crate::error::Result;
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::Context;

/// Parse a slice bound the permissive way: float syntax truncated to an
/// integer, negative values clamped to zero.
fn parse_bound(raw: &str) -> Option<usize> {
    let value: f64 = raw.trim().parse().ok()?;
    Some(value.max(0.0) as usize)
}

/// The substring block slices its payload by character position.
///
/// **Usage:** `{substr(<start[-end]>):<message>}`
///
/// **Aliases:** `substring`
///
/// A lone bound slices from that position to the end. Bounds past the end of
/// the payload clamp rather than fail; an unparseable bound leaves the node
/// unresolved.
///
/// ```text
/// {substr(2):kickme}
/// ```
pub struct SubstringBlock;

impl Block for SubstringBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["substr", "substring"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.parameter.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(parameter) = ctx.verb.parameter.as_deref() else {
            return Ok(None);
        };
        let payload = ctx.verb.payload.as_deref().unwrap_or_default();
        let chars: Vec<char> = payload.chars().collect();
        let sliced = match parameter.split_once('-') {
            None => {
                let Some(start) = parse_bound(parameter) else {
                    return Ok(None);
                };
                chars.get(start.min(chars.len())..)
            }
            Some((start, end)) => {
                let (Some(start), Some(end)) = (parse_bound(start), parse_bound(end)) else {
                    return Ok(None);
                };
                let start = start.min(chars.len());
                let end = end.clamp(start, chars.len());
                chars.get(start..end)
            }
        };
        Ok(sliced.map(|slice| slice.iter().collect()))
    }
}

/// The replace block substitutes every occurrence of a substring.
///
/// **Usage:** `{replace(<original,new>):<message>}`
///
/// The parameter splits on its first comma, so the replacement may itself
/// contain commas.
///
/// ```text
/// {replace(o,i):welcome to the server}
/// ```
pub struct ReplaceBlock;

impl Block for ReplaceBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["replace"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(parameter) = ctx.verb.parameter.as_deref() else {
            return Ok(None);
        };
        let Some((before, after)) = parameter.split_once(',') else {
            return Ok(None);
        };
        let payload = ctx.verb.payload.as_deref().unwrap_or_default();
        Ok(Some(payload.replace(before, after)))
    }
}

/// Substring and word search over the payload, in three flavors.
///
/// **Usage:** `{in(<string>):<message>}`
///
/// **Aliases:** `contains`, `index`
///
/// `in` checks whether the parameter appears anywhere in the payload.
/// `contains` checks whether the parameter equals one whitespace-separated
/// word. `index` returns the position of that word, or `-1` when absent.
///
/// ```text
/// {in(apple pie):banana pie apple pie and other pie}
/// ```
pub struct MembershipBlock;

impl Block for MembershipBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["in", "contains", "index"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(parameter) = ctx.verb.parameter.as_deref() else {
            return Ok(None);
        };
        let payload = ctx.verb.payload.as_deref().unwrap_or_default();
        let declaration = ctx
            .verb
            .declaration
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let output = match declaration.as_str() {
            "in" => payload.contains(parameter).to_string(),
            "contains" => payload
                .split_whitespace()
                .any(|word| word == parameter)
                .to_string(),
            _ => payload
                .split_whitespace()
                .position(|word| word == parameter)
                .map_or_else(|| "-1".to_string(), |index| index.to_string()),
        };
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_bound;

    #[test]
    fn bounds_accept_float_syntax() {
        assert_eq!(parse_bound("3"), Some(3));
        assert_eq!(parse_bound("4.9"), Some(4));
        assert_eq!(parse_bound(" 2 "), Some(2));
        assert_eq!(parse_bound("-1"), Some(0));
        assert_eq!(parse_bound("abc"), None);
    }
}
