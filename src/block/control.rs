//! Conditional control-flow blocks.

use crate::error::Result;
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::Context;

use super::helpers::{parse_condition, parse_condition_list, parse_into_output};

/// The if block returns one payload half based on a comparison expression.
///
/// **Usage:** `{if(<expression>):<message>}`
///
/// The payload may be split by `|`: the left half is returned when the
/// expression is true, the right half otherwise. Without a split, true
/// passes the whole payload through and false yields the empty string.
///
/// ```text
/// {if({args}==63):You guessed it!|Try again.}
/// ```
pub struct IfBlock;

impl Block for IfBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["if"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let result = ctx.verb.parameter.as_deref().and_then(parse_condition);
        Ok(parse_into_output(ctx.verb.payload.as_deref(), result))
    }
}

/// The any block is a logical OR over `|`-separated expressions.
///
/// **Usage:** `{any(<expression|expression|...>):<message>}`
///
/// **Aliases:** `or`
pub struct AnyBlock;

impl Block for AnyBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["any", "or"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default();
        let result = parse_condition_list(parameter)
            .iter()
            .any(|result| *result == Some(true));
        Ok(parse_into_output(ctx.verb.payload.as_deref(), Some(result)))
    }
}

/// The all block is a logical AND over `|`-separated expressions.
///
/// **Usage:** `{all(<expression|expression|...>):<message>}`
///
/// **Aliases:** `and`
pub struct AllBlock;

impl Block for AllBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["all", "and"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default();
        let result = parse_condition_list(parameter)
            .iter()
            .all(|result| *result == Some(true));
        Ok(parse_into_output(ctx.verb.payload.as_deref(), Some(result)))
    }
}

/// The break block replaces the final body when its expression is true.
///
/// **Usage:** `{break(<expression>):[message]}`
///
/// **Aliases:** `short`, `shortcircuit`
///
/// The rest of the script still runs (side effects like variable writes and
/// actions are kept); only the rendered text is overridden. The first body
/// write wins.
pub struct BreakBlock;

impl Block for BreakBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["break", "short", "shortcircuit"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default();
        if parse_condition(parameter) == Some(true) {
            let body = ctx.verb.payload.clone().unwrap_or_default();
            ctx.response.set_body(body);
        }
        Ok(Some(String::new()))
    }
}
