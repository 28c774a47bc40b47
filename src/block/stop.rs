//! Early termination.

use crate::error::{Error, Result};
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::Context;

use super::helpers::parse_condition;

/// The stop block halts the whole script when its expression is true.
///
/// **Usage:** `{stop(<expression>):[message]}`
///
/// **Aliases:** `halt`, `error`
///
/// On a true expression, processing ends immediately: the rendered body
/// becomes everything resolved before this node, followed by the payload
/// message. A false or unparseable expression erases the node and
/// continues.
///
/// ```text
/// {stop({args}==):You must provide arguments for this tag.}
/// ```
pub struct StopBlock;

impl Block for StopBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["stop", "halt", "error"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.parameter.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default();
        if parse_condition(parameter) == Some(true) {
            return Err(Error::Stop {
                message: ctx.verb.payload.clone().unwrap_or_default(),
            });
        }
        Ok(Some(String::new()))
    }
}
