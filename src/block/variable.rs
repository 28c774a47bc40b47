//! Variable assignment and retrieval.

use std::sync::Arc;

use crate::adapter::StringAdapter;
use crate::error::Result;
use crate::interface::{Block, declaration_in};
use crate::interpreter::Context;

/// The assignment block writes a variable for later reference in the same
/// pass.
///
/// **Usage:** `{=(<name>):<value>}`
///
/// **Aliases:** `assign`, `let`, `var`
///
/// ```text
/// {=(prefix):!}
/// The prefix here is `{prefix}`.
/// ```
pub struct AssignmentBlock;

impl Block for AssignmentBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["=", "assign", "let", "var"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && ctx.verb.parameter.is_some()
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(name) = ctx.verb.parameter.clone() else {
            return Ok(None);
        };
        let value = ctx.verb.payload.clone().unwrap_or_default();
        ctx.response
            .variables
            .insert(name, Arc::new(StringAdapter::new(value)));
        Ok(Some(String::new()))
    }
}

/// Resolves declarations that name a variable in the response environment.
///
/// Accepts a node only when its declaration is currently present among the
/// seeded or assigned variables, and delegates to that variable's adapter.
/// An adapter that yields no value leaves the bracket text unresolved.
pub struct VariableGetterBlock;

impl Block for VariableGetterBlock {
    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        ctx.verb
            .declaration
            .as_deref()
            .is_some_and(|declaration| ctx.response.variables.contains_key(declaration))
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(declaration) = ctx.verb.declaration.as_deref() else {
            return Ok(None);
        };
        let Some(adapter) = ctx.response.variables.get(declaration).cloned() else {
            return Ok(None);
        };
        Ok(adapter.get_value(ctx.verb))
    }
}
