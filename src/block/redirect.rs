//! Response target redirection.

use crate::error::Result;
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::{ActionValue, Context};

/// The redirect block routes the rendered response somewhere else.
///
/// **Usage:** `{redirect(<"dm"|"reply"|channel>)}`
///
/// `dm` and `reply` are recognized case-insensitively; any other parameter
/// is passed through as a channel reference for the host to resolve. The
/// target lands in the response actions under `"target"`.
///
/// ```text
/// {redirect(dm)}
/// {redirect(#general)}
/// ```
pub struct RedirectBlock;

impl Block for RedirectBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["redirect"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.parameter.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default().trim();
        let target = if parameter.eq_ignore_ascii_case("dm") {
            "dm".to_string()
        } else if parameter.eq_ignore_ascii_case("reply") {
            "reply".to_string()
        } else {
            parameter.to_string()
        };
        ctx.response
            .actions
            .insert("target".to_string(), ActionValue::Text(target));
        Ok(Some(String::new()))
    }
}
