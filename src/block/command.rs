//! Command queuing and permission overrides.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::{ActionValue, Context};

/// The command block queues a command to run as the script invoker.
///
/// **Usage:** `{command:<command>}`
///
/// **Aliases:** `c`, `com`
///
/// Queued commands accumulate in the response actions under `"commands"`.
/// At most `limit` commands are accepted per script; further blocks render
/// a limit notice instead.
///
/// ```text
/// {c:ping}
/// {c:ban {target(id)} Chatflood/spam}
/// ```
pub struct CommandBlock {
    limit: usize,
}

impl CommandBlock {
    /// Block accepting up to `limit` commands.
    pub fn new(limit: usize) -> Self {
        CommandBlock { limit }
    }
}

impl Default for CommandBlock {
    fn default() -> Self {
        CommandBlock::new(3)
    }
}

impl Block for CommandBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["c", "com", "command"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let command = ctx
            .verb
            .payload
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();
        let entry = ctx
            .response
            .actions
            .entry("commands".to_string())
            .or_insert_with(|| ActionValue::List(Vec::new()));
        let ActionValue::List(commands) = entry else {
            return Err(Error::unexpected(
                "commands action holds a non-list value",
            ));
        };
        if commands.len() >= self.limit {
            return Ok(Some(format!("`COMMAND LIMIT REACHED ({})`", self.limit)));
        }
        commands.push(command);
        Ok(Some(String::new()))
    }
}

/// The override block lifts permission requirements on queued commands.
///
/// **Usage:** `{override(["admin"|"mod"|"permissions"])}`
///
/// Without a parameter every requirement class is overridden. A parameter
/// names a single class; anything else leaves the node unresolved. The
/// flags accumulate in the response actions under `"overrides"`.
pub struct OverrideBlock;

impl Block for OverrideBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["override"]
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx
            .verb
            .parameter
            .as_deref()
            .map(str::trim)
            .filter(|parameter| !parameter.is_empty());
        let Some(parameter) = parameter else {
            let all: HashMap<String, bool> = ["admin", "mod", "permissions"]
                .into_iter()
                .map(|name| (name.to_string(), true))
                .collect();
            ctx.response
                .actions
                .insert("overrides".to_string(), ActionValue::Flags(all));
            return Ok(Some(String::new()));
        };
        let parameter = parameter.to_lowercase();
        if !["admin", "mod", "permissions"].contains(&parameter.as_str()) {
            return Ok(None);
        }
        let entry = ctx
            .response
            .actions
            .entry("overrides".to_string())
            .or_insert_with(|| {
                ActionValue::Flags(
                    ["admin", "mod", "permissions"]
                        .into_iter()
                        .map(|name| (name.to_string(), false))
                        .collect(),
                )
            });
        let ActionValue::Flags(overrides) = entry else {
            return Err(Error::unexpected(
                "overrides action holds a non-flag value",
            ));
        };
        overrides.insert(parameter, true);
        Ok(Some(String::new()))
    }
}
