//! The block and adapter protocols.
//!
//! Blocks and adapters are supplied by the host as an ordered catalog at
//! interpreter construction time; the engine defines no block types beyond
//! what is registered. Dispatch is single-candidate: the first registered
//! block whose [`Block::will_accept`] returns true owns the node, even when
//! its `process` declines to produce output.

use async_trait::async_trait;

use crate::error::Result;
use crate::interpreter::Context;
use crate::verb::Verb;

/// A pluggable resolver that turns a verb's parameter into a display string
/// for a bound context value.
///
/// Returning `None` means "no value": the node is left unresolved and its
/// bracket text stays in the output.
pub trait Adapter: Send + Sync {
    /// Resolve the adapter's value for the given verb.
    fn get_value(&self, verb: &Verb) -> Option<String>;
}

/// A pluggable handler that recognizes a declaration name and transforms a
/// bracketed span into replacement text and/or a side-effect action.
///
/// `Ok(None)` means the block did not handle the node and the bracket text
/// is left untouched. `Ok(Some(String::new()))` removes the span with no
/// replacement. `Ok(Some(text))` splices `text` in.
pub trait Block: Send + Sync {
    /// Lowercased declaration names this block answers to.
    ///
    /// Used by the default [`Block::will_accept`]; blocks with custom accept
    /// logic may leave this empty.
    fn accepted_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether this block should process the given context.
    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
    }

    /// Process the block's actions for a given context.
    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>>;
}

/// Asynchronous counterpart of [`Block`], for blocks that suspend to fetch
/// external data. Every synchronous [`Block`] is usable as an [`AsyncBlock`]
/// through a blanket implementation.
#[async_trait]
pub trait AsyncBlock: Send + Sync {
    /// Whether this block should process the given context.
    fn will_accept(&self, ctx: &Context<'_>) -> bool;

    /// Process the block's actions for a given context.
    async fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>>;
}

#[async_trait]
impl<T: Block> AsyncBlock for T {
    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        Block::will_accept(self, ctx)
    }

    async fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        Block::process(self, ctx)
    }
}

/// Whether the context's lowercased declaration is one of `names`.
///
/// Blocks overriding [`Block::will_accept`] with extra requirements call
/// this for the name check.
pub fn declaration_in(names: &[&str], ctx: &Context<'_>) -> bool {
    match ctx.verb.declaration.as_deref() {
        Some(declaration) => {
            let declaration = declaration.to_lowercase();
            names.contains(&declaration.as_str())
        }
        None => false,
    }
}

/// Whether a verb field satisfies a block's requirement.
///
/// With `implicit` the field must be present and non-empty; otherwise
/// presence alone is enough (`{block()}` style).
pub fn supplied(value: Option<&str>, implicit: bool) -> bool {
    match value {
        Some(value) => !implicit || !value.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_checks_presence_and_emptiness() {
        assert!(!supplied(None, false));
        assert!(supplied(Some(""), false));
        assert!(!supplied(Some(""), true));
        assert!(supplied(Some("x"), true));
    }
}
