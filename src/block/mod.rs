//! The stock block catalog.
//!
//! Blocks are registered as an ordered list on the interpreter; the first
//! block accepting a node handles it, so registration order matters. The
//! [`defaults`] catalog puts control flow ahead of utilities and variable
//! resolution last, so a variable named `if` can never shadow the if block.

mod command;
mod control;
mod cooldown;
pub mod embed;
pub(crate) mod helpers;
mod random;
mod redirect;
mod stop;
mod strf;
mod strings;
mod variable;

pub use command::{CommandBlock, OverrideBlock};
pub use control::{AllBlock, AnyBlock, BreakBlock, IfBlock};
pub use cooldown::{CooldownBlock, CooldownRegistry};
pub use embed::{Embed, EmbedBlock, EmbedField, EmbedFooter, EmbedMedia};
pub use random::{FiftyFiftyBlock, RandomBlock};
pub use redirect::RedirectBlock;
pub use stop::StopBlock;
pub use strf::StrfBlock;
pub use strings::{MembershipBlock, ReplaceBlock, SubstringBlock};
pub use variable::{AssignmentBlock, VariableGetterBlock};

use crate::interface::Block;

/// The full stock catalog in canonical registration order.
pub fn defaults() -> Vec<Box<dyn Block>> {
    vec![
        Box::new(IfBlock),
        Box::new(AnyBlock),
        Box::new(AllBlock),
        Box::new(BreakBlock),
        Box::new(AssignmentBlock),
        Box::new(RandomBlock),
        Box::new(FiftyFiftyBlock),
        Box::new(SubstringBlock),
        Box::new(ReplaceBlock),
        Box::new(MembershipBlock),
        Box::new(StrfBlock),
        Box::new(StopBlock),
        Box::new(CooldownBlock::default()),
        Box::new(RedirectBlock),
        Box::new(CommandBlock::default()),
        Box::new(OverrideBlock),
        Box::new(EmbedBlock),
        Box::new(VariableGetterBlock),
    ]
}
