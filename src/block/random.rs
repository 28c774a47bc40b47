//! Randomness blocks.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Result;
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::Context;

/// Derive a stable RNG seed from a user-supplied seed string.
fn seed_to_u64(seed: &str) -> u64 {
    let digest = blake3::hash(seed.as_bytes());
    let bytes = digest.as_bytes();
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// The random block picks one item from a list split by `~` or `,`.
///
/// **Usage:** `{random([seed]):<list>}`
///
/// **Aliases:** `#`, `rand`
///
/// An optional seed parameter makes the pick deterministic: the same seed
/// always chooses the same item.
///
/// ```text
/// {random:Carl,Harold,Josh} attempts to pick the lock!
/// ```
pub struct RandomBlock;

impl Block for RandomBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["random", "#", "rand"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let payload = ctx.verb.payload.as_deref().unwrap_or_default();
        let choices: Vec<&str> = if payload.contains('~') {
            payload.split('~').collect()
        } else {
            payload.split(',').collect()
        };
        let index = match ctx.verb.parameter.as_deref() {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed_to_u64(seed));
                rng.random_range(0..choices.len())
            }
            None => rand::rng().random_range(0..choices.len()),
        };
        Ok(Some(choices[index].to_string()))
    }
}

/// The fifty-fifty block returns its payload half the time and the empty
/// string otherwise.
///
/// **Usage:** `{50:<message>}`
///
/// **Aliases:** `5050`, `?`
pub struct FiftyFiftyBlock;

impl Block for FiftyFiftyBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["50", "5050", "?"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx) && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        if rand::rng().random_bool(0.5) {
            Ok(Some(ctx.verb.payload.clone().unwrap_or_default()))
        } else {
            Ok(Some(String::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_give_equal_picks() {
        assert_eq!(seed_to_u64("myseed"), seed_to_u64("myseed"));
        assert_ne!(seed_to_u64("myseed"), seed_to_u64("otherseed"));
    }
}
