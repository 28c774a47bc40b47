//! Rate limiting across script invocations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::interface::{Block, declaration_in, supplied};
use crate::interpreter::Context;

use super::helpers::split_payload;

const DEFAULT_MESSAGE: &str =
    "The bucket for {key} has reached its cooldown. Retry in {retry_after} seconds.";

/// A token bucket: `rate` uses allowed per `per`-second window.
struct Cooldown {
    rate: f64,
    per: f64,
    window: f64,
    tokens: f64,
}

impl Cooldown {
    fn new(rate: f64, per: f64) -> Self {
        Cooldown {
            rate,
            per,
            window: 0.0,
            tokens: rate,
        }
    }

    /// Consume one token at time `now`, returning the seconds remaining
    /// until the window reopens when none are left.
    fn update_rate_limit(&mut self, now: f64) -> Option<f64> {
        if now > self.window + self.per {
            self.tokens = self.rate;
        }
        if self.tokens == self.rate {
            self.window = now;
        }
        if self.tokens <= 0.0 {
            return Some(self.per - (now - self.window));
        }
        self.tokens -= 1.0;
        None
    }
}

/// Buckets for one partition, keyed by the script-supplied bucket key.
struct CooldownMapping {
    rate: f64,
    per: f64,
    buckets: HashMap<String, Cooldown>,
}

impl CooldownMapping {
    fn new(rate: f64, per: f64) -> Self {
        CooldownMapping {
            rate,
            per,
            buckets: HashMap::new(),
        }
    }
}

struct RegistryInner {
    started: Instant,
    partitions: Mutex<HashMap<String, CooldownMapping>>,
}

/// Shared cooldown state.
///
/// Clones share one set of buckets, so a single registry handed to every
/// [`CooldownBlock`] enforces limits across interpreters and threads.
/// Partitions are keyed by the `cooldown_key` extra kwarg when the caller
/// provides one, and by the original message otherwise; each partition keeps
/// independent buckets per script key. Changing the rate or period of a
/// partition resets it.
#[derive(Clone)]
pub struct CooldownRegistry {
    inner: Arc<RegistryInner>,
}

impl CooldownRegistry {
    /// A fresh registry with no buckets.
    pub fn new() -> Self {
        CooldownRegistry {
            inner: Arc::new(RegistryInner {
                started: Instant::now(),
                partitions: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn now(&self) -> f64 {
        self.inner.started.elapsed().as_secs_f64()
    }

    /// Consume one use of `key` under `partition`, returning the remaining
    /// wait when the bucket is exhausted.
    pub fn update(&self, partition: &str, key: &str, rate: f64, per: f64) -> Option<f64> {
        let now = self.now();
        let mut partitions = self.inner.partitions.lock();
        let mapping = partitions
            .entry(partition.to_string())
            .or_insert_with(|| CooldownMapping::new(rate, per));
        if (mapping.rate, mapping.per) != (rate, per) {
            *mapping = CooldownMapping::new(rate, per);
        }
        mapping
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Cooldown::new(rate, per))
            .update_rate_limit(now)
    }
}

impl Default for CooldownRegistry {
    fn default() -> Self {
        CooldownRegistry::new()
    }
}

/// The cooldown block limits how often a script can run.
///
/// **Usage:** `{cooldown(<rate>|<per>):<key>|[message]}`
///
/// The parameter carries the allowance: `rate` uses every `per` seconds.
/// The payload's key scopes the bucket, so passing a channel id as the key
/// gives each channel its own cooldown. An optional message replaces the
/// default breach text; `{key}` and `{retry_after}` inside it are
/// substituted.
///
/// ```text
/// {cooldown(1|10):{author(id)}}
/// {cooldown(3|3):{channel(id)}|Slow down! Try again in {retry_after} seconds.}
/// ```
pub struct CooldownBlock {
    registry: CooldownRegistry,
}

impl CooldownBlock {
    /// Block with its own private registry.
    pub fn new() -> Self {
        CooldownBlock {
            registry: CooldownRegistry::new(),
        }
    }

    /// Block enforcing limits against a shared registry.
    pub fn with_registry(registry: CooldownRegistry) -> Self {
        CooldownBlock { registry }
    }
}

impl Default for CooldownBlock {
    fn default() -> Self {
        CooldownBlock::new()
    }
}

impl Block for CooldownBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["cooldown"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
            && supplied(ctx.verb.parameter.as_deref(), true)
            && supplied(ctx.verb.payload.as_deref(), true)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.as_deref().unwrap_or_default();
        let Some((rate, per)) = split_payload(parameter) else {
            return Ok(None);
        };
        let (Ok(rate), Ok(per)) = (rate.trim().parse::<f64>(), per.trim().parse::<f64>()) else {
            return Ok(None);
        };

        let payload = ctx.verb.payload.as_deref().unwrap_or_default();
        let (key, message) = match split_payload(payload) {
            Some((key, message)) => {
                let message = Some(message).filter(|message| !message.is_empty());
                (key, message)
            }
            None => (payload.to_string(), None),
        };

        let partition = ctx
            .response
            .extra_kwargs
            .get("cooldown_key")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| ctx.original_message.to_string());

        if let Some(retry_after) = self.registry.update(&partition, &key, rate, per) {
            let retry_after = (retry_after * 100.0).round() / 100.0;
            let message = match message {
                Some(custom) => custom
                    .replace("{key}", &key)
                    .replace("{retry_after}", &retry_after.to_string()),
                None => DEFAULT_MESSAGE
                    .replace("{key}", &key)
                    .replace("{retry_after}", &retry_after.to_string()),
            };
            return Err(Error::CooldownExceeded {
                message,
                key,
                retry_after,
            });
        }
        Ok(Some(String::new()))
    }
}
