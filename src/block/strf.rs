//! Timestamp formatting.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::Result;
use crate::interface::Block;
use crate::interpreter::Context;

/// The strf block converts and formats timestamps with strftime directives.
///
/// **Usage:** `{strf([timestamp]):<format>}`
///
/// **Aliases:** `unix`
///
/// The parameter accepts an epoch timestamp or an ISO-8601 string; without
/// one the current UTC time is used. Invoking the block as `unix` returns
/// the current epoch timestamp and ignores parameter and payload.
///
/// ```text
/// {strf:%Y-%m-%d}
/// {strf(1420070400):%A %d, %B %Y}
/// {strf(2019-10-09T01:45:00):%H:%M %d-%B-%Y}
/// {unix}
/// ```
pub struct StrfBlock;

fn parse_timestamp(parameter: &str) -> Option<DateTime<Utc>> {
    let parameter = parameter.trim();
    if !parameter.is_empty() && parameter.chars().all(|ch| ch.is_ascii_digit()) {
        let epoch: i64 = parameter.parse().ok()?;
        return Utc.timestamp_opt(epoch, 0).single();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(parameter) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = parameter.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(date) = parameter.parse::<NaiveDate>() {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

impl Block for StrfBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["strf", "unix"]
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let declaration = ctx.verb.declaration.as_deref().unwrap_or_default();
        if declaration.eq_ignore_ascii_case("unix") {
            return Ok(Some(Utc::now().timestamp().to_string()));
        }
        let Some(format) = ctx.verb.payload.as_deref() else {
            return Ok(None);
        };
        let time = match ctx.verb.parameter.as_deref() {
            Some(parameter) => match parse_timestamp(parameter) {
                Some(time) => time,
                None => return Ok(None),
            },
            None => Utc::now(),
        };
        // A bad directive must leave the node unresolved instead of
        // panicking inside Display.
        let items: Vec<_> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Ok(None);
        }
        Ok(Some(time.format_with_items(items.into_iter()).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verb::{DEFAULT_VERB_LIMIT, Verb};

    #[test]
    fn timestamps_parse_from_epoch_and_iso() {
        let epoch = parse_timestamp("1420070400").unwrap();
        assert_eq!(epoch.timestamp(), 1420070400);

        let iso = parse_timestamp("2019-10-09T01:45:00").unwrap();
        assert_eq!(iso.timestamp(), 1570585500);

        let date = parse_timestamp("2019-10-09").unwrap();
        assert_eq!(date.timestamp(), 1570579200);

        assert!(parse_timestamp("not a time").is_none());
    }

    #[test]
    fn formats_an_explicit_epoch() {
        let verb = Verb::parse("{strf(1420070400):%Y-%m-%d}", DEFAULT_VERB_LIMIT, false);
        assert_eq!(verb.parameter.as_deref(), Some("1420070400"));
        assert_eq!(verb.payload.as_deref(), Some("%Y-%m-%d"));
        let time = parse_timestamp("1420070400").unwrap();
        assert_eq!(time.format("%Y-%m-%d").to_string(), "2015-01-01");
    }
}
