//! Rich embed accumulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interface::{Block, declaration_in};
use crate::interpreter::{ActionValue, Context, Response};

use super::helpers::{implicit_bool, split_list, split_payload};

/// An image-like embed part holding only a URL.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedMedia {
    /// Source URL of the media.
    pub url: String,
}

/// The footer line of an embed.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
    /// Optional footer icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// One name/value field of an embed.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field renders inline with its neighbors.
    #[serde(default)]
    pub inline: bool,
}

/// A rich embed built up across multiple block occurrences in one pass.
///
/// The shape mirrors the wire format chat platforms accept, so a host can
/// serialize it directly from the response actions.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Embed {
    /// Embed title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Embed body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL the title links to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Accent color as a 24-bit integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// Timestamp shown next to the footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Small corner image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    /// Large body image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    /// Footer line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// Name/value fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Total rendered character count, measured the way the platform caps
    /// embeds: title, description, footer text, and every field name and
    /// value.
    pub fn length(&self) -> usize {
        let mut length = 0;
        if let Some(title) = &self.title {
            length += title.chars().count();
        }
        if let Some(description) = &self.description {
            length += description.chars().count();
        }
        if let Some(footer) = &self.footer {
            length += footer.text.chars().count();
        }
        for field in &self.fields {
            length += field.name.chars().count() + field.value.chars().count();
        }
        length
    }
}

/// Named accent colors, matching the palette hosts commonly expose.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("teal", 0x1ABC9C),
    ("dark_teal", 0x11806A),
    ("green", 0x2ECC71),
    ("dark_green", 0x1F8B4C),
    ("blue", 0x3498DB),
    ("dark_blue", 0x206694),
    ("purple", 0x9B59B6),
    ("dark_purple", 0x71368A),
    ("magenta", 0xE91E63),
    ("dark_magenta", 0xAD1457),
    ("gold", 0xF1C40F),
    ("dark_gold", 0xC27C0E),
    ("orange", 0xE67E22),
    ("dark_orange", 0xA84300),
    ("red", 0xE74C3C),
    ("dark_red", 0x992D22),
    ("yellow", 0xFEE75C),
    ("fuchsia", 0xEB459E),
    ("blurple", 0x5865F2),
    ("og_blurple", 0x7289DA),
    ("greyple", 0x99AAB5),
    ("lighter_grey", 0xBCC0C0),
    ("light_grey", 0x979C9F),
    ("dark_grey", 0x607D8B),
    ("darker_grey", 0x546E7A),
    ("dark_theme", 0x36393F),
];

/// Resolve a color value from hex digits or a palette name. Out-of-range or
/// unknown values fall back to the default color rather than failing.
fn parse_color(raw: &str) -> u32 {
    let arg = raw.trim().to_lowercase().replace("0x", "");
    let arg = arg.strip_prefix('#').unwrap_or(&arg);
    if let Ok(value) = u32::from_str_radix(arg, 16) {
        return if value <= 0xFFFFFF { value } else { 0 };
    }
    let name = arg.replace(' ', "_");
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, value)| *value)
        .unwrap_or(0)
}

fn embeds_mut(response: &mut Response) -> Result<&mut Vec<Embed>> {
    let entry = response
        .actions
        .entry("embeds".to_string())
        .or_insert_with(|| ActionValue::Embeds(Vec::new()));
    match entry {
        ActionValue::Embeds(embeds) => Ok(embeds),
        _ => Err(Error::unexpected("embeds action holds a non-embed value")),
    }
}

fn latest(embeds: &mut Vec<Embed>) -> &mut Embed {
    if embeds.is_empty() {
        embeds.push(Embed::default());
    }
    let index = embeds.len() - 1;
    &mut embeds[index]
}

/// The embed block accumulates a rich embed alongside the rendered text.
///
/// **Usage:** `{embed(<attribute>):<value>}` or `{embed(<json>)}`
///
/// A JSON parameter assigns complete structured data at once; an attribute
/// parameter mutates one part of the embed under construction. A bare
/// `{embed}` starts a fresh embed, so one script can attach several. Both
/// styles can be mixed within a pass.
///
/// ```text
/// {embed({"title":"Hello!","color":15194415})}
/// {embed(title):Rules}
/// {embed(field):Rule 1|Respect everyone.|false}
/// {embed(footer):Thanks for reading!|{guild(icon)}}
/// ```
pub struct EmbedBlock;

impl EmbedBlock {
    fn apply_attribute(embed: &mut Embed, attribute: &str, value: &str) -> Result<bool> {
        match attribute {
            "title" => embed.title = Some(value.to_string()),
            "description" => embed.description = Some(value.to_string()),
            "url" => embed.url = Some(value.to_string()),
            "color" | "colour" => embed.color = Some(parse_color(value)),
            "thumbnail" => {
                embed.thumbnail = Some(EmbedMedia {
                    url: value.to_string(),
                })
            }
            "image" => {
                embed.image = Some(EmbedMedia {
                    url: value.to_string(),
                })
            }
            "footer" => {
                embed.footer = Some(match split_payload(value) {
                    Some((text, icon_url)) => EmbedFooter {
                        text,
                        icon_url: Some(icon_url),
                    },
                    None => EmbedFooter {
                        text: value.to_string(),
                        icon_url: None,
                    },
                })
            }
            "field" | "add_field" => {
                let parts = split_list(value);
                let field = match parts.as_slice() {
                    [name, field_value] => EmbedField {
                        name: name.clone(),
                        value: field_value.clone(),
                        inline: false,
                    },
                    [name, field_value, inline] => {
                        let Some(inline) = implicit_bool(inline.trim()) else {
                            return Err(Error::EmbedParse(format!(
                                "the inline argument for a field is not a boolean value ({inline})"
                            )));
                        };
                        EmbedField {
                            name: name.clone(),
                            value: field_value.clone(),
                            inline,
                        }
                    }
                    _ => {
                        return Err(Error::EmbedParse(
                            "a field payload must split into 2 or 3 parts".to_string(),
                        ));
                    }
                };
                embed.fields.push(field);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Block for EmbedBlock {
    fn accepted_names(&self) -> &'static [&'static str] {
        &["embed"]
    }

    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(self.accepted_names(), ctx)
    }

    fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let parameter = ctx.verb.parameter.clone();
        let payload = ctx.verb.payload.clone();
        let embeds = embeds_mut(ctx.response)?;

        match parameter.as_deref().map(str::trim) {
            None | Some("") => {
                // A bare {embed} starts the next embed.
                embeds.push(Embed::default());
                return Ok(Some(String::new()));
            }
            Some(json) if json.starts_with('{') => {
                let parsed: Embed = serde_json::from_str(json)
                    .map_err(|err| Error::EmbedParse(err.to_string()))?;
                *latest(embeds) = parsed;
            }
            Some("timestamp") => {
                latest(embeds).timestamp = Some(Utc::now());
            }
            Some(attribute) => {
                let Some(value) = payload.as_deref() else {
                    return Err(Error::EmbedParse(format!(
                        "the {attribute} attribute requires a payload"
                    )));
                };
                let attribute = attribute.to_lowercase();
                if !Self::apply_attribute(latest(embeds), &attribute, value)? {
                    return Ok(None);
                }
            }
        }

        let length = latest(embeds).length();
        if length > 6000 {
            return Ok(Some(format!("`MAX EMBED LENGTH REACHED ({length}/6000)`")));
        }
        Ok(Some(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_from_hex_and_names() {
        assert_eq!(parse_color("#37b2cb"), 0x37B2CB);
        assert_eq!(parse_color("0x1abc9c"), 0x1ABC9C);
        assert_eq!(parse_color("dark red"), 0x992D22);
        assert_eq!(parse_color("FFFFFFFF"), 0);
        assert_eq!(parse_color("no such color"), 0);
    }

    #[test]
    fn length_counts_capped_parts() {
        let embed = Embed {
            title: Some("title".to_string()),
            description: Some("body".to_string()),
            footer: Some(EmbedFooter {
                text: "foot".to_string(),
                icon_url: None,
            }),
            fields: vec![EmbedField {
                name: "n".to_string(),
                value: "v".to_string(),
                inline: true,
            }],
            ..Embed::default()
        };
        assert_eq!(embed.length(), 5 + 4 + 4 + 2);
    }

    #[test]
    fn json_round_trips_defaults() {
        let embed: Embed =
            serde_json::from_str(r#"{"title":"Hi","fields":[{"name":"a","value":"b"}]}"#)
                .expect("valid embed json");
        assert_eq!(embed.title.as_deref(), Some("Hi"));
        assert!(!embed.fields[0].inline);
    }
}
