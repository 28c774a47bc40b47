//! Concrete adapters for common context values.
//!
//! Hosts expose their domain entities through the generic
//! [`AttributeAdapter`]; the string/int/function adapters cover literal and
//! computed values. All adapters are stateless per call and live behind
//! `Arc` in the response's variable map.

use std::collections::HashMap;
use std::fmt;

use crate::interface::Adapter;
use crate::util::escape_content;
use crate::verb::Verb;

/// Adapter returning a fixed string, optionally escaped so the value cannot
/// alter engine behavior when spliced in.
pub struct StringAdapter {
    value: String,
    escape: bool,
}

impl StringAdapter {
    /// Adapter over a raw string value.
    pub fn new(value: impl Into<String>) -> Self {
        StringAdapter {
            value: value.into(),
            escape: false,
        }
    }

    /// Adapter over a string value with engine syntax escaped on resolve.
    pub fn escaped(value: impl Into<String>) -> Self {
        StringAdapter {
            value: value.into(),
            escape: true,
        }
    }
}

impl Adapter for StringAdapter {
    fn get_value(&self, _verb: &Verb) -> Option<String> {
        if self.escape {
            Some(escape_content(&self.value))
        } else {
            Some(self.value.clone())
        }
    }
}

/// Adapter returning a fixed integer.
pub struct IntAdapter {
    value: i64,
}

impl IntAdapter {
    /// Adapter over an integer value.
    pub fn new(value: i64) -> Self {
        IntAdapter { value }
    }
}

impl Adapter for IntAdapter {
    fn get_value(&self, _verb: &Verb) -> Option<String> {
        Some(self.value.to_string())
    }
}

/// Adapter resolving its value through a closure on every call.
pub struct FunctionAdapter {
    function: Box<dyn Fn() -> String + Send + Sync>,
}

impl FunctionAdapter {
    /// Adapter over a value-producing closure.
    pub fn new(function: impl Fn() -> String + Send + Sync + 'static) -> Self {
        FunctionAdapter {
            function: Box::new(function),
        }
    }
}

impl Adapter for FunctionAdapter {
    fn get_value(&self, _verb: &Verb) -> Option<String> {
        Some((self.function)())
    }
}

struct Attribute {
    value: Option<String>,
    escape: bool,
}

/// The generic attribute/method adapter.
///
/// With no parameter the display string is returned. A parameter is looked
/// up first among the named attributes (whose values may be escaped, or
/// absent to leave the node unresolved), then among the named methods.
/// Unknown parameters yield no value.
pub struct AttributeAdapter {
    display: String,
    attributes: HashMap<String, Attribute>,
    methods: HashMap<String, Box<dyn Fn() -> String + Send + Sync>>,
}

impl AttributeAdapter {
    /// Adapter whose parameterless resolution is `display`.
    pub fn new(display: impl Into<String>) -> Self {
        AttributeAdapter {
            display: display.into(),
            attributes: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    /// Add a named attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(
            name.into(),
            Attribute {
                value: Some(value.to_string()),
                escape: false,
            },
        );
        self
    }

    /// Add a named attribute whose resolved value is escaped.
    pub fn escaped_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(
            name.into(),
            Attribute {
                value: Some(value.to_string()),
                escape: true,
            },
        );
        self
    }

    /// Add a named attribute with no value; requesting it leaves the node
    /// unresolved rather than rendering a placeholder.
    pub fn absent_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(
            name.into(),
            Attribute {
                value: None,
                escape: false,
            },
        );
        self
    }

    /// Add a named method computed on every resolve.
    pub fn method(
        mut self,
        name: impl Into<String>,
        function: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Box::new(function));
        self
    }
}

impl Adapter for AttributeAdapter {
    fn get_value(&self, verb: &Verb) -> Option<String> {
        let Some(parameter) = verb.parameter.as_deref() else {
            return Some(self.display.clone());
        };
        if let Some(attribute) = self.attributes.get(parameter) {
            let value = attribute.value.as_deref()?;
            return Some(if attribute.escape {
                escape_content(value)
            } else {
                value.to_string()
            });
        }
        self.methods.get(parameter).map(|method| method())
    }
}

impl fmt::Debug for AttributeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeAdapter")
            .field("display", &self.display)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verb::{DEFAULT_VERB_LIMIT, Verb};

    fn verb(text: &str) -> Verb {
        Verb::parse(text, DEFAULT_VERB_LIMIT, false)
    }

    #[test]
    fn string_adapter_escapes_on_request() {
        let plain = StringAdapter::new("a|b");
        assert_eq!(plain.get_value(&verb("{x}")).as_deref(), Some("a|b"));

        let escaped = StringAdapter::escaped("a|b");
        assert_eq!(escaped.get_value(&verb("{x}")).as_deref(), Some("a\\|b"));
    }

    #[test]
    fn attribute_adapter_resolves_display_attributes_and_methods() {
        let adapter = AttributeAdapter::new("general")
            .attribute("id", 626861902521434160_i64)
            .absent_attribute("topic")
            .method("shout", || "GENERAL".to_string());

        assert_eq!(adapter.get_value(&verb("{channel}")).as_deref(), Some("general"));
        assert_eq!(
            adapter.get_value(&verb("{channel(id)}")).as_deref(),
            Some("626861902521434160")
        );
        assert_eq!(adapter.get_value(&verb("{channel(topic)}")), None);
        assert_eq!(
            adapter.get_value(&verb("{channel(shout)}")).as_deref(),
            Some("GENERAL")
        );
        assert_eq!(adapter.get_value(&verb("{channel(unknown)}")), None);
    }
}
