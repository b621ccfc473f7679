//! Custom serde deserializers for mixed-content PubMed XML fields

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::result;

/// Text of an element that may or may not carry attributes
///
/// `<AbstractText>plain</AbstractText>` arrives as a string, while
/// `<AbstractText Label="METHODS" NlmCategory="METHODS">...</AbstractText>`
/// arrives as a map with `$text`/`$value` plus `@`-prefixed attributes. Both
/// collapse to the same value here.
#[derive(Debug, Default, Clone, PartialEq)]
pub(super) struct TextContent {
    #[allow(dead_code)]
    pub label: Option<String>,
    pub text: String,
}

impl TextContent {
    /// Trimmed text, `None` when blank
    pub fn non_empty(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

impl<'de> Deserialize<'de> for TextContent {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextContentVisitor;

        impl<'de> Visitor<'de> for TextContentVisitor {
            type Value = TextContent;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("element text content")
            }

            fn visit_str<E>(self, value: &str) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent {
                    label: None,
                    text: value.to_string(),
                })
            }

            fn visit_string<E>(self, value: String) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent {
                    label: None,
                    text: value,
                })
            }

            fn visit_unit<E>(self) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent::default())
            }

            fn visit_map<M>(self, mut map: M) -> result::Result<TextContent, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut text_parts = Vec::new();
                let mut label = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "$text" | "$value" => text_parts.push(map.next_value::<String>()?),
                        "@Label" => label = Some(map.next_value::<String>()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(TextContent {
                    label,
                    text: text_parts.join(""),
                })
            }
        }

        deserializer.deserialize_any(TextContentVisitor)
    }
}
