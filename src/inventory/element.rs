use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest `text` kept per element.
pub const MAX_TEXT_CHARS: usize = 120;

/// The closed set of interactive element kinds we inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Button,
    Input,
    Link,
    Select,
    Textarea,
}

impl ElementCategory {
    pub const ALL: [ElementCategory; 5] = [
        ElementCategory::Button,
        ElementCategory::Input,
        ElementCategory::Link,
        ElementCategory::Select,
        ElementCategory::Textarea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementCategory::Button => "button",
            ElementCategory::Input => "input",
            ElementCategory::Link => "link",
            ElementCategory::Select => "select",
            ElementCategory::Textarea => "textarea",
        }
    }

    /// Map a lowercase HTML tag name to its category.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "button" => Some(ElementCategory::Button),
            "input" => Some(ElementCategory::Input),
            "a" => Some(ElementCategory::Link),
            "select" => Some(ElementCategory::Select),
            "textarea" => Some(ElementCategory::Textarea),
            _ => None,
        }
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interactive DOM node as observed at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub category: ElementCategory,
    /// Informational only.
    pub tag_name: String,
    /// Trimmed visible text (or current value), at most `MAX_TEXT_CHARS`.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    /// Raw `class` attribute, informational only.
    #[serde(default)]
    pub class_list: String,
    /// Bounding box had strictly positive width and height.
    pub is_visible: bool,
}

impl ElementRecord {
    /// The label a human would use for this element: text, then name, then
    /// id, then the tag itself.
    pub fn display_label(&self) -> &str {
        [
            Some(self.text.as_str()),
            self.name.as_deref(),
            self.identifier.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(&self.tag_name)
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

