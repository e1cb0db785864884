pub mod playwright;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::element::ElementRecord;

/// Target test framework as requested. Anything we don't have a template for
/// is kept verbatim (so it can be echoed back) and rendered with the default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Framework {
    #[default]
    Playwright,
    Other(String),
}

impl From<String> for Framework {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("playwright") {
            Framework::Playwright
        } else {
            Framework::Other(value)
        }
    }
}

impl From<&str> for Framework {
    fn from(value: &str) -> Self {
        Framework::from(value.to_string())
    }
}

impl From<Framework> for String {
    fn from(value: Framework) -> Self {
        match value {
            Framework::Playwright => "playwright".to_string(),
            Framework::Other(name) => name,
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Playwright => f.write_str("playwright"),
            Framework::Other(name) => f.write_str(name),
        }
    }
}

/// Render a suite for `framework`. Unrecognized frameworks get Playwright.
pub fn render(framework: &Framework, url: &str, elements: &[ElementRecord], titles: &[String]) -> String {
    match framework {
        Framework::Playwright | Framework::Other(_) => {
            playwright::render_playwright(url, elements, titles)
        }
    }
}
