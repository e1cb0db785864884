use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::inventory::element::{ElementCategory, ElementRecord};
use crate::inventory::selector::DEFAULT_BUDGET;
use crate::naming::advisor::DEFAULT_NAMING_CONCURRENCY;
use crate::synth::Framework;

/// Most element records returned to the caller.
pub const DEFAULT_ELEMENT_CAP: usize = 200;
/// `page.goto` timeout.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub url: String,
    /// Opaque to the engine; carried for the service layer.
    #[serde(alias = "userId")]
    pub user_identifier: Value,
    #[serde(default)]
    pub framework: Framework,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl GenerationRequest {
    pub fn new(url: &str, user_identifier: impl Into<Value>) -> Self {
        Self {
            url: url.to_string(),
            user_identifier: user_identifier.into(),
            framework: Framework::default(),
            options: Map::new(),
        }
    }

    pub fn with_framework(mut self, framework: impl Into<Framework>) -> Self {
        self.framework = framework.into();
        self
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

/// Tuning flags recognized in a request's open `options` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub budget: Option<usize>,
    pub navigation_timeout_ms: Option<u64>,
    /// `None` keeps the engine setting.
    pub dedupe: Option<bool>,
    pub suggest_names: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            budget: None,
            navigation_timeout_ms: None,
            dedupe: None,
            suggest_names: true,
        }
    }
}

impl GenerationOptions {
    /// Lenient parse: unknown keys are ignored, ill-typed known keys are
    /// ignored with a warning.
    pub fn from_map(options: &Map<String, Value>) -> Self {
        let mut parsed = GenerationOptions::default();

        for (key, value) in options {
            let accepted = match key.as_str() {
                "budget" => positive_int(value).map(|n| parsed.budget = Some(n as usize)),
                "navigationTimeoutMs" => {
                    positive_int(value).map(|n| parsed.navigation_timeout_ms = Some(n))
                }
                "dedupe" => value.as_bool().map(|b| parsed.dedupe = Some(b)),
                "suggestNames" => value.as_bool().map(|b| parsed.suggest_names = b),
                _ => continue,
            };
            if accepted.is_none() {
                warn!(option = key.as_str(), value = %value, "ignoring ill-typed generation option");
            }
        }

        parsed
    }
}

fn positive_int(value: &Value) -> Option<u64> {
    value.as_u64().filter(|n| *n > 0)
}

// ============================================================================
// Engine settings
// ============================================================================

/// Engine-side defaults. Request options override them per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub budget: usize,
    pub element_cap: usize,
    pub navigation_timeout: Duration,
    pub naming_concurrency: usize,
    /// Collapse elements that would render identical cases. Off by default so
    /// every visible element gets its own case.
    pub dedupe: bool,
    pub suggest_names: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            element_cap: DEFAULT_ELEMENT_CAP,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            naming_concurrency: DEFAULT_NAMING_CONCURRENCY,
            dedupe: false,
            suggest_names: true,
        }
    }
}

impl GenerationSettings {
    pub fn with_options(&self, options: &GenerationOptions) -> Self {
        Self {
            budget: options.budget.unwrap_or(self.budget),
            navigation_timeout: options
                .navigation_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(self.navigation_timeout),
            dedupe: options.dedupe.unwrap_or(self.dedupe),
            suggest_names: self.suggest_names && options.suggest_names,
            ..self.clone()
        }
    }
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub url: String,
    pub element_counts: BTreeMap<ElementCategory, usize>,
    pub total_elements: usize,
    pub framework: Framework,
    pub approx_generated_test_count: usize,
    /// Orchestration milestones in the order they happened. Diagnostic only.
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub summary: GenerationSummary,
    pub elements: Vec<ElementRecord>,
    pub code: String,
}

/// Per-category counts. Categories with no elements are absent.
pub fn element_counts(records: &[ElementRecord]) -> BTreeMap<ElementCategory, usize> {
    records.iter().fold(BTreeMap::new(), |mut acc, record| {
        *acc.entry(record.category).or_insert(0) += 1;
        acc
    })
}
