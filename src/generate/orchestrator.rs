use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::browser::page::{PageSession, SessionLauncher, with_session};
use crate::generate::error::GenerationError;
use crate::generate::model::{
    GenerationOptions, GenerationRequest, GenerationResult, GenerationSettings, GenerationSummary,
    element_counts,
};
use crate::inventory::element::ElementRecord;
use crate::inventory::extractor::{extract, visible_only};
use crate::inventory::selector::select_with;
use crate::naming::advisor::{NamingAdvisor, NoopAdvisor, suggest_names};
use crate::synth::{self, playwright::default_test_name};

/// Turns a URL into a generated test suite, one browser per call.
pub struct Generator<L: SessionLauncher> {
    launcher: L,
    advisor: Arc<dyn NamingAdvisor>,
    settings: GenerationSettings,
}

/// What came out of the browser for one request.
struct PageObservation {
    logs: Vec<String>,
    visible: Vec<ElementRecord>,
}

impl<L: SessionLauncher> Generator<L> {
    /// A generator with default settings and no naming advisor.
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            advisor: Arc::new(NoopAdvisor),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn NamingAdvisor>) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run one generation.
    ///
    /// Fails only if the request is unusable or no browser can be acquired.
    /// Navigation and extraction trouble ends up in `summary.logs`.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(GenerationError::InvalidRequest("url is required".into()));
        }

        let options = GenerationOptions::from_map(&request.options);
        let settings = self.settings.with_options(&options);

        let observation = with_session(&self.launcher, |page| observe(page, url, &settings))?;
        let PageObservation { mut logs, visible } = observation;

        let selected = select_with(visible.clone(), settings.budget, settings.dedupe);
        logs.push(format!("Selected {} elements for generation.", selected.len()));
        info!(url, total = visible.len(), selected = selected.len(), "element inventory ready");

        let titles = self.titles_for(&selected, &settings);
        let code = synth::render(&request.framework, url, &selected, &titles);

        let summary = GenerationSummary {
            url: url.to_string(),
            element_counts: element_counts(&visible),
            total_elements: visible.len(),
            framework: request.framework.clone(),
            approx_generated_test_count: selected.len().min(settings.budget) + 1,
            logs,
        };

        let mut elements = visible;
        elements.truncate(settings.element_cap);

        Ok(GenerationResult {
            summary,
            elements,
            code,
        })
    }

    fn titles_for(&self, selected: &[ElementRecord], settings: &GenerationSettings) -> Vec<String> {
        let defaults: Vec<(String, Value)> = selected
            .iter()
            .map(|record| {
                let context = serde_json::to_value(record).unwrap_or(Value::Null);
                (default_test_name(record), context)
            })
            .collect();

        if !settings.suggest_names {
            return defaults.into_iter().map(|(name, _)| name).collect();
        }
        suggest_names(self.advisor.as_ref(), &defaults, settings.naming_concurrency)
    }
}

/// Navigate and inventory. Runs inside the scoped session, so whatever
/// happens here the browser is released afterwards.
fn observe<S: PageSession>(page: &mut S, url: &str, settings: &GenerationSettings) -> PageObservation {
    let mut logs = vec![format!("Opening {}", url)];
    info!(url, timeout_ms = settings.navigation_timeout.as_millis() as u64, "navigating");

    match page.navigate(url, settings.navigation_timeout) {
        Ok(outcome) => {
            match outcome.status {
                Some(code) => logs.push(format!("Status {}", code)),
                None => logs.push("Status unknown".to_string()),
            }
            if outcome.status.is_some() && !outcome.is_success() {
                warn!(url, status = ?outcome.status, "non-success HTTP status");
                logs.push("Non-success HTTP status; continuing with the DOM that loaded.".to_string());
            }
        }
        Err(e) => {
            warn!(url, error = %e, "navigation failed, extracting whatever loaded");
            logs.push(format!("Navigation failed: {}", e));
        }
    }

    let visible = match extract(page) {
        Ok(records) => visible_only(records),
        Err(e) => {
            warn!(url, error = %e, "element extraction failed");
            logs.push(format!("Extraction failed: {}", e));
            Vec::new()
        }
    };
    logs.push(format!("Found {} elements (visible).", visible.len()));

    PageObservation { logs, visible }
}
