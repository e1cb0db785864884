use std::thread;

use serde_json::Value;
use tracing::debug;

use crate::inventory::element::truncate_chars;
use crate::naming::backend::TextInference;

/// Context serialization beyond this many characters is cut off.
pub const MAX_CONTEXT_CHARS: usize = 2000;
/// Longest name accepted from a model.
pub const MAX_NAME_CHARS: usize = 120;
/// Default number of naming calls in flight per request.
pub const DEFAULT_NAMING_CONCURRENCY: usize = 4;

/// Proposes human-friendly test titles. Never fails: the worst case is the
/// default name coming straight back.
pub trait NamingAdvisor: Send + Sync {
    fn suggest_name(&self, default_name: &str, context: &Value) -> String;

    /// `false` when `suggest_name` is known to be the identity, so callers can
    /// skip the fan-out entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Hands back the default name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdvisor;

impl NamingAdvisor for NoopAdvisor {
    fn suggest_name(&self, default_name: &str, _context: &Value) -> String {
        default_name.to_string()
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Asks a language model for a name and falls back to the default on any
/// failure: unreachable backend, timeout, empty or unusable answer.
pub struct LlmNamingAdvisor {
    backend: Box<dyn TextInference>,
}

impl LlmNamingAdvisor {
    pub fn new(backend: Box<dyn TextInference>) -> Self {
        Self { backend }
    }

    pub fn build_prompt(default_name: &str, context: &Value) -> String {
        let context = truncate_chars(&context.to_string(), MAX_CONTEXT_CHARS);
        format!(
            "You are a QA assistant. Suggest a concise, human-friendly test case name for the following action. Return only the name.\nDefault: {}\nContext: {}",
            default_name, context
        )
    }
}

/// First non-empty line with wrapping quotes removed, capped in length.
pub fn clean_suggestion(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let unquoted = line
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim();
    if unquoted.is_empty() {
        return None;
    }
    Some(truncate_chars(unquoted, MAX_NAME_CHARS))
}

impl NamingAdvisor for LlmNamingAdvisor {
    fn suggest_name(&self, default_name: &str, context: &Value) -> String {
        let prompt = Self::build_prompt(default_name, context);
        match self.backend.infer_text(&prompt).as_deref().and_then(clean_suggestion) {
            Some(name) => name,
            None => {
                debug!(default_name, "naming backend gave no usable answer, keeping default");
                default_name.to_string()
            }
        }
    }
}

/// Run the advisor over every `(default_name, context)` pair with at most
/// `concurrency` calls in flight. Names come back in input order.
pub fn suggest_names(
    advisor: &dyn NamingAdvisor,
    items: &[(String, Value)],
    concurrency: usize,
) -> Vec<String> {
    if !advisor.is_enabled() {
        return items.iter().map(|(name, _)| name.clone()).collect();
    }

    let mut names = Vec::with_capacity(items.len());
    for chunk in items.chunks(concurrency.max(1)) {
        thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|(default_name, context)| {
                    scope.spawn(move || advisor.suggest_name(default_name, context))
                })
                .collect();

            for (handle, (default_name, _)) in handles.into_iter().zip(chunk) {
                // A panicking advisor is treated like any other failure.
                names.push(handle.join().unwrap_or_else(|_| default_name.clone()));
            }
        });
    }
    names
}
