use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::browser::page::{PageSession, with_session};
use crate::browser::session::PlaywrightLauncher;
use crate::cli::config::{
    AppConfig, GenerateArgs, NamingConfig, build_browser_config, build_generation_settings,
};
use crate::generate::model::GenerationRequest;
use crate::generate::orchestrator::Generator;
use crate::inventory::extractor::{extract, visible_only};
use crate::naming::advisor::{LlmNamingAdvisor, NamingAdvisor, NoopAdvisor};
use crate::naming::backend::{OllamaBackend, OpenAiBackend};
use crate::synth::playwright::count_test_cases;

// ============================================================================
// generate subcommand
// ============================================================================

pub fn cmd_generate(args: &GenerateArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(args)?;
    let env_key = std::env::var("OPENAI_API_KEY").ok();
    let advisor = build_advisor(&config.naming, env_key.as_deref());

    let generator = Generator::new(PlaywrightLauncher::new(build_browser_config(config)))
        .with_settings(build_generation_settings(config))
        .with_advisor(advisor);

    let result = generator.generate(&request)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &result.code)?;
            info!(path = path.as_str(), "wrote generated tests");
        }
        None => println!("{}", result.code),
    }

    if let Some(path) = &args.result_json {
        std::fs::write(path, serde_json::to_string_pretty(&result)?)?;
        info!(path = path.as_str(), "wrote generation result");
    }

    for line in &result.summary.logs {
        eprintln!("  {}", line);
    }
    eprintln!(
        "Generated {} test cases for {} ({} visible elements)",
        count_test_cases(&result.code),
        result.summary.url,
        result.summary.total_elements
    );

    Ok(())
}

/// Turn CLI arguments into a request. Dedicated flags win over the same keys
/// in `--options-json`.
pub fn build_request(args: &GenerateArgs) -> Result<GenerationRequest, Box<dyn std::error::Error>> {
    let mut options: Map<String, Value> = match &args.options_json {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            other => return Err(format!("--options-json must be a JSON object, got {}", other).into()),
        },
        None => Map::new(),
    };

    if let Some(budget) = args.budget {
        options.insert("budget".into(), budget.into());
    }
    if let Some(timeout) = args.navigation_timeout_ms {
        options.insert("navigationTimeoutMs".into(), timeout.into());
    }
    if args.dedupe {
        options.insert("dedupe".into(), true.into());
    }

    let mut request = GenerationRequest::new(&args.url, args.user.clone())
        .with_framework(args.framework.as_str());
    request.options = options;
    Ok(request)
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(
    url: &str,
    all: bool,
    navigation_timeout_ms: Option<u64>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let launcher = PlaywrightLauncher::new(build_browser_config(config));
    let timeout = Duration::from_millis(
        navigation_timeout_ms.unwrap_or(config.generation.navigation_timeout_ms),
    );

    let records = with_session(&launcher, |page| {
        if let Err(e) = page.navigate(url, timeout) {
            warn!(url, error = %e, "navigation failed, inspecting whatever loaded");
        }
        extract(page)
    })??;

    let records = if all { records } else { visible_only(records) };
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the naming advisor from resolved settings. Anything unusable (no
/// API key, unknown backend) yields the no-op advisor.
pub fn build_advisor(naming: &NamingConfig, env_api_key: Option<&str>) -> Arc<dyn NamingAdvisor> {
    let timeout = Duration::from_millis(naming.timeout_ms);

    match naming.backend.as_str() {
        "openai" => {
            let Some(key) = naming.api_key.as_deref().or(env_api_key).filter(|k| !k.is_empty()) else {
                info!("openai naming requested but no API key found; using default names");
                return Arc::new(NoopAdvisor);
            };
            let mut backend = OpenAiBackend::new(key);
            backend.timeout = timeout;
            if let Some(endpoint) = &naming.endpoint {
                backend.endpoint = endpoint.clone();
            }
            if let Some(model) = &naming.model {
                backend.model = model.clone();
            }
            Arc::new(LlmNamingAdvisor::new(Box::new(backend)))
        }
        "ollama" => {
            let defaults = OllamaBackend::default();
            let backend = OllamaBackend::new(
                naming.endpoint.as_deref().unwrap_or(&defaults.endpoint),
                naming.model.as_deref().unwrap_or(&defaults.model),
                timeout,
            );
            Arc::new(LlmNamingAdvisor::new(Box::new(backend)))
        }
        "none" | "" => Arc::new(NoopAdvisor),
        other => {
            warn!(backend = other, "unknown naming backend; using default names");
            Arc::new(NoopAdvisor)
        }
    }
}
