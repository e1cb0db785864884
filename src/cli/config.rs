use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::browser::session::BrowserConfig;
use crate::generate::model::{DEFAULT_ELEMENT_CAP, GenerationSettings};
use crate::inventory::selector::DEFAULT_BUDGET;
use crate::naming::advisor::DEFAULT_NAMING_CONCURRENCY;

pub const DEFAULT_CONFIG_PATH: &str = "page-testgen.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-testgen",
    version,
    about = "Generate Playwright end-to-end tests from a live web page"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: page-testgen.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Node.js executable used to drive the browser
    #[arg(long, global = true)]
    pub node: Option<String>,

    /// Naming advisor backend: none, openai or ollama
    #[arg(long, global = true)]
    pub naming: Option<String>,

    /// Naming backend endpoint (Ollama or OpenAI-compatible)
    #[arg(long, global = true)]
    pub naming_endpoint: Option<String>,

    /// Naming backend model name
    #[arg(long, global = true)]
    pub naming_model: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page and generate a test suite for it
    Generate(GenerateArgs),

    /// Load a page and print its element inventory as JSON
    Inspect {
        /// Page to inspect
        #[arg(long)]
        url: String,

        /// Include elements with a zero-area bounding box
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Navigation timeout in milliseconds
        #[arg(long)]
        navigation_timeout_ms: Option<u64>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Page to generate tests for
    #[arg(long)]
    pub url: String,

    /// Target framework (only playwright has a template; others fall back to it)
    #[arg(long, default_value = "playwright")]
    pub framework: String,

    /// Opaque requester identifier echoed into the request
    #[arg(long, default_value = "cli")]
    pub user: String,

    /// Maximum element-derived test cases
    #[arg(long)]
    pub budget: Option<usize>,

    /// Navigation timeout in milliseconds
    #[arg(long)]
    pub navigation_timeout_ms: Option<u64>,

    /// Collapse elements that would render identical test cases
    #[arg(long, default_value_t = false)]
    pub dedupe: bool,

    /// Extra request options as a JSON object
    #[arg(long)]
    pub options_json: Option<String>,

    /// Write generated code here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the full result (summary, elements, code) as JSON here
    #[arg(long)]
    pub result_json: Option<String>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-testgen.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_budget")]
    pub budget: usize,

    #[serde(default = "default_element_cap")]
    pub element_cap: usize,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(default)]
    pub dedupe: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            element_cap: DEFAULT_ELEMENT_CAP,
            navigation_timeout_ms: default_navigation_timeout_ms(),
            dedupe: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSection {
    #[serde(default = "default_node")]
    pub node_binary: String,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            node_binary: default_node(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// none, openai or ollama
    #[serde(default = "default_naming_backend")]
    pub backend: String,

    pub endpoint: Option<String>,

    pub model: Option<String>,

    /// Falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,

    #[serde(default = "default_naming_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            backend: default_naming_backend(),
            endpoint: None,
            model: None,
            api_key: None,
            timeout_ms: default_naming_timeout_ms(),
            concurrency: DEFAULT_NAMING_CONCURRENCY,
        }
    }
}

// Serde default helpers
fn default_budget() -> usize { DEFAULT_BUDGET }
fn default_element_cap() -> usize { DEFAULT_ELEMENT_CAP }
fn default_navigation_timeout_ms() -> u64 { 30_000 }
fn default_node() -> String { "node".to_string() }
fn default_naming_backend() -> String { "none".to_string() }
fn default_naming_timeout_ms() -> u64 { 8_000 }
fn default_concurrency() -> usize { DEFAULT_NAMING_CONCURRENCY }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Apply global CLI overrides on top of the config file.
pub fn merge_cli(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(node) = &cli.node {
        config.browser.node_binary = node.clone();
    }
    if let Some(backend) = &cli.naming {
        config.naming.backend = backend.clone();
    }
    if let Some(endpoint) = &cli.naming_endpoint {
        config.naming.endpoint = Some(endpoint.clone());
    }
    if let Some(model) = &cli.naming_model {
        config.naming.model = Some(model.clone());
    }
    config
}

pub fn build_generation_settings(config: &AppConfig) -> GenerationSettings {
    GenerationSettings {
        budget: config.generation.budget.max(1),
        element_cap: config.generation.element_cap.min(DEFAULT_ELEMENT_CAP),
        navigation_timeout: Duration::from_millis(config.generation.navigation_timeout_ms),
        naming_concurrency: config.naming.concurrency.max(1),
        dedupe: config.generation.dedupe,
        suggest_names: true,
    }
}

pub fn build_browser_config(config: &AppConfig) -> BrowserConfig {
    BrowserConfig {
        node_binary: config.browser.node_binary.clone(),
    }
}
