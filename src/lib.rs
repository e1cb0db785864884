//! Generates Playwright end-to-end test suites from a single page load.
//!
//! A headless browser opens the target URL, the interactive elements on the
//! page are inventoried, deduplicated and budgeted, and one test case is
//! rendered per element after a baseline "page loads" case.

pub mod browser;
pub mod cli;
pub mod generate;
pub mod inventory;
pub mod naming;
pub mod synth;

pub use generate::error::GenerationError;
pub use generate::model::{GenerationRequest, GenerationResult, GenerationSummary};
pub use generate::orchestrator::Generator;
