use thiserror::Error;

/// Failures talking to the headless browser driver.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The driver subprocess could not be spawned (is Node.js installed?).
    #[error("failed to spawn browser driver '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the driver's pipes failed.
    #[error("browser driver I/O: {0}")]
    Io(String),

    /// The driver answered, but not in the shape we expect.
    #[error("browser driver protocol error during '{command}': {error}")]
    Protocol { command: String, error: String },

    /// `page.goto` failed or timed out.
    #[error("navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BrowserError {
    pub fn protocol(command: &str, error: impl Into<String>) -> Self {
        BrowserError::Protocol {
            command: command.to_string(),
            error: error.into(),
        }
    }
}
