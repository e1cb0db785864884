use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::error::BrowserError;
use crate::browser::page::{NavigationOutcome, PageSession, SessionLauncher};

/// Playwright driver, run with `node -e`.
const DRIVER_SOURCE: &str = include_str!("browser_server.js");

/// How long `release` waits for a graceful exit before killing the driver.
const QUIT_GRACE: Duration = Duration::from_secs(5);

/// Request sent to the driver over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
        timeout_ms: u64,
    },
    Evaluate {
        cmd: &'static str,
        script: String,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str, timeout: Duration) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn evaluate(script: &str) -> Self {
        BrowserRequest::Evaluate {
            cmd: "evaluate",
            script: script.to_string(),
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response read from the driver's stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub ready: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Node.js executable used to run the driver.
    pub node_binary: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
        }
    }
}

/// A headless Chromium owned by one Node.js driver process.
///
/// The process is torn down by [`PageSession::release`] or, failing that, on
/// drop.
pub struct BrowserSession {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
    released: bool,
}

impl BrowserSession {
    /// Spawn the driver and wait for its ready line.
    ///
    /// If the handshake fails the half-started session is dropped, which
    /// kills and reaps the child.
    pub fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut child = Command::new(&config.node_binary)
            .arg("-e")
            .arg(DRIVER_SOURCE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BrowserError::Spawn {
                program: config.node_binary.clone(),
                source: e,
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BrowserError::Io("failed to capture driver pipes".into()));
            }
        };

        let mut session = BrowserSession {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
            released: false,
        };
        session.await_ready()?;
        debug!(pid = session.child.id(), "browser driver ready");
        Ok(session)
    }

    fn await_ready(&mut self) -> Result<(), BrowserError> {
        let response = self.read_response("launch")?;
        if !response.ok || response.ready != Some(true) {
            return Err(BrowserError::protocol(
                "launch",
                response
                    .error
                    .unwrap_or_else(|| "driver did not signal ready".into()),
            ));
        }
        Ok(())
    }

    fn read_response(&mut self, command: &str) -> Result<BrowserResponse, BrowserError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::Io(format!("failed to read driver stdout: {}", e)))?;

        if read == 0 || line.trim().is_empty() {
            return Err(BrowserError::Io(format!(
                "driver closed stdout during '{}' (process may have died)",
                command
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::Json {
            context: format!("driver response to '{}'", command),
            source: e,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest, command: &str) -> Result<BrowserResponse, BrowserError> {
        let json = serde_json::to_string(request).map_err(|e| BrowserError::Json {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| BrowserError::Io("session already released".into()))?;
        writeln!(stdin, "{}", json)
            .and_then(|_| stdin.flush())
            .map_err(|e| BrowserError::Io(format!("failed to write driver stdin: {}", e)))?;

        self.read_response(command)
    }

    /// Wait up to `QUIT_GRACE` for the child to exit, then kill it.
    fn reap(&mut self) {
        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
                _ => break,
            }
        }
        warn!(pid = self.child.id(), "browser driver did not exit, killing it");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl PageSession for BrowserSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome, BrowserError> {
        let response = self.send(&BrowserRequest::navigate(url, timeout), "navigate")?;
        if !response.ok {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(NavigationOutcome {
            status: response.status,
        })
    }

    fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError> {
        let response = self.send(&BrowserRequest::evaluate(script), "evaluate")?;
        if !response.ok {
            return Err(BrowserError::protocol(
                "evaluate",
                response.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        Ok(response.data.unwrap_or(Value::Null))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Best-effort quit; the driver may already be gone.
        if self.stdin.is_some() {
            let _ = self.send(&BrowserRequest::quit(), "quit");
        }
        // Closing stdin also makes a wedged driver fall out of its read loop.
        self.stdin = None;
        self.reap();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Launches one [`BrowserSession`] per acquisition.
#[derive(Debug, Clone, Default)]
pub struct PlaywrightLauncher {
    pub config: BrowserConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionLauncher for PlaywrightLauncher {
    type Session = BrowserSession;

    fn acquire(&self) -> Result<BrowserSession, BrowserError> {
        BrowserSession::launch(&self.config)
    }
}
