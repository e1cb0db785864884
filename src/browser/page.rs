//! Capability seams between the generator and a live browser.
//!
//! The generator never talks to a driver process directly. It asks a
//! [`SessionLauncher`] for a [`PageSession`] and only ever uses it inside
//! [`with_session`], which guarantees the session is released exactly once no
//! matter how the body exits.

use std::time::Duration;

use serde_json::Value;

use crate::browser::error::BrowserError;

/// Result of a `page.goto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// HTTP status of the main document, if the driver saw one.
    pub status: Option<u16>,
}

impl NavigationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}

/// One isolated browsing context with exactly one page.
pub trait PageSession {
    /// Navigate and wait for `domcontentloaded` only.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome, BrowserError>;

    /// Evaluate a script expression inside the loaded document and return its
    /// JSON-serializable result.
    fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError>;

    /// Tear down the page, context and browser process. Must be idempotent.
    fn release(&mut self);
}

/// Creates fresh sessions. Each call is a brand new browser, so nothing leaks
/// between requests.
pub trait SessionLauncher {
    type Session: PageSession;

    fn acquire(&self) -> Result<Self::Session, BrowserError>;
}

/// Releases the wrapped session when dropped.
pub struct SessionGuard<S: PageSession> {
    session: S,
}

impl<S: PageSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
    }
}

/// Acquire a session, run `body` against it, release it on every exit path
/// (including panics inside `body`).
///
/// Only acquisition failure is returned as an error; whatever `body` produces
/// is passed through untouched.
pub fn with_session<L, T, F>(launcher: &L, body: F) -> Result<T, BrowserError>
where
    L: SessionLauncher,
    F: FnOnce(&mut L::Session) -> T,
{
    let session = launcher.acquire()?;
    let mut guard = SessionGuard::new(session);
    Ok(body(guard.session()))
}
