use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use page_testgen::browser::error::BrowserError;
use page_testgen::browser::page::{NavigationOutcome, PageSession, SessionLauncher};
use page_testgen::naming::advisor::NamingAdvisor;
use serde_json::{Value, json};

// ============================================================================
// DOM snapshot builders
// ============================================================================

pub fn element(
    category: &str,
    tag: &str,
    text: &str,
    id: Option<&str>,
    name: Option<&str>,
    visible: bool,
) -> Value {
    let href = if tag == "a" { json!("#") } else { Value::Null };
    json!({
        "category": category,
        "tagName": tag,
        "text": text,
        "identifier": id,
        "name": name,
        "role": null,
        "href": href,
        "classList": "",
        "isVisible": visible,
    })
}

pub fn button(id: Option<&str>, text: &str) -> Value {
    element("button", "button", text, id, None, true)
}

pub fn input(name: Option<&str>) -> Value {
    element("input", "input", "", None, name, true)
}

pub fn link(text: &str) -> Value {
    element("link", "a", text, None, None, true)
}

/// `count` visible buttons with distinct labels `Button 0`, `Button 1`, ...
pub fn distinct_buttons(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| button(Some(&format!("b{}", i)), &format!("Button {}", i)))
            .collect(),
    )
}

/// The login page used across scenarios.
pub fn login_page() -> Value {
    json!([
        button(Some("login-btn"), "Sign in"),
        input(Some("email")),
        element("button", "button", "Hidden", None, None, false),
    ])
}

// ============================================================================
// Scripted browser
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub navigations: Arc<AtomicUsize>,
    pub evaluations: Arc<AtomicUsize>,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

/// Where the scripted session should break.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    None,
    NavigationTimeout,
    EvaluateError,
    EvaluatePanic,
    NonArraySnapshot,
}

pub struct FakeSession {
    snapshot: Value,
    status: Option<u16>,
    fault: Fault,
    counters: Counters,
    released: bool,
}

impl PageSession for FakeSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome, BrowserError> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::NavigationTimeout {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: format!("Timeout {}ms exceeded", timeout.as_millis()),
            });
        }
        Ok(NavigationOutcome { status: self.status })
    }

    fn evaluate(&mut self, _script: &str) -> Result<Value, BrowserError> {
        self.counters.evaluations.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Fault::EvaluateError => Err(BrowserError::protocol("evaluate", "Execution context was destroyed")),
            Fault::EvaluatePanic => panic!("injected evaluate panic"),
            Fault::NonArraySnapshot => Ok(json!({"unexpected": true})),
            _ => Ok(self.snapshot.clone()),
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct FakeLauncher {
    pub snapshot: Value,
    pub status: Option<u16>,
    pub fault: Fault,
    pub fail_launch: bool,
    pub counters: Counters,
}

impl FakeLauncher {
    pub fn serving(snapshot: Value) -> Self {
        Self {
            snapshot,
            status: Some(200),
            fault: Fault::None,
            fail_launch: false,
            counters: Counters::default(),
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    pub fn unlaunchable() -> Self {
        Self {
            fail_launch: true,
            ..Self::serving(json!([]))
        }
    }
}

impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    fn acquire(&self) -> Result<FakeSession, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Spawn {
                program: "node".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "node not found"),
            });
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            snapshot: self.snapshot.clone(),
            status: self.status,
            fault: self.fault.clone(),
            counters: self.counters.clone(),
            released: false,
        })
    }
}

// ============================================================================
// Naming advisors
// ============================================================================

/// Prefixes every default with `Named: ` and counts calls.
#[derive(Default)]
pub struct CountingAdvisor {
    pub calls: AtomicUsize,
}

impl CountingAdvisor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NamingAdvisor for CountingAdvisor {
    fn suggest_name(&self, default_name: &str, _context: &Value) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        format!("Named: {}", default_name)
    }
}
