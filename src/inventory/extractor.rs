use serde_json::Value;
use tracing::debug;

use crate::browser::error::BrowserError;
use crate::browser::page::PageSession;
use crate::inventory::element::{ElementRecord, MAX_TEXT_CHARS, truncate_chars};

/// Evaluated inside the loaded document. Read-only: it never mutates the page.
///
/// One combined selector keeps all five categories interleaved in document
/// order.
pub const EXTRACT_SCRIPT: &str = r#"(() => {
  const categories = { button: 'button', input: 'input', a: 'link', select: 'select', textarea: 'textarea' };
  const results = [];
  document.querySelectorAll('button, input, a, select, textarea').forEach(el => {
    const tagName = (el.tagName || '').toLowerCase();
    const category = categories[tagName];
    if (!category) return;
    const rect = el.getBoundingClientRect();
    results.push({
      category,
      tagName,
      text: (el.innerText || el.value || '').trim().slice(0, 120),
      identifier: el.id || null,
      name: el.getAttribute('name'),
      role: el.getAttribute('role'),
      href: el.getAttribute('href'),
      classList: el.getAttribute('class') || '',
      isVisible: rect.width > 0 && rect.height > 0,
    });
  });
  return results;
})()"#;

/// Run the extraction script and parse its output. Returns every recognized
/// element, visible or not; callers filter with [`visible_only`].
pub fn extract<S: PageSession + ?Sized>(page: &mut S) -> Result<Vec<ElementRecord>, BrowserError> {
    let raw = page.evaluate(EXTRACT_SCRIPT)?;
    if !raw.is_array() {
        return Err(BrowserError::protocol(
            "evaluate",
            format!("extraction returned {} instead of an array", json_kind(&raw)),
        ));
    }
    Ok(parse_inventory(&raw))
}

/// Turn a serialized DOM snapshot into records.
///
/// Entries with an unknown category or the wrong shape are dropped, so an
/// unrecognized tag never makes it into the inventory. A non-array snapshot
/// yields nothing.
pub fn parse_inventory(snapshot: &Value) -> Vec<ElementRecord> {
    let Some(entries) = snapshot.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<ElementRecord>(entry.clone()) {
            Ok(mut record) => {
                record.text = truncate_chars(record.text.trim(), MAX_TEXT_CHARS);
                record.tag_name = record.tag_name.to_lowercase();
                Some(record)
            }
            Err(e) => {
                debug!(index = idx, error = %e, "skipping unrecognized element entry");
                None
            }
        })
        .collect()
}

/// Keep only elements whose bounding box had positive area.
pub fn visible_only(records: Vec<ElementRecord>) -> Vec<ElementRecord> {
    records.into_iter().filter(|r| r.is_visible).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
