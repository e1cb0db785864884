//! Playwright Test source generation.
//!
//! Rendering is a pure function of the URL, the selected elements and their
//! titles. Interaction code is derived only from each element's category and
//! raw attributes; titles only ever end up inside the `test('…')` string.

use crate::inventory::element::{ElementCategory, ElementRecord};

/// Value typed into fields by generated input tests.
pub const PROBE_VALUE: &str = "test";

/// Title of the baseline case that every suite starts with.
pub const BASELINE_TITLE: &str = "page loads";

/// `interact <category> <label>`, the title used when no advisor renames it.
pub fn default_test_name(record: &ElementRecord) -> String {
    format!("interact {} {}", record.category, record.display_label())
        .trim()
        .to_string()
}

/// Escape a value for a single-quoted JavaScript string literal.
pub fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Titles lose their quote characters entirely (no escaping), backslashes
/// become `/`, and control characters and line separators become spaces.
/// The result can be pasted between single quotes as is.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '`'))
        .map(|c| match c {
            '\\' => '/',
            '\u{2028}' | '\u{2029}' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Render a full suite: the baseline case, then one case per element numbered
/// from 1.
///
/// `titles[i]` names `elements[i]`; a missing or blank title falls back to
/// [`default_test_name`].
pub fn render_playwright(url: &str, elements: &[ElementRecord], titles: &[String]) -> String {
    let url = escape_single_quoted(url);
    let mut lines: Vec<String> = vec![
        "import { test, expect } from '@playwright/test';".into(),
        String::new(),
    ];

    lines.extend(baseline_case(&url));

    for (idx, element) in elements.iter().enumerate() {
        let title = titles
            .get(idx)
            .map(|t| sanitize_title(t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| sanitize_title(&default_test_name(element)));
        lines.extend(element_case(&url, element, &title, idx + 1));
    }

    lines.join("\n")
}

fn baseline_case(escaped_url: &str) -> Vec<String> {
    vec![
        format!("test('{}', async ({{ page }}) => {{", BASELINE_TITLE),
        format!("  await page.goto('{}');", escaped_url),
        "  await expect(page).toHaveTitle(/.+/);".into(),
        "});".into(),
        String::new(),
    ]
}

fn element_case(escaped_url: &str, element: &ElementRecord, title: &str, number: usize) -> Vec<String> {
    let mut lines = vec![
        format!("test('{} #{}', async ({{ page }}) => {{", title, number),
        format!("  await page.goto('{}');", escaped_url),
    ];
    lines.extend(interaction(element));
    lines.push("});".into());
    lines.push(String::new());
    lines
}

/// Body lines after `page.goto`, keyed by category.
fn interaction(element: &ElementRecord) -> Vec<String> {
    match element.category {
        ElementCategory::Button => click_by_role("button", &element.text),
        ElementCategory::Link => click_by_role("link", &element.text),
        ElementCategory::Input | ElementCategory::Textarea => fill_field(element),
        ElementCategory::Select => {
            vec!["  // Element type not directly handled; page opened.".into()]
        }
    }
}

fn click_by_role(role: &str, text: &str) -> Vec<String> {
    vec![
        format!(
            "  await page.getByRole('{}', {{ name: '{}' }}).first().click();",
            role,
            escape_single_quoted(text)
        ),
        "  await expect(page).toHaveURL(/.*/);".into(),
    ]
}

/// Locate by placeholder (name, then id, then text). The generated test falls
/// back to the first generic field at run time if that matches nothing.
fn fill_field(element: &ElementRecord) -> Vec<String> {
    let placeholder = [
        element.name.as_deref(),
        element.identifier.as_deref(),
        Some(element.text.as_str()),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .unwrap_or("");

    vec![
        format!(
            "  const field = page.getByPlaceholder('{}').first();",
            escape_single_quoted(placeholder)
        ),
        format!(
            "  if (await field.count()) {{ await field.fill('{probe}'); }} else {{ await page.locator('input, textarea').first().fill('{probe}'); }}",
            probe = PROBE_VALUE
        ),
        "  await expect(page).toHaveURL(/.*/);".into(),
    ]
}

/// Number of `test(` cases in rendered source.
pub fn count_test_cases(source: &str) -> usize {
    source.lines().filter(|l| l.starts_with("test('")).count()
}
