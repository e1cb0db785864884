use page_testgen::inventory::element::{ElementCategory, ElementRecord, MAX_TEXT_CHARS, truncate_chars};
use page_testgen::inventory::extractor::{EXTRACT_SCRIPT, extract, parse_inventory, visible_only};
use page_testgen::inventory::selector::{DEFAULT_BUDGET, dedupe_by, render_key, select, select_with};
use serde_json::json;

use crate::common::fakes::{
    Fault, FakeLauncher, button, distinct_buttons, element, input, link, login_page,
};
use page_testgen::browser::page::SessionLauncher;

mod common;

fn record(category: ElementCategory, text: &str, name: Option<&str>, id: Option<&str>) -> ElementRecord {
    ElementRecord {
        category,
        tag_name: category.as_str().into(),
        text: text.into(),
        identifier: id.map(Into::into),
        name: name.map(Into::into),
        role: None,
        href: None,
        class_list: String::new(),
        is_visible: true,
    }
}

// ============================================================================
// ElementRecord
// ============================================================================

#[test]
fn display_label_prefers_text_then_name_then_id_then_tag() {
    let cat = ElementCategory::Input;
    assert_eq!(record(cat, "Go", Some("q"), Some("i")).display_label(), "Go");
    assert_eq!(record(cat, "", Some("q"), Some("i")).display_label(), "q");
    assert_eq!(record(cat, "", None, Some("i")).display_label(), "i");
    assert_eq!(record(cat, "", Some(""), None).display_label(), "input");
}

#[test]
fn truncate_respects_char_boundaries() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("abc", 10), "abc");
    assert_eq!(truncate_chars("", 3), "");
}

#[test]
fn tag_mapping_is_closed() {
    assert_eq!(ElementCategory::from_tag("a"), Some(ElementCategory::Link));
    assert_eq!(ElementCategory::from_tag("textarea"), Some(ElementCategory::Textarea));
    assert_eq!(ElementCategory::from_tag("div"), None);
    assert_eq!(ElementCategory::from_tag("BUTTON"), None, "tags arrive lowercased");
}

#[test]
fn record_serializes_with_camel_case_fields() {
    let r = record(ElementCategory::Button, "Sign in", None, Some("login-btn"));
    let v = serde_json::to_value(&r).unwrap();

    assert_eq!(v["category"], "button");
    assert_eq!(v["tagName"], "button");
    assert_eq!(v["identifier"], "login-btn");
    assert!(v["name"].is_null(), "absent attributes serialize as null");
    assert_eq!(v["isVisible"], true);
    assert!(v.get("tag_name").is_none());
}

// ============================================================================
// Snapshot parsing
// ============================================================================

#[test]
fn parse_inventory_reads_all_recognized_categories() {
    let snapshot = json!([
        button(Some("login-btn"), "Sign in"),
        input(Some("email")),
        link("Home"),
        element("select", "select", "One Two", None, Some("choice"), true),
        element("textarea", "textarea", "", Some("notes"), None, true),
    ]);

    let records = parse_inventory(&snapshot);
    let categories: Vec<_> = records.iter().map(|r| r.category).collect();
    assert_eq!(categories, ElementCategory::ALL.to_vec());
    assert_eq!(records[0].identifier.as_deref(), Some("login-btn"));
    assert_eq!(records[1].name.as_deref(), Some("email"));
    assert_eq!(records[2].href.as_deref(), Some("#"));
}

#[test]
fn parse_inventory_skips_unknown_categories_and_malformed_entries() {
    let snapshot = json!([
        element("div", "div", "Not interactive", None, None, true),
        {"category": "button"},
        "garbage",
        button(None, "Kept"),
    ]);

    let records = parse_inventory(&snapshot);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Kept");
}

#[test]
fn parse_inventory_of_non_array_is_empty() {
    assert!(parse_inventory(&json!({"dom": []})).is_empty());
    assert!(parse_inventory(&json!(null)).is_empty());
}

#[test]
fn parse_inventory_trims_and_truncates_text() {
    let long = format!("  {}  ", "x".repeat(300));
    let snapshot = json!([button(None, &long)]);

    let records = parse_inventory(&snapshot);
    assert_eq!(records[0].text.chars().count(), MAX_TEXT_CHARS);
    assert!(!records[0].text.starts_with(' '));
}

#[test]
fn element_without_text_name_or_id_still_recorded() {
    let snapshot = json!([element("input", "input", "", None, None, true)]);
    let records = parse_inventory(&snapshot);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].display_label(), "input");
}

// ============================================================================
// Visibility filter
// ============================================================================

#[test]
fn zero_area_elements_never_survive_the_filter() {
    let snapshot = json!([
        element("button", "button", "Collapsed", None, None, false),
        button(None, "Shown"),
        element("link", "a", "Offscreen", None, None, false),
    ]);

    let visible = visible_only(parse_inventory(&snapshot));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].text, "Shown");
}

#[test]
fn positive_area_recognized_elements_always_survive_the_filter() {
    let all = parse_inventory(&login_page());
    let expected_visible = all.iter().filter(|r| r.is_visible).count();

    let visible = visible_only(all);
    assert_eq!(visible.len(), expected_visible);
    assert!(visible.iter().all(|r| r.is_visible));
}

// ============================================================================
// Extraction through a page session
// ============================================================================

#[test]
fn extract_returns_hidden_entries_for_the_caller_to_filter() {
    let launcher = FakeLauncher::serving(login_page());
    let mut session = launcher.acquire().unwrap();

    let records = extract(&mut session).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().filter(|r| !r.is_visible).count(), 1);
}

#[test]
fn extract_rejects_non_array_results() {
    let launcher = FakeLauncher::serving(json!([])).with_fault(Fault::NonArraySnapshot);
    let mut session = launcher.acquire().unwrap();

    let err = extract(&mut session).unwrap_err();
    assert!(err.to_string().contains("instead of an array"), "got: {}", err);
}

#[test]
fn extract_script_is_read_only_and_covers_all_tags() {
    assert!(EXTRACT_SCRIPT.contains("querySelectorAll('button, input, a, select, textarea')"));
    assert!(EXTRACT_SCRIPT.contains("getBoundingClientRect"));
    for forbidden in ["click(", ".remove(", "innerHTML =", "setAttribute"] {
        assert!(!EXTRACT_SCRIPT.contains(forbidden), "script must not mutate: {}", forbidden);
    }
}

// ============================================================================
// Dedup / selection
// ============================================================================

#[test]
fn dedupe_keeps_first_occurrence_in_order() {
    let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
    let deduped = dedupe_by(items, |(k, _)| *k);
    assert_eq!(deduped, vec![("a", 1), ("b", 2), ("c", 4)]);
}

#[test]
fn render_key_collapses_identical_controls_only() {
    let a = record(ElementCategory::Button, "Buy", None, None);
    let mut b = a.clone();
    b.class_list = "btn-primary".into();
    b.href = Some("/elsewhere".into());
    let c = record(ElementCategory::Link, "Buy", None, None);

    assert_eq!(render_key(&a), render_key(&b), "informational fields are ignored");
    assert_ne!(render_key(&a), render_key(&c), "category is part of the key");
}

#[test]
fn select_truncates_to_budget_keeping_the_head() {
    let records = parse_inventory(&distinct_buttons(45));
    let selected = select(records.clone(), DEFAULT_BUDGET);

    assert_eq!(selected.len(), 30);
    assert_eq!(selected, records[..30].to_vec());
}

#[test]
fn select_removes_duplicates_before_budgeting() {
    let snapshot = json!([
        button(None, "Add to cart"),
        button(None, "Add to cart"),
        button(None, "Checkout"),
    ]);
    let selected = select(parse_inventory(&snapshot), 2);

    let texts: Vec<_> = selected.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Add to cart", "Checkout"]);
}

#[test]
fn select_without_dedupe_keeps_duplicates() {
    let snapshot = json!([button(None, "Same"), button(None, "Same")]);
    assert_eq!(select_with(parse_inventory(&snapshot), 30, false).len(), 2);
}

#[test]
fn select_is_idempotent_on_deduplicated_within_budget_input() {
    let once = select(parse_inventory(&distinct_buttons(12)), DEFAULT_BUDGET);
    let twice = select(once.clone(), DEFAULT_BUDGET);
    assert_eq!(once, twice);
}
