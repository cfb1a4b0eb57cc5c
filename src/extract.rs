//! Extract labeled vehicle details from a fetched RC-search page.
//!
//! The upstream page offers no API contract, only markup conventions:
//! details are grouped into "details card" sections headed by an `h3`,
//! each holding `span` labels followed by `p` values, plus a flat set
//! of card-body pairs and two special markers (the page `h1` and an
//! insurance expiry alert). Everything here is best-effort and total;
//! a marker missing from the page means a key missing from the record,
//! never an error.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// CSS class marking a grouped details card.
const DETAILS_CARD_CLASS: &str = "hrc-details-card";

/// One value in a lookup record: a scalar or a nested field map.
///
/// The upstream page drives which shape appears under which key, so
/// the record value has to stay open rather than a fixed struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    Text(String),
    Fields(BTreeMap<String, String>),
}

/// A full lookup record keyed by section name.
///
/// The key set depends entirely on what the fetched page contains;
/// consumers must treat every key as optional.
pub type Record = BTreeMap<String, Section>;

/// Concatenated descendant text of an element, trimmed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First element named `name` after `start` in document order.
///
/// Pre-order over the whole document, descending into `start`'s own
/// subtree first and continuing past the boundary of whatever block
/// `start` sits in. The upstream markup interleaves wrapper elements
/// between a label and its value, so sibling walks are not enough.
fn next_element_after<'a>(start: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    let root = start.ancestors().last()?;
    root.descendants()
        .skip_while(|node| node.id() != start.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

// ── Section locator ─────────────────────────────────────────────────────────

/// Map each `h3` heading to its nearest enclosing details card.
///
/// Headings outside any card are skipped. Two headings with the same
/// trimmed text keep only the later association (last write wins).
pub fn section_blocks(doc: &Html) -> HashMap<String, ElementRef<'_>> {
    let h3_sel = Selector::parse("h3").unwrap();

    let mut blocks = HashMap::new();
    for heading in doc.select(&h3_sel) {
        let card = heading.ancestors().filter_map(ElementRef::wrap).find(|el| {
            el.value().name() == "div" && el.value().classes().any(|c| c == DETAILS_CARD_CLASS)
        });
        if let Some(card) = card {
            blocks.insert(text_of(heading), card);
        }
    }
    blocks
}

// ── Block parser ────────────────────────────────────────────────────────────

/// Pair `span` labels with their following `p` values inside one card.
///
/// The value for a label is the next `p` in document order, not
/// necessarily a sibling. Labels that trim to empty, or that have no
/// `p` anywhere after them, are skipped.
pub fn parse_block(block: ElementRef<'_>) -> BTreeMap<String, String> {
    let span_sel = Selector::parse("span").unwrap();

    let mut fields = BTreeMap::new();
    for label_el in block.select(&span_sel) {
        let label = text_of(label_el);
        if label.is_empty() {
            continue;
        }
        if let Some(value_el) = next_element_after(label_el, "p") {
            fields.insert(label, text_of(value_el));
        }
    }
    fields
}

// ── Top-level extractor ─────────────────────────────────────────────────────

/// Run the full extraction pipeline over a fetched page body.
///
/// Sections come from the card headings, the flat card bodies fold
/// into a synthetic "Basic Card Info" section, the page `h1` becomes
/// the registration number, and an expired insurance alert contributes
/// its day count. Every key comes from text found in the page; the
/// expired-days count is the only conditionally inserted field.
pub fn scrape_record(html: &str) -> Record {
    let doc = Html::parse_document(html);
    let mut record = Record::new();

    for (heading, block) in section_blocks(&doc) {
        record.insert(heading, Section::Fields(parse_block(block)));
    }

    collect_card_body(&doc, &mut record);
    collect_registration(&doc, &mut record);
    collect_insurance_alert(&doc, &mut record);

    record
}

/// Gather standalone label/value pairs from flat card bodies.
///
/// Each `.hrcd-cardbody` contributes its first `span` and first `p`,
/// at any depth. The synthetic section only appears when at least one
/// pair was found.
fn collect_card_body(doc: &Html, record: &mut Record) {
    let body_sel = Selector::parse(".hrcd-cardbody").unwrap();
    let span_sel = Selector::parse("span").unwrap();
    let p_sel = Selector::parse("p").unwrap();

    let mut pairs = BTreeMap::new();
    for body in doc.select(&body_sel) {
        let label = body.select(&span_sel).next();
        let value = body.select(&p_sel).next();
        if let (Some(label), Some(value)) = (label, value) {
            pairs.insert(text_of(label), text_of(value));
        }
    }

    if !pairs.is_empty() {
        record.insert("Basic Card Info".to_string(), Section::Fields(pairs));
    }
}

/// Store the page `h1` as the registration number.
fn collect_registration(doc: &Html, record: &mut Record) {
    let h1_sel = Selector::parse("h1").unwrap();
    if let Some(h1) = doc.select(&h1_sel).next() {
        record.insert(
            "registration_number".to_string(),
            Section::Text(text_of(h1)),
        );
    }
}

/// Pull the expired-days count out of the insurance alert, if shown.
///
/// Only the alert box in its expired state carries the count. Merges
/// into an existing "Insurance Alert" section when one was already
/// extracted from the cards.
fn collect_insurance_alert(doc: &Html, record: &mut Record) {
    let alert_sel = Selector::parse(".insurance-alert-box.expired .title").unwrap();
    let digits = Regex::new(r"\d+").unwrap();

    if let Some(title) = doc.select(&alert_sel).next() {
        let text: String = title.text().collect();
        if let Some(m) = digits.find(&text) {
            let entry = record
                .entry("Insurance Alert".to_string())
                .or_insert_with(|| Section::Fields(BTreeMap::new()));
            if let Section::Fields(fields) = entry {
                fields.insert("Expired Days".to_string(), m.as_str().to_string());
            }
        }
    }
}
