//! Tolerant output parser: turns free-form model text into structured results.
//!
//! Hosted models wrap JSON in code fences, prepend `</think>`-terminated
//! reasoning, or emit near-JSON with trailing commentary. Parsing is layered:
//!
//! 1. drop everything up to and including `</think>`
//! 2. strip code fences, at both ends and stray ones inside
//! 3. strict JSON parse, then the embedded `{...}` / `[...]` slice
//! 4. per-field pattern extraction as the last resort
//!
//! Nothing here returns an error. Every failure degrades to empty strings and
//! `None` scores.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Closing tag of a reasoning preamble.
pub const REASONING_END_MARKER: &str = "</think>";
/// Joins list items for HTML display.
pub const DISPLAY_JOINER: &str = "<br>";
/// Highest valid score. Anything above is treated as an extraction failure.
pub const MAX_SCORE: u8 = 10;

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap());
static STRAY_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?\s*").unwrap());
static QUOTED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap());
static FIELD_PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(Default::default);

const ANALYSIS_FIELDS: &[&str] = &["analysis_content", "analysis_delivery", "score"];
const SUMMARY_FIELDS: &[&str] = &["strengths", "weaknesses", "tips", "overall_score"];

// ────────────────────────────────────────────────────────────────────────────
// Output shapes
// ────────────────────────────────────────────────────────────────────────────

/// What the cleaned model text turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    StructuredList(Vec<Value>),
    StructuredObject(Map<String, Value>),
    PlainText(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
}

/// Per-answer evaluation. `score: None` means extraction failed, not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    pub analysis_content: String,
    pub analysis_delivery: String,
    pub score: Option<u8>,
}

/// Display-ready coaching summary. List fields are joined with `<br>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoachingSummary {
    Structured {
        strengths: String,
        weaknesses: String,
        tips: String,
        overall_score: Option<u8>,
    },
    Text {
        text: String,
    },
}

const SUMMARY_LIST_FIELDS: [&str; 3] = ["strengths", "weaknesses", "tips"];

// ────────────────────────────────────────────────────────────────────────────
// Cleaning and classification
// ────────────────────────────────────────────────────────────────────────────

/// Returns only the text after the first `</think>`, or all of it if absent.
pub fn strip_reasoning(text: &str) -> &str {
    match text.split_once(REASONING_END_MARKER) {
        Some((_, rest)) => rest,
        None => text,
    }
}

/// Strips a leading ```` ```lang ```` and a trailing ```` ``` ````, each if
/// present, then drops any fence markers left inside.
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    let mut text = text.trim();
    if let Some(open) = FENCE_OPEN.find(text) {
        text = &text[open.end()..];
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }

    let text = text.trim();
    if text.contains("```") {
        Cow::Owned(STRAY_FENCE.replace_all(text, "").trim().to_string())
    } else {
        Cow::Borrowed(text)
    }
}

/// Reasoning removal followed by fence removal.
pub fn clean(raw: &str) -> Cow<'_, str> {
    strip_code_fences(strip_reasoning(raw))
}

pub fn classify(raw: &str) -> ParsedOutput {
    classify_clean(&clean(raw))
}

fn classify_clean(text: &str) -> ParsedOutput {
    if let Some(parsed) = parse_structured(text) {
        return parsed;
    }
    if let Some(parsed) = embedded_json_slice(text).and_then(parse_structured) {
        debug!("Recovered JSON embedded in surrounding prose");
        return parsed;
    }
    ParsedOutput::PlainText(text.to_string())
}

fn parse_structured(text: &str) -> Option<ParsedOutput> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(ParsedOutput::StructuredList(items)),
        Value::Object(map) => Some(ParsedOutput::StructuredObject(map)),
        _ => None,
    }
}

/// Span from the first `{` or `[` to the last matching closer.
fn embedded_json_slice(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

/// Parses generated questions, preserving model order.
///
/// Accepts a bare list, the legacy `{"questions": [...]}` object, or plain
/// text (kept as one question). Wrappers whose value is itself a JSON list of
/// questions are flattened one level.
pub fn parse_question_list(raw: &str) -> Vec<GeneratedQuestion> {
    let items = match classify(raw) {
        ParsedOutput::StructuredList(items) => items,
        ParsedOutput::StructuredObject(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ if question_text(&map).is_some() => vec![Value::Object(map)],
            _ => {
                warn!("Question output was a JSON object without questions");
                Vec::new()
            }
        },
        ParsedOutput::PlainText(text) if text.is_empty() => Vec::new(),
        ParsedOutput::PlainText(text) => {
            warn!("Question output was not JSON; keeping it as a single entry");
            vec![Value::String(text)]
        }
    };

    flatten_questions(items)
}

/// One level of wrapper flattening. Entries that carry no question text are dropped.
pub fn flatten_questions(items: Vec<Value>) -> Vec<GeneratedQuestion> {
    let mut questions = Vec::with_capacity(items.len());

    for item in items {
        let text = match &item {
            Value::Object(map) => question_text(map),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        };
        let Some(text) = text else {
            continue;
        };

        let text = strip_code_fences(text);
        if let Some(inner) = parse_question_objects(&text) {
            questions.extend(inner);
        } else if !text.is_empty() {
            questions.push(GeneratedQuestion {
                question: text.to_string(),
            });
        }
    }

    questions
}

fn question_text(map: &Map<String, Value>) -> Option<&str> {
    map.get("question")
        .or_else(|| map.get("main"))
        .and_then(Value::as_str)
}

/// `Some` only if `text` is a JSON list in which every entry has question text.
fn parse_question_objects(text: &str) -> Option<Vec<GeneratedQuestion>> {
    let Value::Array(items) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    items
        .iter()
        .map(|item| {
            item.as_object()
                .and_then(question_text)
                .map(|q| GeneratedQuestion {
                    question: q.trim().to_string(),
                })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-answer analysis
// ────────────────────────────────────────────────────────────────────────────

pub fn parse_question_analysis(raw: &str) -> QuestionAnalysis {
    let cleaned = clean(raw);
    let text = cleaned.as_ref();

    if let ParsedOutput::StructuredObject(map) = classify_clean(text) {
        return QuestionAnalysis {
            analysis_content: string_field(&map, "analysis_content"),
            analysis_delivery: string_field(&map, "analysis_delivery"),
            score: map.get("score").and_then(score_from_value),
        };
    }

    warn!("Analysis output was not a JSON object; falling back to field extraction");
    QuestionAnalysis {
        analysis_content: extract_text_field(text, "analysis_content", ANALYSIS_FIELDS)
            .unwrap_or_default(),
        analysis_delivery: extract_text_field(text, "analysis_delivery", ANALYSIS_FIELDS)
            .unwrap_or_default(),
        score: extract_score(text, "score"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Coaching summaries
// ────────────────────────────────────────────────────────────────────────────

pub fn parse_coaching_summary(raw: &str) -> CoachingSummary {
    let cleaned = clean(raw);
    let text = cleaned.as_ref();

    if let ParsedOutput::StructuredObject(map) = classify_clean(text) {
        let [strengths, weaknesses, tips] =
            SUMMARY_LIST_FIELDS.map(|field| display_field(map.get(field)));
        return CoachingSummary::Structured {
            strengths,
            weaknesses,
            tips,
            overall_score: map.get("overall_score").and_then(score_from_value),
        };
    }

    let lists =
        SUMMARY_LIST_FIELDS.map(|field| extract_string_list(text, field, SUMMARY_FIELDS));
    let overall_score = extract_score(text, "overall_score");

    if lists.iter().all(Option::is_none) && overall_score.is_none() {
        warn!("Summary output had no recognizable fields; returning plain text");
        return CoachingSummary::Text {
            text: text.to_string(),
        };
    }

    warn!("Summary output was not a JSON object; recovered fields by extraction");
    let [strengths, weaknesses, tips] =
        lists.map(|items| join_for_display(&items.unwrap_or_default()));
    CoachingSummary::Structured {
        strengths,
        weaknesses,
        tips,
        overall_score,
    }
}

/// Joins list items for display, preserving order.
pub fn join_for_display(items: &[String]) -> String {
    items.join(DISPLAY_JOINER)
}

fn display_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => {
            let items: Vec<String> = items.iter().map(value_to_text).collect();
            join_for_display(&items)
        }
        Some(Value::Null) | None => String::new(),
        Some(other) => value_to_text(other),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field extractors (fallback stage)
// ────────────────────────────────────────────────────────────────────────────

/// Finds `"field": "value"` anywhere in `text`. `fields` lists every key the
/// output is expected to carry, in order. A quoted value ends at its closing
/// quote when that is followed by another expected key, the final `}` or the
/// end of text. Otherwise the value runs up to the next expected key, or to the
/// end of text if the output was cut off.
pub fn extract_text_field(text: &str, field: &str, fields: &[&str]) -> Option<String> {
    let name = regex::escape(field);
    let next_keys = next_key_alternation(field, fields);

    let quoted_end = next_keys
        .as_ref()
        .map(|keys| format!(r#"\s*,\s*"?\b(?:{keys})\b"?\s*:|"#))
        .unwrap_or_default();
    let quoted = cached_regex(format!(
        r#"(?s)"?\b{name}\b"?\s*:\s*"(.*?)"(?:{quoted_end}\s*,?\s*\}}\s*$|\s*$)"#
    ))?;
    if let Some(value) = quoted.captures(text).and_then(|c| c.get(1)) {
        return Some(unescape_json_fragment(value.as_str().trim()));
    }

    let loose_end = next_keys
        .as_ref()
        .map(|keys| format!(r#""?\s*,?\s*"?\b(?:{keys})\b"?\s*:|"#))
        .unwrap_or_default();
    let loose = cached_regex(format!(
        r#"(?s)"?\b{name}\b"?\s*:\s*"?(.*?)(?:{loose_end}"?\s*,?\s*\}}?\s*$)"#
    ))?;
    let value = loose.captures(text)?.get(1)?.as_str().trim();
    Some(unescape_json_fragment(value))
}

/// Finds `"field": <0-10>` (quoted or bare, decimals rounded). A quoted key is
/// preferred so a `score:` inside prose is not picked up. Out-of-range values
/// yield `None`.
pub fn extract_score(text: &str, field: &str) -> Option<u8> {
    let name = regex::escape(field);
    let keyed = cached_regex(format!(r#""{name}"\s*:\s*"?(\d{{1,3}}(?:\.\d+)?)"#))?;
    let bare = cached_regex(format!(r#"\b{name}\b"?\s*:\s*"?(\d{{1,3}}(?:\.\d+)?)"#))?;

    let last_number = |re: &Regex| {
        re.captures_iter(text)
            .last()
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };
    let number = last_number(&keyed).or_else(|| last_number(&bare))?;
    score_from_number(number)
}

/// Finds `"field": ["a", "b"]` and returns the quoted items. A plain string
/// value is returned as a one-item list.
pub fn extract_string_list(text: &str, field: &str, fields: &[&str]) -> Option<Vec<String>> {
    let re = cached_regex(format!(
        r#"(?s)"?\b{}\b"?\s*:\s*\[(.*?)\]"#,
        regex::escape(field)
    ))?;

    match re.captures(text).and_then(|c| c.get(1)) {
        Some(items) => Some(
            QUOTED_ITEM
                .captures_iter(items.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| unescape_json_fragment(m.as_str()))
                .collect(),
        ),
        None => extract_text_field(text, field, fields)
            .filter(|s| !s.is_empty())
            .map(|s| vec![s]),
    }
}

fn next_key_alternation(field: &str, fields: &[&str]) -> Option<String> {
    let keys: Vec<String> = fields
        .iter()
        .filter(|f| **f != field)
        .map(|f| regex::escape(f))
        .collect();
    (!keys.is_empty()).then(|| keys.join("|"))
}

/// Compiles a field pattern once and reuses it. Fields come from a small fixed
/// set, so the cache stays bounded.
fn cached_regex(pattern: String) -> Option<Regex> {
    if let Some(re) = FIELD_PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&pattern)
    {
        return Some(re.clone());
    }
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            debug!("Field pattern failed to compile: {}", e);
            return None;
        }
    };
    FIELD_PATTERNS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(pattern, re.clone());
    Some(re)
}

fn unescape_json_fragment(fragment: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{fragment}\""))
        .unwrap_or_else(|_| fragment.to_string())
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::Null) | None => String::new(),
        Some(value) => value_to_text(value),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn score_from_value(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score_from_number(score)
}

/// Rounds to the nearest integer; negative, non-finite and above-10 values
/// yield `None`.
fn score_from_number(score: f64) -> Option<u8> {
    let rounded = score.round();
    (rounded.is_finite() && (0.0..=f64::from(MAX_SCORE)).contains(&rounded)).then(|| rounded as u8)
}
