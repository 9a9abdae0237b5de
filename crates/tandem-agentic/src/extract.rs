// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extraction from task documents.
//!
//! The task API has changed its output shape over time. Each extractor
//! handles one shape; [`extract_text`] tries them in order and the first
//! non-empty result wins.

use serde_json::Value;

/// A pure function pulling answer text out of a task document.
pub type Extractor = fn(&Value) -> Option<String>;

/// Extractors in priority order, with names for logging.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("assistant_output_text", assistant_output_text),
    ("legacy_parts", legacy_parts),
    ("result", flat_result),
    ("response", flat_response),
    ("output_text", flat_output_text),
];

/// Runs the extractor chain.
pub fn extract_text(task: &Value) -> Option<(&'static str, String)> {
    EXTRACTORS
        .iter()
        .find_map(|(name, extractor)| extractor(task).map(|text| (*name, text)))
}

/// `output[]` items with `role == "assistant"`, parts typed `output_text`.
fn assistant_output_text(task: &Value) -> Option<String> {
    let texts = output_items(task)
        .filter(|item| role(item) == Some("assistant"))
        .flat_map(parts)
        .filter(|part| part_type(part) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str));
    join_non_empty(texts)
}

/// Untagged or assistant `output[]` items, parts typed `text` or `message`.
///
/// Items tagged with any other role (such as a `user` echo of the prompt)
/// are never treated as the answer.
fn legacy_parts(task: &Value) -> Option<String> {
    let texts = output_items(task)
        .filter(|item| matches!(role(item), None | Some("assistant")))
        .flat_map(parts)
        .filter(|part| matches!(part_type(part), Some("text" | "message")))
        .filter_map(|part| {
            part.get("text")
                .or_else(|| part.get("content"))
                .and_then(Value::as_str)
        });
    join_non_empty(texts)
}

fn flat_result(task: &Value) -> Option<String> {
    flat_field(task, "result")
}

fn flat_response(task: &Value) -> Option<String> {
    flat_field(task, "response")
}

fn flat_output_text(task: &Value) -> Option<String> {
    flat_field(task, "output_text")
}

fn flat_field(task: &Value, key: &str) -> Option<String> {
    task.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn output_items(task: &Value) -> impl Iterator<Item = &Value> {
    task.get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn parts(item: &Value) -> impl Iterator<Item = &Value> {
    item.get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn role(item: &Value) -> Option<&str> {
    item.get("role").and_then(Value::as_str)
}

fn part_type(part: &Value) -> Option<&str> {
    part.get("type").and_then(Value::as_str)
}

fn join_non_empty<'a>(texts: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = texts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!joined.is_empty()).then_some(joined)
}
