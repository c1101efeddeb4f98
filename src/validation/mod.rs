//! Shape checks for every payload that crosses the HTTP or upstream boundary.
//!
//! Each function takes loose JSON and either returns the typed value or a
//! [`ValidationError`] naming every offending field.

use crate::{
    error::{FieldIssue, ValidationError},
    models::{FetchRequest, NewHistoryEntry, SearchRequest, VideoResult},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

const HISTORY_FIELDS: [&str; 4] = ["title", "thumbnail", "quality", "downloadUrl"];

#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ValidationError> {
    input
        .as_object()
        .ok_or_else(|| ValidationError::single("body", "expected a JSON object"))
}

fn non_empty_string(obj: &Map<String, Value>, field: &str, issues: &mut Issues) -> String {
    match obj.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, "is required");
            String::new()
        }
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => {
            issues.push(field, "must not be empty");
            String::new()
        }
        Some(_) => {
            issues.push(field, "must be a string");
            String::new()
        }
    }
}

pub fn validate_fetch_request(input: &Value) -> Result<FetchRequest, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Issues::default();

    let raw = non_empty_string(obj, "url", &mut issues);
    let parsed = if raw.is_empty() {
        None
    } else {
        match Url::parse(raw.trim()) {
            Ok(url) if url.has_host() => Some(url),
            Ok(_) => {
                issues.push("url", "must be an absolute URL with a host");
                None
            }
            Err(err) => {
                issues.push("url", format!("invalid URL: {err}"));
                None
            }
        }
    };

    match parsed {
        Some(url) => Ok(FetchRequest { url }),
        None => Err(ValidationError { issues: issues.0 }),
    }
}

pub fn validate_video_result(input: &Value) -> Result<VideoResult, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Issues::default();

    let status = match obj.get("status") {
        Some(Value::Bool(b)) => *b,
        None | Some(Value::Null) => {
            issues.push("status", "is required");
            false
        }
        Some(_) => {
            issues.push("status", "must be a boolean");
            false
        }
    };
    let creator = non_empty_string(obj, "creator", &mut issues);
    let title = non_empty_string(obj, "title", &mut issues);
    let thumbnail = non_empty_string(obj, "thumbnail", &mut issues);
    let audio = non_empty_string(obj, "audio", &mut issues);

    let mut videos = BTreeMap::new();
    match obj.get("videos") {
        Some(Value::Object(map)) => {
            for (label, link) in map {
                match link {
                    Value::String(s) => {
                        videos.insert(label.clone(), s.clone());
                    }
                    _ => issues.push(format!("videos.{label}"), "must be a string"),
                }
            }
        }
        None | Some(Value::Null) => issues.push("videos", "is required"),
        Some(_) => issues.push("videos", "must be an object of quality to URL"),
    }

    issues.finish(|| VideoResult {
        status,
        creator,
        title,
        thumbnail,
        audio,
        videos,
    })
}

pub fn validate_search_request(input: &Value) -> Result<SearchRequest, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Issues::default();
    let query = non_empty_string(obj, "query", &mut issues);
    issues.finish(|| SearchRequest {
        query: query.trim().to_string(),
    })
}

pub fn validate_history_insert(input: &Value) -> Result<NewHistoryEntry, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Issues::default();

    let title = non_empty_string(obj, "title", &mut issues);
    let thumbnail = non_empty_string(obj, "thumbnail", &mut issues);
    let quality = non_empty_string(obj, "quality", &mut issues);
    let download_url = non_empty_string(obj, "downloadUrl", &mut issues);

    for key in obj.keys() {
        if !HISTORY_FIELDS.contains(&key.as_str()) {
            issues.push(key.as_str(), "unknown field");
        }
    }

    issues.finish(|| NewHistoryEntry {
        title,
        thumbnail,
        quality,
        download_url,
    })
}

/// Query-string parameter that must be present and non-blank.
pub fn require_param(name: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(_) => Err(ValidationError::single(name, "must not be empty")),
        None => Err(ValidationError::single(name, "is required")),
    }
}
