//! Scheduled post records carried in scheduler responses

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(i64),
    Text(String),
}

impl PostId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(match number.as_i64() {
                Some(id) => PostId::Number(id),
                None => PostId::Text(number.to_string()),
            }),
            Value::String(text) => Some(PostId::Text(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(id) => write!(f, "{}", id),
            PostId::Text(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: Option<PostId>,
    pub title: Option<String>,
    pub account: Option<String>,
    pub account_platform: Option<String>,
    pub scheduled_time: Option<String>,
    pub scheduled_time_display: Option<String>,
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub content: Option<String>,
}

impl ScheduledPost {
    /// Converts a payload array, dropping entries that are not objects.
    /// Numeric text fields are stringified; other mistyped fields count as absent.
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match value {
                Value::Object(record) => Some(Self::from_record(record)),
                other => {
                    warn!(index, "Skipping scheduled post that is not an object: {}", other);
                    None
                }
            })
            .collect()
    }

    fn from_record(record: &Map<String, Value>) -> Self {
        let text = |key: &str| record.get(key).and_then(scalar_text);
        Self {
            id: record.get("id").and_then(PostId::from_value),
            title: text("title"),
            account: text("account"),
            account_platform: text("account_platform"),
            scheduled_time: text("scheduled_time"),
            scheduled_time_display: text("scheduled_time_display"),
            status: text("status"),
            video_url: text("video_url"),
            content: text("content"),
        }
    }

    /// Usable id for the delete form. Blank text ids count as missing.
    pub fn id(&self) -> Option<&PostId> {
        self.id.as_ref().filter(|id| match id {
            PostId::Text(text) => !text.trim().is_empty(),
            PostId::Number(_) => true,
        })
    }

    /// Prefers the server-formatted time, then formats the ISO timestamp.
    pub fn display_time(&self) -> Option<String> {
        if let Some(display) = present(&self.scheduled_time_display) {
            return Some(display.to_string());
        }

        let raw = present(&self.scheduled_time)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.format(DISPLAY_FORMAT).to_string());
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(parsed.format(DISPLAY_FORMAT).to_string());
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
            return Some(parsed.format(DISPLAY_FORMAT).to_string());
        }
        Some(raw.to_string())
    }

    pub fn title(&self) -> Option<&str> {
        present(&self.title)
    }

    pub fn account(&self) -> Option<&str> {
        present(&self.account)
    }

    pub fn account_platform(&self) -> Option<&str> {
        present(&self.account_platform)
    }

    pub fn status(&self) -> Option<&str> {
        present(&self.status)
    }

    pub fn video_url(&self) -> Option<&str> {
        present(&self.video_url)
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}
