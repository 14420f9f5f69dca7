//! Server response contract

use crate::error::Result;
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

pub const RELOAD: &str = "reload";

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            url: String::new(),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, body).with_content_type("application/json")
    }

    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, body).with_content_type("text/html; charset=utf-8")
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn kind(&self) -> ResponseKind {
        ResponseKind::classify(self.content_type.as_deref())
    }

    pub fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            status: self.status.as_u16(),
            ok: self.status.is_success(),
            url: self.url.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Response summary carried on lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMeta {
    pub status: u16,
    pub ok: bool,
    pub url: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Html,
    Other,
}

impl ResponseKind {
    pub fn classify(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return ResponseKind::Other;
        };

        match raw.parse::<mime::Mime>() {
            Ok(parsed) => {
                let is_json = parsed.type_() == mime::APPLICATION
                    && (parsed.subtype() == mime::JSON || parsed.suffix() == Some(mime::JSON));
                if is_json {
                    ResponseKind::Json
                } else if parsed.type_() == mime::TEXT && parsed.subtype() == mime::HTML {
                    ResponseKind::Html
                } else {
                    ResponseKind::Other
                }
            }
            Err(_) => {
                let lowered = raw.to_ascii_lowercase();
                if lowered.contains("application/json") {
                    ResponseKind::Json
                } else if lowered.contains("text/html") {
                    ResponseKind::Html
                } else {
                    ResponseKind::Other
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Reload,
    Navigate(String),
}

impl Redirect {
    pub fn parse(raw: &str) -> Option<Self> {
        let target = raw.trim();
        if target.is_empty() {
            None
        } else if target == RELOAD {
            Some(Redirect::Reload)
        } else {
            Some(Redirect::Navigate(target.to_string()))
        }
    }
}

/// JSON response body. Known fields are read leniently; values of an unexpected
/// type stay in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponsePayload {
    /// Only a syntax error fails. A body that is not an object gives an empty
    /// payload whose outcome follows the HTTP status.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            success: take(&mut fields, "success", Value::as_bool),
            message: take(&mut fields, "message", as_text),
            error: take(&mut fields, "error", as_text),
            warning: take(&mut fields, "warning", as_text),
            redirect: take(&mut fields, "redirect", as_text),
            extra: fields,
        }
    }

    /// A missing `success` flag defers to the HTTP status.
    pub fn is_success(&self, status: StatusCode) -> bool {
        status.is_success() && self.success != Some(false)
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(self.message.as_deref())
    }

    pub fn error(&self) -> Option<&str> {
        non_empty(self.error.as_deref())
    }

    pub fn warning(&self) -> Option<&str> {
        non_empty(self.warning.as_deref())
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.error().or_else(|| self.message())
    }

    pub fn redirect(&self) -> Option<Redirect> {
        self.redirect.as_deref().and_then(Redirect::parse)
    }

    /// A domain array such as `posts`.
    pub fn list(&self, key: &str) -> Option<&Vec<Value>> {
        self.extra.get(key).and_then(Value::as_array)
    }
}

/// Removes `key` only when `read` accepts its value.
fn take<T>(fields: &mut Map<String, Value>, key: &str, read: fn(&Value) -> Option<T>) -> Option<T> {
    let value = fields.get(key).and_then(read)?;
    fields.remove(key);
    Some(value)
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
