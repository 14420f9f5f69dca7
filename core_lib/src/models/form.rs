//! Snapshot of a form at the moment it is submitted

use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;
use uuid::Uuid;

/// Marker attribute; `data-ajax="false"` opts a form out of interception.
pub const OPT_OUT_ATTR: &str = "data-ajax";
/// Marker attribute holding a confirmation prompt.
pub const CONFIRM_ATTR: &str = "data-confirm";
/// Marker attribute suppressing the default feedback banner.
pub const SILENT_ATTR: &str = "data-silent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FilePart),
}

impl FieldValue {
    /// Value used when the field travels in a query string. Files contribute
    /// their name only.
    pub fn as_query_value(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::File(file) => &file.file_name,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }
}

/// Ordered field set. Names may repeat; order of insertion is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, FieldValue)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.entries.push((name.into(), value));
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name, FieldValue::Text(value.into()));
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: FilePart) {
        self.push(name, FieldValue::File(file));
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.entries
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn has_files(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| matches!(value, FieldValue::File(_)))
    }

    /// `application/x-www-form-urlencoded` encoding, the same one browsers use
    /// for `URLSearchParams`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.iter() {
            serializer.append_pair(name, value.as_query_value());
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (name, value) in iter {
            fields.push_text(name, value);
        }
        fields
    }
}

/// Per-form behaviour read from the marker attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub intercept: bool,
    pub confirm: Option<String>,
    pub silent: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            intercept: true,
            confirm: None,
            silent: false,
        }
    }
}

impl FormOptions {
    pub fn from_attributes<F>(attribute: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let intercept = !attribute(OPT_OUT_ATTR)
            .map(|value| value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(false);

        let confirm = attribute(CONFIRM_ATTR)
            .map(|prompt| prompt.trim().to_string())
            .filter(|prompt| !prompt.is_empty());

        let silent = attribute(SILENT_ATTR)
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(false);

        Self {
            intercept,
            confirm,
            silent,
        }
    }

    pub fn with_confirm(mut self, prompt: impl Into<String>) -> Self {
        self.confirm = Some(prompt.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn opted_out(mut self) -> Self {
        self.intercept = false;
        self
    }
}

/// The control that triggered the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Submitter {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InterceptedForm {
    pub id: SubmissionId,
    pub action: String,
    pub method: Method,
    pub fields: FormFields,
    pub options: FormOptions,
    pub submitter: Option<Submitter>,
}

impl InterceptedForm {
    pub fn new(action: impl Into<String>, method: Method) -> Self {
        Self {
            id: SubmissionId::new(),
            action: action.into(),
            method,
            fields: FormFields::new(),
            options: FormOptions::default(),
            submitter: None,
        }
    }

    pub fn with_fields(mut self, fields: FormFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Maps the reflected `form.method` value. `dialog` forms never reach the
    /// network and yield `None`; unknown values fall back to GET.
    pub fn parse_method(raw: &str) -> Option<Method> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "post" => Some(Method::POST),
            "dialog" => None,
            _ => Some(Method::GET),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Action without query string or fragment.
    pub fn action_path(&self) -> &str {
        let end = self
            .action
            .find(['?', '#'])
            .unwrap_or(self.action.len());
        &self.action[..end]
    }
}
