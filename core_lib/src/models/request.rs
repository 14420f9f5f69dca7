//! Asynchronous request derived from an intercepted form

use crate::error::Result;
use crate::models::form::{FormFields, InterceptedForm};
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use http::Method;
use tracing::debug;
use url::Url;

pub const REQUESTED_WITH: &str = "x-requested-with";
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Sent as a multipart body. Always `None` for GET.
    pub body: Option<FormFields>,
}

impl RequestDescriptor {
    pub fn from_form(form: &InterceptedForm, accept: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(REQUESTED_WITH),
            HeaderValue::from_static(XML_HTTP_REQUEST),
        );
        headers.insert(ACCEPT, HeaderValue::from_str(accept)?);

        let (url, body) = if form.is_get() {
            (append_query(&form.action, &form.fields), None)
        } else {
            (form.action.clone(), Some(form.fields.clone()))
        };

        Ok(Self {
            method: form.method.clone(),
            url,
            headers,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Appends encoded fields to `action`, keeping any query string already present
/// and any trailing fragment. Relative actions are rewritten as plain text.
pub fn append_query(action: &str, fields: &FormFields) -> String {
    if fields.is_empty() {
        return action.to_string();
    }

    if let Ok(mut url) = Url::parse(action) {
        url.query_pairs_mut()
            .extend_pairs(fields.iter().map(|(name, value)| (name, value.as_query_value())));
        return url.to_string();
    }

    let encoded = fields.to_query_string();

    let (base, fragment) = match action.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (action, None),
    };

    let mut url = match base.split_once('?') {
        Some((path, existing)) if !existing.is_empty() => {
            format!("{}?{}&{}", path, existing.trim_end_matches('&'), encoded)
        }
        Some((path, _)) => format!("{}?{}", path, encoded),
        None => format!("{}?{}", base, encoded),
    };

    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }

    url
}

/// Resolves a submit button's `formaction` against the document base URL.
/// Falls back to the trimmed value when either side cannot be parsed.
pub fn resolve_action(base: Option<&str>, action: &str) -> String {
    let action = action.trim();
    match base.and_then(|base| Url::parse(base).ok()) {
        Some(base) => match base.join(action) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!(action, "Could not resolve action: {}", e);
                action.to_string()
            }
        },
        None => action.to_string(),
    }
}
