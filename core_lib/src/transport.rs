//! Network boundary for intercepted submissions

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use crate::error::{AjaxError, Result};
use crate::models::{FieldValue, FormFields, RawResponse, RequestDescriptor};

/// Performs one request. An `Err` means no response was received.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base for relative form actions, normally the document URL.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn resolve(&self, raw: &str) -> Result<Url> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => Ok(base.join(raw)?),
                None => Err(AjaxError::InvalidUrl(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(e) => Err(e.into()),
        }
    }
}

pub fn multipart_body(fields: FormFields) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields.iter() {
        form = match value {
            FieldValue::Text(text) => form.text(name.to_string(), text.clone()),
            FieldValue::File(file) => {
                let content_type = file.content_type.clone().unwrap_or_else(|| {
                    mime_guess::from_path(&file.file_name)
                        .first_or_octet_stream()
                        .to_string()
                });
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&content_type)?;
                form.part(name.to_string(), part)
            }
        };
    }
    Ok(form)
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse> {
        let url = self.resolve(&request.url)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if let Some(fields) = request.body {
            builder = builder.multipart(multipart_body(fields)?);
        }

        #[cfg(target_arch = "wasm32")]
        {
            builder = builder.fetch_credentials_same_origin();
        }

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            url,
            content_type,
            body,
        })
    }
}
