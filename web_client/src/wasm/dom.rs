use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ajax_core::{
    resolve_action, FieldValue, FilePart, FormFields, FormOptions, InterceptedForm, PageHost,
    SubmissionId, Submitter, TableContainer,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, File, FormData, HtmlDocument, HtmlElement, HtmlFormElement, Window};

struct Entry {
    form: HtmlFormElement,
    submitter: Option<HtmlElement>,
}

/// Live elements of the submissions currently running, keyed by id.
#[derive(Default)]
pub struct SubmissionRegistry {
    entries: RefCell<HashMap<SubmissionId, Entry>>,
}

impl SubmissionRegistry {
    pub fn insert(&self, id: SubmissionId, form: HtmlFormElement, submitter: Option<HtmlElement>) {
        self.entries
            .borrow_mut()
            .insert(id, Entry { form, submitter });
    }

    pub fn remove(&self, id: SubmissionId) {
        self.entries.borrow_mut().remove(&id);
    }

    pub fn form(&self, id: SubmissionId) -> Option<HtmlFormElement> {
        self.entries.borrow().get(&id).map(|entry| entry.form.clone())
    }

    pub fn submitter(&self, id: SubmissionId) -> Option<HtmlElement> {
        self.entries
            .borrow()
            .get(&id)
            .and_then(|entry| entry.submitter.clone())
    }
}

pub struct DomHost {
    window: Window,
    registry: Rc<SubmissionRegistry>,
}

impl DomHost {
    pub fn new(window: Window, registry: Rc<SubmissionRegistry>) -> Self {
        Self { window, registry }
    }
}

impl PageHost for DomHost {
    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn set_busy(&self, submission: SubmissionId, busy: bool) {
        let Some(submitter) = self.registry.submitter(submission) else {
            return;
        };

        let result = if busy {
            submitter
                .set_attribute("disabled", "")
                .and_then(|_| submitter.set_attribute("aria-busy", "true"))
        } else {
            submitter
                .remove_attribute("disabled")
                .and_then(|_| submitter.remove_attribute("aria-busy"))
        };

        if let Err(e) = result {
            warn!("Could not update submitter state: {:?}", e);
        }
    }

    fn reset_form(&self, submission: SubmissionId) {
        if let Some(form) = self.registry.form(submission) {
            form.reset();
        }
    }

    fn reload(&self) {
        if let Err(e) = self.window.location().reload() {
            warn!("Reload failed: {:?}", e);
        }
    }

    fn navigate(&self, url: &str) {
        if let Err(e) = self.window.location().assign(url) {
            warn!(url, "Navigation failed: {:?}", e);
        }
    }

    fn replace_document(&self, html: &str) {
        let Some(document) = self
            .window
            .document()
            .and_then(|document| document.dyn_into::<HtmlDocument>().ok())
        else {
            warn!("No HTML document to replace");
            return;
        };

        let written = document
            .open()
            .and_then(|_| document.write(&js_sys::Array::of1(&JsValue::from_str(html))))
            .and_then(|_| document.close());
        if let Err(e) = written {
            warn!("Could not replace document: {:?}", e);
        }
    }
}

pub struct DomTableContainer {
    element: Element,
}

impl DomTableContainer {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl TableContainer for DomTableContainer {
    fn replace_html(&self, html: &str) {
        self.element.set_inner_html(html);
    }
}

enum PendingValue {
    Text(String),
    File(File),
}

/// Form state captured synchronously inside the submit listener. File contents
/// are read afterwards by [`FormSnapshot::resolve`].
pub struct FormSnapshot {
    form: InterceptedForm,
    pending: Vec<(String, PendingValue)>,
}

impl FormSnapshot {
    /// `None` for `method="dialog"` forms, which never reach the network.
    pub fn capture(
        element: &HtmlFormElement,
        submitter: Option<&HtmlElement>,
    ) -> Result<Option<Self>, JsValue> {
        let method = submitter
            .and_then(|control| control.get_attribute("formmethod"))
            .unwrap_or_else(|| element.method());
        let Some(method) = InterceptedForm::parse_method(&method) else {
            return Ok(None);
        };

        let action = submitter
            .and_then(|control| control.get_attribute("formaction"))
            .filter(|action| !action.trim().is_empty())
            // Browsers resolve formaction against the document base, not the form action.
            .map(|action| resolve_action(element.base_uri().ok().flatten().as_deref(), &action))
            .unwrap_or_else(|| element.action());

        let options = FormOptions::from_attributes(|name| element.get_attribute(name));

        let mut pending = Vec::new();
        let data = FormData::new_with_form(element)?;
        if let Some(entries) = js_sys::try_iter(&data)? {
            for entry in entries {
                let pair = js_sys::Array::from(&entry?);
                let Some(name) = pair.get(0).as_string() else {
                    continue;
                };
                let value = pair.get(1);
                if let Some(text) = value.as_string() {
                    pending.push((name, PendingValue::Text(text)));
                } else if let Ok(file) = value.dyn_into::<File>() {
                    pending.push((name, PendingValue::File(file)));
                }
            }
        }

        let mut form = InterceptedForm::new(action, method).with_options(options);

        if let Some(control) = submitter {
            let name = control.get_attribute("name").filter(|name| !name.is_empty());
            let value = control.get_attribute("value");
            if let Some(name) = &name {
                pending.push((
                    name.clone(),
                    PendingValue::Text(value.clone().unwrap_or_default()),
                ));
            }
            form = form.with_submitter(Submitter { name, value });
        }

        Ok(Some(Self { form, pending }))
    }

    pub fn form(&self) -> &InterceptedForm {
        &self.form
    }

    /// Reads any selected files and returns the finished snapshot.
    pub async fn resolve(self) -> InterceptedForm {
        let Self { form, pending } = self;
        let mut fields = FormFields::new();

        for (name, value) in pending {
            match value {
                PendingValue::Text(text) => fields.push_text(name, text),
                PendingValue::File(file) => match read_file(&file).await {
                    Ok(part) => fields.push(name, FieldValue::File(part)),
                    Err(e) => warn!(field = %name, "Could not read file: {:?}", e),
                },
            }
        }

        debug!(fields = fields.len(), "Form snapshot resolved");
        form.with_fields(fields)
    }
}

async fn read_file(file: &File) -> Result<FilePart, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let content_type = Some(file.type_()).filter(|kind| !kind.is_empty());

    Ok(FilePart {
        file_name: file.name(),
        content_type,
        bytes,
    })
}
