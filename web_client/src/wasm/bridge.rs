//! Re-dispatches lifecycle events as DOM `CustomEvent`s on the submitting form
//! so page scripts can observe them.
//!
//! `detail.form` and `detail.submitter` are the live elements; `submitter` is
//! `null` when the form was submitted without a button.
//!
//! Page scripts claim an event by setting `event.detail.handled = true` and
//! cancel it with `event.preventDefault()`. Both are read back after dispatch.

use std::rc::Rc;

use ajax_core::{AjaxEvent, EventBus, EventDetail};
use serde_json::{Map, Value};
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, HtmlElement, HtmlFormElement};

use super::dom::SubmissionRegistry;

const HANDLED_KEY: &str = "handled";

/// Must be installed after in-crate consumers so their claims are visible.
pub fn install(bus: &EventBus, registry: Rc<SubmissionRegistry>) {
    bus.subscribe_all(move |event| {
        let Some(form) = registry.form(event.form.id) else {
            return;
        };
        let submitter = registry.submitter(event.form.id);
        if let Err(e) = forward(&form, submitter.as_ref(), event) {
            warn!(event = %event.kind(), "Could not dispatch DOM event: {:?}", e);
        }
    });
}

fn forward(
    form: &HtmlFormElement,
    submitter: Option<&HtmlElement>,
    event: &mut AjaxEvent<'_>,
) -> Result<(), JsValue> {
    let kind = event.kind();
    let detail = detail_object(form, submitter, event)?;

    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(kind.is_cancelable());
    init.set_detail(&detail);
    let dom_event = CustomEvent::new_with_event_init_dict(kind.event_name(), &init)?;

    let proceed = form.dispatch_event(&dom_event)?;

    if js_sys::Reflect::get(&detail, &JsValue::from_str(HANDLED_KEY))?.as_bool() == Some(true) {
        event.mark_handled();
    }
    if !proceed || dom_event.default_prevented() {
        event.prevent_default();
    }
    Ok(())
}

fn detail_object(
    form: &HtmlFormElement,
    submitter: Option<&HtmlElement>,
    event: &AjaxEvent<'_>,
) -> Result<JsValue, JsValue> {
    let mut detail = Map::new();
    detail.insert(HANDLED_KEY.to_string(), Value::Bool(event.is_handled()));

    match &event.detail {
        EventDetail::Before | EventDetail::Complete => {}
        EventDetail::Success { response, payload } => {
            detail.insert("response".to_string(), to_value(response)?);
            detail.insert("payload".to_string(), to_value(payload)?);
        }
        EventDetail::Error {
            response,
            payload,
            message,
        } => {
            detail.insert("response".to_string(), to_value(response)?);
            detail.insert("payload".to_string(), to_value(payload)?);
            detail.insert("message".to_string(), to_value(message)?);
        }
        EventDetail::Html { response, html } => {
            detail.insert("response".to_string(), to_value(response)?);
            detail.insert("html".to_string(), Value::String(html.clone()));
        }
        EventDetail::Failure { error } => {
            detail.insert("error".to_string(), Value::String(error.clone()));
        }
    }

    let text = serde_json::to_string(&Value::Object(detail)).map_err(js_error)?;
    let object = js_sys::JSON::parse(&text)?;
    js_sys::Reflect::set(&object, &JsValue::from_str("form"), form)?;
    let submitter = submitter.map_or(JsValue::NULL, |element| JsValue::from(element.clone()));
    js_sys::Reflect::set(&object, &JsValue::from_str("submitter"), &submitter)?;
    Ok(object)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, JsValue> {
    serde_json::to_value(value).map_err(js_error)
}

fn js_error(e: serde_json::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}
