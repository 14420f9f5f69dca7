use std::time::Duration;

use ajax_core::{BannerView, Feedback, TimerHandle, TimerScheduler};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

const BASE_CLASS: &str = "ajax-feedback";

/// Banner region backed by a DOM element, created on first use when the page
/// does not provide one.
pub struct DomBannerView {
    document: Document,
    element_id: String,
    anchor: Option<Element>,
}

impl DomBannerView {
    pub fn new(document: Document, element_id: impl Into<String>) -> Self {
        Self {
            document,
            element_id: element_id.into(),
            anchor: None,
        }
    }

    /// Inserts a created region directly before `anchor` instead of at the top
    /// of the body.
    pub fn near(mut self, anchor: Option<Element>) -> Self {
        self.anchor = anchor;
        self
    }

    fn element(&self) -> Result<Element, JsValue> {
        if let Some(existing) = self.document.get_element_by_id(&self.element_id) {
            return Ok(existing);
        }

        let region = self.document.create_element("div")?;
        region.set_id(&self.element_id);
        region.set_attribute("role", "status")?;
        region.set_attribute("aria-live", "polite")?;
        region.set_class_name(BASE_CLASS);

        let anchored = self
            .anchor
            .as_ref()
            .and_then(|anchor| anchor.parent_node().map(|parent| (parent, anchor)));

        if let Some((parent, anchor)) = anchored {
            parent.insert_before(&region, Some(anchor.as_ref()))?;
        } else {
            let body = self
                .document
                .body()
                .ok_or_else(|| JsValue::from_str("document has no body"))?;
            body.insert_before(&region, body.first_child().as_ref())?;
        }
        Ok(region)
    }

    fn fill(&self, feedback: &Feedback) -> Result<(), JsValue> {
        let region = self.element()?;
        region.set_class_name(&format!(
            "{} {}--{}",
            BASE_CLASS,
            BASE_CLASS,
            feedback.kind.as_str()
        ));
        region.set_text_content(None);

        let message = self.document.create_element("span")?;
        message.set_class_name(&format!("{}__message", BASE_CLASS));
        message.set_text_content(Some(&feedback.message));
        region.append_child(&message)?;

        if let Some(warning) = &feedback.warning {
            let note = self.document.create_element("small")?;
            note.set_class_name(&format!("{}__warning", BASE_CLASS));
            note.set_text_content(Some(warning));
            region.append_child(&note)?;
        }

        region.remove_attribute("hidden")
    }
}

impl BannerView for DomBannerView {
    fn render(&self, feedback: &Feedback) {
        if let Err(e) = self.fill(feedback) {
            warn!(id = %self.element_id, "Could not render feedback: {:?}", e);
        }
    }

    fn clear(&self) {
        if let Some(region) = self.document.get_element_by_id(&self.element_id) {
            region.set_text_content(None);
            region.set_class_name(BASE_CLASS);
            if let Err(e) = region.set_attribute("hidden", "") {
                warn!(id = %self.element_id, "Could not hide feedback: {:?}", e);
            }
        }
    }
}

/// `setTimeout` based timers.
pub struct WindowTimers {
    window: Window,
}

impl WindowTimers {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TimerScheduler for WindowTimers {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        let callback = Closure::once_into_js(move || callback());

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            Ok(id) => TimerHandle(i64::from(id)),
            Err(e) => {
                warn!("setTimeout failed: {:?}", e);
                TimerHandle(-1)
            }
        }
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Ok(id) = i32::try_from(handle.0) {
            if id >= 0 {
                self.window.clear_timeout_with_handle(id);
            }
        }
    }
}
