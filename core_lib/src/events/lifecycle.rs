use crate::models::{InterceptedForm, ResponseMeta, ResponsePayload};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Before,
    Success,
    Error,
    Html,
    Failure,
    Complete,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Before,
        EventKind::Success,
        EventKind::Error,
        EventKind::Html,
        EventKind::Failure,
        EventKind::Complete,
    ];

    /// DOM event name, e.g. `ajax:success`.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventKind::Before => "ajax:before",
            EventKind::Success => "ajax:success",
            EventKind::Error => "ajax:error",
            EventKind::Html => "ajax:html",
            EventKind::Failure => "ajax:failure",
            EventKind::Complete => "ajax:complete",
        }
    }

    pub fn is_cancelable(&self) -> bool {
        !matches!(self, EventKind::Complete)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Clone)]
pub enum EventDetail {
    Before,
    Success {
        response: ResponseMeta,
        payload: ResponsePayload,
    },
    Error {
        response: Option<ResponseMeta>,
        payload: Option<ResponsePayload>,
        message: Option<String>,
    },
    Html {
        response: ResponseMeta,
        html: String,
    },
    Failure {
        error: String,
    },
    Complete,
}

impl EventDetail {
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetail::Before => EventKind::Before,
            EventDetail::Success { .. } => EventKind::Success,
            EventDetail::Error { .. } => EventKind::Error,
            EventDetail::Html { .. } => EventKind::Html,
            EventDetail::Failure { .. } => EventKind::Failure,
            EventDetail::Complete => EventKind::Complete,
        }
    }
}

/// One lifecycle signal for a submission.
///
/// Listeners claim the event with [`AjaxEvent::mark_handled`], which suppresses the
/// interceptor's default behaviour for it, or call [`AjaxEvent::prevent_default`]
/// to cancel. Cancelling `before` aborts the submission.
#[derive(Debug)]
pub struct AjaxEvent<'a> {
    pub form: &'a InterceptedForm,
    pub detail: EventDetail,
    handled: bool,
    default_prevented: bool,
}

impl<'a> AjaxEvent<'a> {
    pub fn new(form: &'a InterceptedForm, detail: EventDetail) -> Self {
        Self {
            form,
            detail,
            handled: false,
            default_prevented: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.detail.kind()
    }

    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// No effect on `complete`, which is not cancelable.
    pub fn prevent_default(&mut self) {
        if self.kind().is_cancelable() {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn payload(&self) -> Option<&ResponsePayload> {
        match &self.detail {
            EventDetail::Success { payload, .. } => Some(payload),
            EventDetail::Error { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::Error { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
