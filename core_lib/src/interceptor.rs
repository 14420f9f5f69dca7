//! Form submission interception: request, classification, lifecycle events and
//! default feedback.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::InterceptorConfig;
use crate::error::AjaxError;
use crate::events::{AjaxEvent, DispatchOutcome, EventBus, EventDetail};
use crate::feedback::{Feedback, FeedbackBanner};
use crate::host::{BusyGuard, PageHost};
use crate::models::{
    InterceptedForm, RawResponse, Redirect, RequestDescriptor, ResponseKind, ResponsePayload,
    SubmissionId,
};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The form opted out; the browser submits it natively.
    Skipped,
    Declined,
    Cancelled,
    Succeeded,
    Failed,
    InvalidResponse,
    Html,
    NetworkFailure,
}

impl SubmissionOutcome {
    pub fn reached_network(&self) -> bool {
        !matches!(
            self,
            SubmissionOutcome::Skipped | SubmissionOutcome::Declined | SubmissionOutcome::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Confirming,
    InFlight,
    Settled(SubmissionOutcome),
}

pub struct Interceptor {
    config: InterceptorConfig,
    bus: Rc<EventBus>,
    banner: FeedbackBanner,
    host: Rc<dyn PageHost>,
    transport: Rc<dyn Transport>,
    states: RefCell<HashMap<SubmissionId, SubmissionState>>,
}

impl Interceptor {
    pub fn new(
        config: InterceptorConfig,
        bus: Rc<EventBus>,
        banner: FeedbackBanner,
        host: Rc<dyn PageHost>,
        transport: Rc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            bus,
            banner,
            host,
            transport,
            states: RefCell::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Capability check run synchronously in the submit listener, before the
    /// native submission is suppressed.
    pub fn accepts(&self, form: &InterceptedForm) -> bool {
        form.options.intercept
    }

    pub fn state(&self, submission: SubmissionId) -> SubmissionState {
        self.states
            .borrow()
            .get(&submission)
            .copied()
            .unwrap_or(SubmissionState::Idle)
    }

    pub fn in_flight(&self) -> usize {
        self.states
            .borrow()
            .values()
            .filter(|state| **state == SubmissionState::InFlight)
            .count()
    }

    pub async fn submit(&self, form: InterceptedForm) -> SubmissionOutcome {
        let span = info_span!(
            "submission",
            id = %form.id,
            method = %form.method,
            action = %form.action
        );
        self.run(form).instrument(span).await
    }

    async fn run(&self, form: InterceptedForm) -> SubmissionOutcome {
        if !self.accepts(&form) {
            debug!("Form opted out of interception");
            return SubmissionOutcome::Skipped;
        }

        if let Some(prompt) = &form.options.confirm {
            self.enter(form.id, SubmissionState::Confirming);
            if !self.host.confirm(prompt) {
                debug!("Confirmation declined");
                self.leave(form.id);
                return SubmissionOutcome::Declined;
            }
        }

        let before = self.dispatch(&form, EventDetail::Before);
        if before.cancelled {
            debug!("Submission cancelled by a before listener");
            self.leave(form.id);
            return SubmissionOutcome::Cancelled;
        }

        self.enter(form.id, SubmissionState::InFlight);
        let guard = BusyGuard::acquire(Rc::clone(&self.host), form.id);
        let outcome = self.exchange(&form).await;
        guard.release();

        self.enter(form.id, SubmissionState::Settled(outcome));
        self.dispatch(&form, EventDetail::Complete);
        self.leave(form.id);

        info!(outcome = ?outcome, "Submission finished");
        outcome
    }

    async fn exchange(&self, form: &InterceptedForm) -> SubmissionOutcome {
        let request = match RequestDescriptor::from_form(form, &self.config.accept) {
            Ok(request) => request,
            Err(e) => return self.on_failure(form, e),
        };

        debug!(url = %request.url, "Request prepared");

        match self.transport.send(request).await {
            Ok(response) => self.on_response(form, response),
            Err(e) => self.on_failure(form, e),
        }
    }

    fn on_response(&self, form: &InterceptedForm, response: RawResponse) -> SubmissionOutcome {
        debug!(
            status = response.status.as_u16(),
            content_type = ?response.content_type,
            "Response received"
        );

        match response.kind() {
            ResponseKind::Json => self.on_json(form, response),
            ResponseKind::Html => self.on_html(form, response),
            ResponseKind::Other => self.on_text(form, response),
        }
    }

    fn on_json(&self, form: &InterceptedForm, response: RawResponse) -> SubmissionOutcome {
        let meta = response.meta();

        let payload = match ResponsePayload::parse(&response.body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Unparseable JSON response: {}", e);
                let message = self.config.invalid_response_message.clone();
                let outcome = self.dispatch(
                    form,
                    EventDetail::Error {
                        response: Some(meta),
                        payload: None,
                        message: Some(message.clone()),
                    },
                );
                if !outcome.handled {
                    self.notify(form, Feedback::error(message));
                }
                return SubmissionOutcome::InvalidResponse;
            }
        };

        if payload.is_success(response.status) {
            let outcome = self.dispatch(
                form,
                EventDetail::Success {
                    response: meta,
                    payload: payload.clone(),
                },
            );
            if !outcome.handled {
                let message = payload
                    .message()
                    .unwrap_or(&self.config.success_message);
                self.notify(form, Feedback::success(message).with_warning(payload.warning()));
                self.follow_redirect(&payload);
            }
            SubmissionOutcome::Succeeded
        } else {
            let message = payload
                .failure_message()
                .unwrap_or(&self.config.failure_message)
                .to_string();
            let outcome = self.dispatch(
                form,
                EventDetail::Error {
                    response: Some(meta),
                    payload: Some(payload.clone()),
                    message: Some(message.clone()),
                },
            );
            if !outcome.handled {
                self.notify(form, Feedback::error(message).with_warning(payload.warning()));
                // Failed responses may still carry a redirect, e.g. to a login page.
                self.follow_redirect(&payload);
            }
            SubmissionOutcome::Failed
        }
    }

    fn on_html(&self, form: &InterceptedForm, response: RawResponse) -> SubmissionOutcome {
        let outcome = self.dispatch(
            form,
            EventDetail::Html {
                response: response.meta(),
                html: response.body.clone(),
            },
        );
        if !outcome.handled {
            debug!("Replacing document with HTML response");
            self.host.replace_document(&response.body);
        }
        SubmissionOutcome::Html
    }

    fn on_text(&self, form: &InterceptedForm, response: RawResponse) -> SubmissionOutcome {
        let text = response.body.trim();
        let message = if text.is_empty() {
            self.config.failure_message.clone()
        } else {
            text.to_string()
        };

        let outcome = self.dispatch(
            form,
            EventDetail::Error {
                response: Some(response.meta()),
                payload: None,
                message: Some(message.clone()),
            },
        );
        if !outcome.handled {
            self.notify(form, Feedback::error(message));
        }
        SubmissionOutcome::Failed
    }

    fn on_failure(&self, form: &InterceptedForm, err: AjaxError) -> SubmissionOutcome {
        error!("Request failed: {}", err);
        let outcome = self.dispatch(
            form,
            EventDetail::Failure {
                error: err.to_string(),
            },
        );
        if !outcome.handled {
            self.notify(form, Feedback::error(self.config.network_error_message.clone()));
        }
        SubmissionOutcome::NetworkFailure
    }

    fn dispatch(&self, form: &InterceptedForm, detail: EventDetail) -> DispatchOutcome {
        let mut event = AjaxEvent::new(form, detail);
        self.bus.dispatch(&mut event)
    }

    fn notify(&self, form: &InterceptedForm, feedback: Feedback) {
        if form.options.silent {
            debug!("Silent form, default feedback suppressed");
            return;
        }
        self.banner.show(feedback);
    }

    fn follow_redirect(&self, payload: &ResponsePayload) {
        match payload.redirect() {
            Some(Redirect::Reload) => {
                info!("Reloading page");
                self.host.reload();
            }
            Some(Redirect::Navigate(url)) => {
                info!(url = %url, "Navigating");
                self.host.navigate(&url);
            }
            None => {}
        }
    }

    fn enter(&self, submission: SubmissionId, state: SubmissionState) {
        debug!(?state, "Submission state changed");
        self.states.borrow_mut().insert(submission, state);
    }

    fn leave(&self, submission: SubmissionId) {
        self.states.borrow_mut().remove(&submission);
    }
}
