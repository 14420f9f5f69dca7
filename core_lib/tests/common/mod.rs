#![allow(dead_code)]

use ajax_core::{
    AjaxApp, AjaxError, AppConfig, BannerView, EventBus, EventKind, Feedback, PageHost, PageParts,
    RawResponse, RequestDescriptor, Result, SubmissionId, TableContainer, TimerHandle,
    TimerScheduler, Transport,
};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

pub struct FakeHost {
    pub confirm_answer: Cell<bool>,
    pub prompts: RefCell<Vec<String>>,
    pub busy: RefCell<HashMap<SubmissionId, bool>>,
    pub busy_log: RefCell<Vec<(SubmissionId, bool)>>,
    pub resets: RefCell<Vec<SubmissionId>>,
    pub reloads: Cell<usize>,
    pub navigations: RefCell<Vec<String>>,
    pub documents: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            confirm_answer: Cell::new(true),
            prompts: RefCell::new(Vec::new()),
            busy: RefCell::new(HashMap::new()),
            busy_log: RefCell::new(Vec::new()),
            resets: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
            navigations: RefCell::new(Vec::new()),
            documents: RefCell::new(Vec::new()),
        }
    }

    pub fn is_busy(&self, submission: SubmissionId) -> bool {
        self.busy.borrow().get(&submission).copied().unwrap_or(false)
    }
}

impl PageHost for FakeHost {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }

    fn set_busy(&self, submission: SubmissionId, busy: bool) {
        self.busy.borrow_mut().insert(submission, busy);
        self.busy_log.borrow_mut().push((submission, busy));
    }

    fn reset_form(&self, submission: SubmissionId) {
        self.resets.borrow_mut().push(submission);
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn replace_document(&self, html: &str) {
        self.documents.borrow_mut().push(html.to_string());
    }
}

#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<RawResponse>>>,
    pub requests: RefCell<Vec<RequestDescriptor>>,
}

impl MockTransport {
    pub fn respond(&self, response: RawResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(AjaxError::Transport(message.to_string())));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> RequestDescriptor {
        self.requests.borrow().last().cloned().expect("no request sent")
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(AjaxError::Transport("no response queued".to_string())))
    }
}

#[derive(Default)]
pub struct ManualTimers {
    next: Cell<i64>,
    now: Cell<u64>,
    pending: RefCell<Vec<(TimerHandle, u64, Box<dyn FnOnce()>)>>,
}

impl ManualTimers {
    pub fn advance(&self, by: Duration) {
        let now = self.now.get() + by.as_millis() as u64;
        self.now.set(now);
        let due: Vec<_> = {
            let mut pending = self.pending.borrow_mut();
            let (due, rest): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|(_, at, _)| *at <= now);
            *pending = rest;
            due
        };
        for (_, _, callback) in due {
            callback();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl TimerScheduler for ManualTimers {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle(self.next.get());
        self.next.set(handle.0 + 1);
        let at = self.now.get() + delay.as_millis() as u64;
        self.pending.borrow_mut().push((handle, at, callback));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.pending.borrow_mut().retain(|(h, _, _)| *h != handle);
    }
}

#[derive(Default)]
pub struct RecordingView {
    pub shown: RefCell<Option<Feedback>>,
    pub renders: Cell<usize>,
}

impl RecordingView {
    pub fn message(&self) -> Option<String> {
        self.shown.borrow().as_ref().map(|feedback| feedback.message.clone())
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.shown.borrow().clone()
    }
}

impl BannerView for RecordingView {
    fn render(&self, feedback: &Feedback) {
        *self.shown.borrow_mut() = Some(feedback.clone());
        self.renders.set(self.renders.get() + 1);
    }

    fn clear(&self) {
        *self.shown.borrow_mut() = None;
    }
}

#[derive(Default)]
pub struct RecordingContainer {
    pub html: RefCell<Option<String>>,
    pub replacements: Cell<usize>,
}

impl RecordingContainer {
    pub fn html(&self) -> String {
        self.html.borrow().clone().unwrap_or_default()
    }
}

impl TableContainer for RecordingContainer {
    fn replace_html(&self, html: &str) {
        *self.html.borrow_mut() = Some(html.to_string());
        self.replacements.set(self.replacements.get() + 1);
    }
}

pub struct Harness {
    pub app: AjaxApp,
    pub host: Rc<FakeHost>,
    pub transport: Rc<MockTransport>,
    pub timers: Rc<ManualTimers>,
    pub banner: Rc<RecordingView>,
    pub scheduler_banner: Rc<RecordingView>,
    pub container: Rc<RecordingContainer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(true)
    }

    pub fn without_table() -> Self {
        Self::build(false)
    }

    fn build(with_table: bool) -> Self {
        let host = Rc::new(FakeHost::new());
        let transport = Rc::new(MockTransport::default());
        let timers = Rc::new(ManualTimers::default());
        let banner = Rc::new(RecordingView::default());
        let scheduler_banner = Rc::new(RecordingView::default());
        let container = Rc::new(RecordingContainer::default());

        let table_container: Option<Rc<dyn TableContainer>> = if with_table {
            Some(container.clone())
        } else {
            None
        };

        let app = AjaxApp::new(
            AppConfig::default(),
            PageParts {
                host: host.clone(),
                transport: transport.clone(),
                timers: timers.clone(),
                banner_view: banner.clone(),
                scheduler_banner_view: scheduler_banner.clone(),
                table_container,
            },
        );

        Self {
            app,
            host,
            transport,
            timers,
            banner,
            scheduler_banner,
            container,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.app.bus
    }

    /// Records the kind of every event dispatched from now on.
    pub fn record_events(&self) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        self.app
            .bus
            .subscribe_all(move |event| sink.borrow_mut().push(event.kind()));
        seen
    }
}
