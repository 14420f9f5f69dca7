use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::debug;

use crate::feedback::timer::{TimerHandle, TimerScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Error,
    Warning,
    Info,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Success => "success",
            FeedbackKind::Error => "error",
            FeedbackKind::Warning => "warning",
            FeedbackKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub warning: Option<String>,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            warning: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Error, message)
    }

    pub fn with_warning(mut self, warning: Option<&str>) -> Self {
        self.warning = warning
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self
    }
}

/// Rendering surface for a banner region.
pub trait BannerView {
    fn render(&self, feedback: &Feedback);

    fn clear(&self);
}

#[derive(Default)]
struct BannerState {
    current: Option<Feedback>,
    pending: Option<TimerHandle>,
    generation: u64,
}

struct BannerInner {
    view: Rc<dyn BannerView>,
    timers: Rc<dyn TimerScheduler>,
    delay: Duration,
    state: RefCell<BannerState>,
}

/// Transient status region. At most one auto-clear timer is pending; showing new
/// feedback cancels it before arming the next one.
#[derive(Clone)]
pub struct FeedbackBanner {
    inner: Rc<BannerInner>,
}

impl FeedbackBanner {
    pub fn new(view: Rc<dyn BannerView>, timers: Rc<dyn TimerScheduler>, delay: Duration) -> Self {
        Self {
            inner: Rc::new(BannerInner {
                view,
                timers,
                delay,
                state: RefCell::new(BannerState::default()),
            }),
        }
    }

    pub fn show(&self, feedback: Feedback) {
        let (previous, generation) = {
            let mut state = self.inner.state.borrow_mut();
            state.generation += 1;
            state.current = Some(feedback.clone());
            (state.pending.take(), state.generation)
        };

        if let Some(handle) = previous {
            self.inner.timers.cancel(handle);
        }

        debug!(kind = feedback.kind.as_str(), "Showing feedback: {}", feedback.message);
        self.inner.view.render(&feedback);

        let weak: Weak<BannerInner> = Rc::downgrade(&self.inner);
        let handle = self.inner.timers.schedule(
            self.inner.delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.expire(generation);
                }
            }),
        );

        let mut state = self.inner.state.borrow_mut();
        if state.generation == generation {
            state.pending = Some(handle);
        }
    }

    pub fn clear(&self) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            state.generation += 1;
            state.current = None;
            state.pending.take()
        };

        if let Some(handle) = previous {
            self.inner.timers.cancel(handle);
        }
        self.inner.view.clear();
    }

    pub fn current(&self) -> Option<Feedback> {
        self.inner.state.borrow().current.clone()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.inner.state.borrow().pending.is_some()
    }
}

impl BannerInner {
    fn expire(&self, generation: u64) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return;
            }
            state.current = None;
            state.pending = None;
        }
        debug!("Feedback expired");
        self.view.clear();
    }
}
