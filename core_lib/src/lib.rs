//! Core of the admin panel's AJAX layer: form interception, the lifecycle event
//! bus, feedback banners and the scheduled-posts table consumer.
//!
//! Everything here is host-agnostic. The browser binding lives in `web_client`
//! and supplies the [`PageHost`], [`BannerView`], [`TimerScheduler`] and
//! [`TableContainer`] implementations.

pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod host;
pub mod interceptor;
pub mod models;
pub mod scheduler;
pub mod transport;

pub use config::{AppConfig, InterceptorConfig, LoggingConfig, SchedulerConfig};
pub use error::{AjaxError, Result};
pub use events::{AjaxEvent, DispatchOutcome, EventBus, EventDetail, EventKind, ListenerId};
pub use feedback::{BannerView, Feedback, FeedbackBanner, FeedbackKind, TimerHandle, TimerScheduler};
pub use host::{BusyGuard, PageHost};
pub use interceptor::{Interceptor, SubmissionOutcome, SubmissionState};
pub use models::{
    resolve_action, FieldValue, FilePart, FormFields, FormOptions, InterceptedForm, PostId,
    RawResponse, Redirect, RequestDescriptor, ResponseKind, ResponseMeta, ResponsePayload,
    ScheduledPost, SubmissionId, Submitter,
};
pub use scheduler::{render_posts, SchedulerAction, SchedulerTable, TableContainer};
pub use transport::{HttpTransport, Transport};

use std::rc::Rc;

/// Everything wired for one page.
pub struct AjaxApp {
    pub config: AppConfig,
    pub bus: Rc<EventBus>,
    pub interceptor: Rc<Interceptor>,
    pub scheduler: Option<Rc<SchedulerTable>>,
}

/// Host-side pieces the app is assembled from.
pub struct PageParts {
    pub host: Rc<dyn PageHost>,
    pub transport: Rc<dyn Transport>,
    pub timers: Rc<dyn TimerScheduler>,
    pub banner_view: Rc<dyn BannerView>,
    pub scheduler_banner_view: Rc<dyn BannerView>,
    pub table_container: Option<Rc<dyn TableContainer>>,
}

impl AjaxApp {
    pub fn new(config: AppConfig, parts: PageParts) -> Self {
        let bus = Rc::new(EventBus::new());
        let delay = config.interceptor.banner_timeout();

        // Mounted first so its listeners claim scheduler events before any other.
        let scheduler = SchedulerTable::mount(
            config.scheduler.clone(),
            parts.table_container,
            FeedbackBanner::new(parts.scheduler_banner_view, Rc::clone(&parts.timers), delay),
            Rc::clone(&parts.host),
            &bus,
        );

        let banner = FeedbackBanner::new(parts.banner_view, parts.timers, delay);
        let interceptor = Rc::new(Interceptor::new(
            config.interceptor.clone(),
            Rc::clone(&bus),
            banner,
            parts.host,
            parts.transport,
        ));

        Self {
            config,
            bus,
            interceptor,
            scheduler,
        }
    }
}
