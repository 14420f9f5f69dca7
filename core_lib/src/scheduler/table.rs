use std::rc::Rc;
use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::events::{AjaxEvent, EventBus, EventKind};
use crate::feedback::{Feedback, FeedbackBanner};
use crate::host::PageHost;
use crate::models::{InterceptedForm, ScheduledPost};
use crate::scheduler::render::render_posts;

pub const POSTS_KEY: &str = "posts";

/// Element whose content is replaced by each render.
pub trait TableContainer {
    fn replace_html(&self, html: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    Create,
    Delete,
}

/// Keeps the scheduled-posts table in sync after create/delete submissions.
pub struct SchedulerTable {
    config: SchedulerConfig,
    container: Rc<dyn TableContainer>,
    banner: FeedbackBanner,
    host: Rc<dyn PageHost>,
}

impl SchedulerTable {
    /// Subscribes to `success` and `error`. Returns `None`, attaching nothing,
    /// when the page has no table container.
    pub fn mount(
        config: SchedulerConfig,
        container: Option<Rc<dyn TableContainer>>,
        banner: FeedbackBanner,
        host: Rc<dyn PageHost>,
        bus: &EventBus,
    ) -> Option<Rc<Self>> {
        let Some(container) = container else {
            debug!("No scheduled-posts container on page");
            return None;
        };

        let table = Rc::new(Self {
            config,
            container,
            banner,
            host,
        });

        let listener = Rc::clone(&table);
        bus.subscribe(EventKind::Success, move |event| listener.on_success(event));
        let listener = Rc::clone(&table);
        bus.subscribe(EventKind::Error, move |event| listener.on_error(event));

        info!("Scheduled-posts table mounted");
        Some(table)
    }

    pub fn action_for(&self, form: &InterceptedForm) -> Option<SchedulerAction> {
        let path = form.action_path();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        if path.ends_with(self.config.delete_endpoint.as_str()) {
            Some(SchedulerAction::Delete)
        } else if path.ends_with(self.config.create_endpoint.as_str()) {
            Some(SchedulerAction::Create)
        } else {
            None
        }
    }

    pub fn render(&self, posts: &[ScheduledPost]) {
        self.container.replace_html(&render_posts(posts, &self.config));
    }

    fn on_success(&self, event: &mut AjaxEvent<'_>) {
        if event.is_handled() {
            return;
        }
        let Some(action) = self.action_for(event.form) else {
            return;
        };
        let Some(payload) = event.payload() else {
            return;
        };

        if let Some(values) = payload.list(POSTS_KEY) {
            let posts = ScheduledPost::from_values(values);
            info!(count = posts.len(), ?action, "Re-rendering scheduled posts");
            self.render(&posts);
        }

        let message = payload
            .message()
            .unwrap_or(&self.config.success_message)
            .to_string();
        self.banner
            .show(Feedback::success(message).with_warning(payload.warning()));

        if action == SchedulerAction::Create {
            self.host.reset_form(event.form.id);
        }

        event.mark_handled();
    }

    fn on_error(&self, event: &mut AjaxEvent<'_>) {
        if event.is_handled() || self.action_for(event.form).is_none() {
            return;
        }

        let payload = event.payload();
        let message = event
            .message()
            .filter(|message| !message.trim().is_empty())
            .or_else(|| payload.and_then(|payload| payload.error()))
            .unwrap_or(&self.config.failure_message)
            .to_string();
        let warning = payload.and_then(|payload| payload.warning()).map(str::to_string);

        self.banner
            .show(Feedback::error(message).with_warning(warning.as_deref()));
        event.mark_handled();
    }
}
