//! Page-side operations the interceptor needs from its environment

use std::rc::Rc;
use tracing::trace;

use crate::models::SubmissionId;

/// The page hosting intercepted forms. Submissions are addressed by id; the host
/// maps the id to its live form element and submitting control.
pub trait PageHost {
    /// Blocking confirmation prompt. `true` when the user accepts.
    fn confirm(&self, message: &str) -> bool;

    /// Toggles the disabled/busy marker on the submitting control. Must be
    /// idempotent and a no-op when the submission has no submitter.
    fn set_busy(&self, submission: SubmissionId, busy: bool);

    /// Restores the form's fields to their initial values.
    fn reset_form(&self, submission: SubmissionId);

    fn reload(&self);

    fn navigate(&self, url: &str);

    /// Replaces the whole document with `html`.
    fn replace_document(&self, html: &str);
}

/// Holds the submitting control disabled until dropped.
pub struct BusyGuard {
    host: Rc<dyn PageHost>,
    submission: SubmissionId,
    released: bool,
}

impl BusyGuard {
    pub fn acquire(host: Rc<dyn PageHost>, submission: SubmissionId) -> Self {
        trace!(%submission, "Submitter marked busy");
        host.set_busy(submission, true);
        Self {
            host,
            submission,
            released: false,
        }
    }

    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if !self.released {
            self.released = true;
            self.host.set_busy(self.submission, false);
            trace!(submission = %self.submission, "Submitter restored");
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
