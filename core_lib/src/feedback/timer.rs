use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i64);

/// One-shot timers on the page's event loop.
pub trait TimerScheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle;

    fn cancel(&self, handle: TimerHandle);
}
