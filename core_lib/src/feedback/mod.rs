pub mod banner;
pub mod timer;


pub use banner::{BannerView, Feedback, FeedbackBanner, FeedbackKind};
pub use timer::{TimerHandle, TimerScheduler};
