pub mod settings;

pub use settings::{AppConfig, InterceptorConfig, LoggingConfig, SchedulerConfig};
