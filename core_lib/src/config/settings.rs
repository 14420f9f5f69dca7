use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub interceptor: InterceptorConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptorConfig {
    pub accept: String,
    pub banner_element_id: String,
    pub banner_timeout_ms: u64,
    pub success_message: String,
    pub failure_message: String,
    pub invalid_response_message: String,
    pub network_error_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub container_id: String,
    pub banner_element_id: String,
    pub create_endpoint: String,
    pub delete_endpoint: String,
    pub id_field: String,
    pub success_message: String,
    pub failure_message: String,
    pub empty_message: String,
    pub pending_label: String,
    pub delete_label: String,
    pub delete_confirm: String,
    pub video_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            accept: "application/json, text/html;q=0.9, */*;q=0.8".to_string(),
            banner_element_id: "ajax-feedback".to_string(),
            banner_timeout_ms: 6000,
            success_message: "Operation completed successfully.".to_string(),
            failure_message: "The request could not be completed.".to_string(),
            invalid_response_message: "Invalid response from server.".to_string(),
            network_error_message: "Network error. Check your connection and try again."
                .to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            container_id: "scheduled-posts".to_string(),
            banner_element_id: "scheduler-feedback".to_string(),
            create_endpoint: "/scheduler".to_string(),
            delete_endpoint: "/scheduler/delete".to_string(),
            id_field: "post_id".to_string(),
            success_message: "Schedule updated successfully.".to_string(),
            failure_message: "The scheduling request failed.".to_string(),
            empty_message: "No posts have been scheduled yet.".to_string(),
            pending_label: "pending".to_string(),
            delete_label: "Delete".to_string(),
            delete_confirm: "Delete this scheduled post?".to_string(),
            video_label: "View video".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl InterceptorConfig {
    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }
}

impl AppConfig {
    /// Layers defaults, an optional inline JSON document (usually embedded in the
    /// page), `config.toml` when present and `APP_*` environment variables.
    pub fn load_with(inline_json: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if let Some(json) = inline_json.filter(|json| !json.trim().is_empty()) {
            builder = builder.add_source(File::from_str(json, FileFormat::Json));
        }

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interceptor.banner_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Banner timeout must be greater than 0".to_string(),
            ));
        }

        if self.interceptor.accept.trim().is_empty() {
            return Err(ConfigError::Message(
                "Accept header cannot be empty".to_string(),
            ));
        }

        if self.interceptor.banner_element_id.is_empty()
            || self.scheduler.banner_element_id.is_empty()
        {
            return Err(ConfigError::Message(
                "Banner element ids cannot be empty".to_string(),
            ));
        }

        for endpoint in [&self.scheduler.create_endpoint, &self.scheduler.delete_endpoint] {
            if !endpoint.starts_with('/') {
                return Err(ConfigError::Message(format!(
                    "Scheduler endpoint must be an absolute path: {}",
                    endpoint
                )));
            }
        }

        if self.scheduler.create_endpoint == self.scheduler.delete_endpoint {
            return Err(ConfigError::Message(
                "Scheduler create and delete endpoints must differ".to_string(),
            ));
        }

        if self.scheduler.id_field.trim().is_empty() {
            return Err(ConfigError::Message(
                "Scheduler id field cannot be empty".to_string(),
            ));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            tracing::warn!("Unrecognized log level '{}', filters may not apply", self.logging.level);
        }

        Ok(())
    }
}
