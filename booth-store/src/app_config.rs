use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub resiliency: ResiliencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 { 10 }

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Pause between "I paid" and the single status check.
    pub confirm_delay_ms: u64,
    /// Pause on the provider return path before checking.
    pub result_delay_ms: u64,
    pub session_ttl_seconds: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            confirm_delay_ms: 5000,
            result_delay_ms: 2000,
            session_ttl_seconds: 1800,
        }
    }
}

impl PaymentConfig {
    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    pub fn result_delay(&self) -> Duration {
        Duration::from_millis(self.result_delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    pub payment_webhook_url: Option<String>,
    pub staff_webhook_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResiliencyConfig {
    pub failure_threshold: usize,
    pub reset_timeout_seconds: u64,
}

impl Default for ResiliencyConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `BOOTH__UPSTREAM__BASE_URL=http://...`
            .add_source(config::Environment::with_prefix("BOOTH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080
                [upstream]
                base_url = "http://localhost:8000/api"
                [auth]
                jwt_secret = "secret"
                jwt_expiration_seconds = 3600
                [admin]
                username = "admin"
                password = "pw"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: Config = s.try_deserialize().unwrap();

        assert_eq!(cfg.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.payment.confirm_delay(), Duration::from_millis(5000));
        assert_eq!(cfg.payment.result_delay_ms, 2000);
        assert_eq!(cfg.resiliency.failure_threshold, 5);
        assert!(cfg.notify.staff_webhook_url.is_none());
    }
}
