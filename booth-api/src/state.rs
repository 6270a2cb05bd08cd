use std::sync::Arc;
use std::time::Duration;

use booth_core::BoothApi;
use booth_store::app_config::{Config, PaymentConfig};
use booth_store::{CartStore, DiscordNotifier, EventBus, SessionStore};

use crate::metrics::Metrics;
use crate::middleware::resiliency::PaymentCircuit;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

pub struct ResiliencyState {
    pub payments: PaymentCircuit,
}

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn BoothApi>,
    pub carts: CartStore,
    pub sessions: SessionStore,
    pub events: EventBus,
    pub notifier: DiscordNotifier,
    pub metrics: Arc<Metrics>,
    pub resiliency: Arc<ResiliencyState>,
    pub auth: AuthConfig,
    pub admin: AdminCredentials,
    pub payment: PaymentConfig,
}

impl AppState {
    pub fn new(api: Arc<dyn BoothApi>, config: &Config) -> Result<Self, prometheus::Error> {
        Ok(Self {
            api,
            carts: CartStore::new(),
            sessions: SessionStore::new(),
            events: EventBus::new(),
            notifier: DiscordNotifier::new(&config.notify),
            metrics: Arc::new(Metrics::new()?),
            resiliency: Arc::new(ResiliencyState {
                payments: PaymentCircuit::new(
                    config.resiliency.failure_threshold,
                    Duration::from_secs(config.resiliency.reset_timeout_seconds),
                ),
            }),
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
            },
            admin: AdminCredentials {
                username: config.admin.username.clone(),
                password: config.admin.password.clone(),
            },
            payment: config.payment.clone(),
        })
    }
}
