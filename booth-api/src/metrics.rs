use axum::{extract::State, http::header, response::IntoResponse};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::{error::AppError, state::AppState};

pub struct Metrics {
    registry: Registry,
    pub orders_submitted: IntCounter,
    pub payment_checks: IntCounterVec,
    pub staff_calls: IntCounter,
    pub open_carts: IntGauge,
    pub open_payment_sessions: IntGauge,
    pub event_listeners: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let orders_submitted =
            IntCounter::new("booth_orders_submitted_total", "Direct orders sent upstream")?;
        let payment_checks = IntCounterVec::new(
            Opts::new("booth_payment_checks_total", "Payment status checks by outcome"),
            &["outcome"],
        )?;
        let staff_calls = IntCounter::new("booth_staff_calls_total", "Staff calls from tables")?;
        let open_carts = IntGauge::new("booth_open_carts", "Tables with a non-empty cart")?;
        let open_payment_sessions =
            IntGauge::new("booth_open_payment_sessions", "Pre-orders awaiting confirmation")?;
        let event_listeners =
            IntGauge::new("booth_event_listeners", "Connected table event streams")?;

        registry.register(Box::new(orders_submitted.clone()))?;
        registry.register(Box::new(payment_checks.clone()))?;
        registry.register(Box::new(staff_calls.clone()))?;
        registry.register(Box::new(open_carts.clone()))?;
        registry.register(Box::new(open_payment_sessions.clone()))?;
        registry.register(Box::new(event_listeners.clone()))?;

        Ok(Self {
            registry,
            orders_submitted,
            payment_checks,
            staff_calls,
            open_carts,
            open_payment_sessions,
            event_listeners,
        })
    }

    /// `outcome` is one of `completed`, `incomplete`, `error`.
    pub fn record_payment_check(&self, outcome: &str) {
        self.payment_checks.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let metrics = &state.metrics;
    metrics.open_carts.set(gauge_value(state.carts.table_count().await));
    metrics
        .open_payment_sessions
        .set(gauge_value(state.sessions.open_count().await));
    metrics.event_listeners.set(gauge_value(state.events.listener_count()));

    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

fn gauge_value(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_submitted.inc();
        metrics.record_payment_check("completed");
        metrics.record_payment_check("completed");

        let text = metrics.render().unwrap();
        assert!(text.contains("booth_orders_submitted_total 1"));
        assert!(text.contains("booth_payment_checks_total{outcome=\"completed\"} 2"));
    }
}
