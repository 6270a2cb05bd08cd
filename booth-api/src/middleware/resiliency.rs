use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: usize },
    Open { since: Instant },
    HalfOpen,
}

/// What a payment response says about the ordering API behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    UpstreamHealthy,
    UpstreamFailed,
    /// Our own fault; tells nothing about upstream.
    Neutral,
}

impl Verdict {
    pub fn of(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Verdict::UpstreamFailed
            }
            s if s.is_server_error() => Verdict::Neutral,
            _ => Verdict::UpstreamHealthy,
        }
    }
}

/// Fails payment calls fast once the ordering API keeps answering with
/// gateway errors. Client mistakes (4xx) never count against it.
pub struct PaymentCircuit {
    threshold: usize,
    cooldown: Duration,
    phase: Mutex<Phase>,
}

impl PaymentCircuit {
    pub fn new(threshold: usize, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        match *self.phase.lock().await {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen => CircuitState::HalfOpen,
        }
    }

    /// `Err` carries how long callers should wait before trying again.
    pub async fn admit(&self) -> Result<(), Duration> {
        let mut phase = self.phase.lock().await;
        if let Phase::Open { since } = *phase {
            let elapsed = since.elapsed();
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
            tracing::info!("Payment circuit half-open, letting a check through");
            *phase = Phase::HalfOpen;
        }
        Ok(())
    }

    pub async fn observe(&self, verdict: Verdict) {
        let mut phase = self.phase.lock().await;
        *phase = match (verdict, *phase) {
            (Verdict::Neutral, current) => current,
            (Verdict::UpstreamHealthy, Phase::HalfOpen) => {
                tracing::info!("Payment circuit closed again");
                Phase::Closed { failures: 0 }
            }
            (Verdict::UpstreamHealthy, Phase::Closed { .. }) => Phase::Closed { failures: 0 },
            (Verdict::UpstreamHealthy, open @ Phase::Open { .. }) => open,
            (Verdict::UpstreamFailed, Phase::Closed { failures }) if failures + 1 < self.threshold => {
                Phase::Closed {
                    failures: failures + 1,
                }
            }
            (Verdict::UpstreamFailed, _) => {
                tracing::error!(
                    "Payment circuit opened after repeated ordering API failures; pausing for {:?}",
                    self.cooldown
                );
                Phase::Open {
                    since: Instant::now(),
                }
            }
        };
    }
}

/// Guards the payment routes.
pub async fn circuit_breaker_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> impl IntoResponse {
    let circuit = &state.resiliency.payments;
    if let Err(wait) = circuit.admit().await {
        let retry_after = wait.as_secs().max(1).to_string();
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, retry_after)],
            Json(json!({ "error": "Payment service is temporarily unavailable" })),
        )
            .into_response();
    }

    let response = next.run(req).await;
    circuit.observe(Verdict::of(response.status())).await;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdicts() {
        assert_eq!(Verdict::of(StatusCode::OK), Verdict::UpstreamHealthy);
        assert_eq!(Verdict::of(StatusCode::BAD_REQUEST), Verdict::UpstreamHealthy);
        assert_eq!(Verdict::of(StatusCode::CONFLICT), Verdict::UpstreamHealthy);
        assert_eq!(Verdict::of(StatusCode::BAD_GATEWAY), Verdict::UpstreamFailed);
        assert_eq!(Verdict::of(StatusCode::INTERNAL_SERVER_ERROR), Verdict::Neutral);
    }

    #[tokio::test]
    async fn test_opens_and_recovers() {
        let circuit = PaymentCircuit::new(2, Duration::from_millis(20));
        assert!(circuit.admit().await.is_ok());

        circuit.observe(Verdict::UpstreamFailed).await;
        assert_eq!(circuit.state().await, CircuitState::Closed);
        circuit.observe(Verdict::UpstreamFailed).await;
        assert_eq!(circuit.state().await, CircuitState::Open);
        assert!(circuit.admit().await.is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(circuit.admit().await.is_ok());
        assert_eq!(circuit.state().await, CircuitState::HalfOpen);

        circuit.observe(Verdict::UpstreamHealthy).await;
        assert_eq!(circuit.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let circuit = PaymentCircuit::new(3, Duration::from_millis(10));
        for _ in 0..3 {
            circuit.observe(Verdict::UpstreamFailed).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(circuit.admit().await.is_ok());

        circuit.observe(Verdict::UpstreamFailed).await;
        assert_eq!(circuit.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_success_and_neutral_do_not_accumulate() {
        let circuit = PaymentCircuit::new(2, Duration::from_secs(30));
        circuit.observe(Verdict::UpstreamFailed).await;
        circuit.observe(Verdict::UpstreamHealthy).await;
        circuit.observe(Verdict::UpstreamFailed).await;
        circuit.observe(Verdict::Neutral).await;
        assert_eq!(circuit.state().await, CircuitState::Closed);
    }
}
