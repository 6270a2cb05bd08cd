pub mod auth;
pub mod resiliency;

pub use auth::{admin_auth_middleware, AdminClaims, ADMIN_ROLE};
pub use resiliency::{circuit_breaker_middleware, CircuitState, PaymentCircuit, Verdict};
