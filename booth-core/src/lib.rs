pub mod api;
pub mod payment;

pub use api::{ApiError, ApiResult, BoothApi};
pub use payment::{Bank, Device, Navigation, PaymentMethod, PaymentProvider};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Upstream call failed: {0}")]
    Upstream(#[from] ApiError),
}

pub type CoreResult<T> = Result<T, CoreError>;
