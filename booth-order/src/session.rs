use booth_core::{Device, Navigation, PaymentProvider};
use booth_shared::pii::Masked;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::cart::CartItem;

/// Longest a status check may stay in flight before the sweeper may drop the
/// session anyway.
pub const CHECK_TIMEOUT_SECS: i64 = 120;

/// Where a pre-order stands on the confirmation screen.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Redirect handed out; waiting for the payer to report back.
    AwaitingConfirmation,
    /// A status check is in flight.
    Checking,
    Completed,
    /// Upstream did not see the payment yet.
    Incomplete,
}

/// Outcome of asking to start a status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStart {
    Started,
    AlreadyCompleted,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Payment session not found: {0}")]
    NotFound(String),

    #[error("Payment check already in progress for order {0}")]
    AlreadyChecking(String),

    #[error("Invalid payment session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },

    #[error("Invalid payment redirect: {0}")]
    InvalidRedirect(String),
}

/// One pre-order's confirmation handshake.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub order_id: String,
    pub table_id: String,
    pub payer_name: Masked<String>,
    pub total_amount: i64,
    pub redirect_url: String,
    pub provider: PaymentProvider,
    /// Cart lines as they were when the pre-order was placed.
    pub items: Vec<CartItem>,
    pub state: SessionState,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentSession {
    pub fn open(
        table_id: &str,
        order_id: &str,
        payer_name: &str,
        total_amount: i64,
        redirect_url: &str,
        items: Vec<CartItem>,
    ) -> Result<Self, SessionError> {
        let provider = PaymentProvider::classify(redirect_url)
            .map_err(|e| SessionError::InvalidRedirect(e.to_string()))?;
        let now = Utc::now();

        Ok(Self {
            order_id: order_id.to_string(),
            table_id: table_id.to_string(),
            payer_name: Masked(payer_name.to_string()),
            total_amount,
            redirect_url: redirect_url.trim().to_string(),
            provider,
            items,
            state: SessionState::AwaitingConfirmation,
            attempts: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn navigation(&self, device: Device) -> Navigation {
        Navigation::plan(self.provider, device, &self.redirect_url)
    }

    /// AwaitingConfirmation | Incomplete → Checking.
    pub fn begin_check(&mut self) -> Result<CheckStart, SessionError> {
        match self.state {
            SessionState::Checking => Err(SessionError::AlreadyChecking(self.order_id.clone())),
            SessionState::Completed => Ok(CheckStart::AlreadyCompleted),
            SessionState::AwaitingConfirmation | SessionState::Incomplete => {
                self.attempts += 1;
                self.transition(SessionState::Checking);
                Ok(CheckStart::Started)
            }
        }
    }

    /// Checking → Completed | Incomplete.
    pub fn finish_check(&mut self, payment_completed: bool) -> Result<SessionState, SessionError> {
        let next = if payment_completed {
            SessionState::Completed
        } else {
            SessionState::Incomplete
        };

        if self.state != SessionState::Checking {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        self.transition(next);
        Ok(next)
    }

    /// The status call failed; let the payer press the button again.
    pub fn abort_check(&mut self) {
        if self.state == SessionState::Checking {
            self.transition(SessionState::AwaitingConfirmation);
        }
    }

    /// Incomplete → AwaitingConfirmation, handing the same redirect out again.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Incomplete | SessionState::AwaitingConfirmation => {
                self.transition(SessionState::AwaitingConfirmation);
                Ok(())
            }
            SessionState::Checking => Err(SessionError::AlreadyChecking(self.order_id.clone())),
            SessionState::Completed => Err(SessionError::InvalidTransition {
                from: SessionState::Completed,
                to: SessionState::AwaitingConfirmation,
            }),
        }
    }

    /// Idle past `ttl`. A check in flight gets `CHECK_TIMEOUT_SECS` on top.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let idle = now - self.updated_at;
        match self.state {
            SessionState::Checking => {
                let grace = ttl
                    .checked_add(&Duration::seconds(CHECK_TIMEOUT_SECS))
                    .unwrap_or(ttl);
                idle > grace
            }
            _ => idle > ttl,
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Payment session {}: {:?} -> {:?}", self.order_id, self.state, next);
        self.state = next;
        self.updated_at = Utc::now();
    }
}
