use booth_order::{PaymentSession, SessionError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Open payment sessions keyed by upstream order id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, PaymentSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: PaymentSession) {
        tracing::info!(
            "Opened payment session {} for table {} ({})",
            session.order_id,
            session.table_id,
            session.payer_name
        );
        self.sessions
            .write()
            .await
            .insert(session.order_id.clone(), session);
    }

    pub async fn get(&self, order_id: &str) -> Result<PaymentSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(order_id.to_string()))
    }

    /// Applies a transition under the write lock.
    pub async fn update<F, R>(&self, order_id: &str, f: F) -> Result<(PaymentSession, R), SessionError>
    where
        F: FnOnce(&mut PaymentSession) -> Result<R, SessionError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(order_id)
            .ok_or_else(|| SessionError::NotFound(order_id.to_string()))?;
        let out = f(session)?;
        Ok((session.clone(), out))
    }

    /// Drops idle sessions; returns how many went.
    pub async fn expire_older_than(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!("Expired {} idle payment sessions", expired);
        }
        expired
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
