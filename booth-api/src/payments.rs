use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::{headers::UserAgent, TypedHeader};
use booth_core::{Device, Navigation, PaymentMethod, PaymentProvider};
use booth_order::{CheckStart, PaymentSession, SessionState};
use booth_shared::{PreOrderRequest, TableEvent};
use booth_store::NotifiedItem;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{error::AppError, state::AppState};

/// Longest payer name the ordering API stores.
const MAX_PAYER_NAME_CHARS: usize = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tables/{table_id}/checkout", post(checkout))
        .route("/api/tables/{table_id}/payment-result", get(payment_result))
        .route("/api/payments/{order_id}", get(get_session))
        .route("/api/payments/{order_id}/confirm", post(confirm_payment))
        .route("/api/payments/{order_id}/retry", post(retry_payment))
}

// ============================================================================
// Request / Response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payer_name: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub redirect_url: String,
    pub provider: PaymentProvider,
    pub navigation: Navigation,
    pub total_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub order_id: String,
    pub state: SessionState,
    pub payment_completed: bool,
    /// Where to send the payer again when the payment was not seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentResultQuery {
    pub order_id: String,
}

fn device_of(user_agent: Option<TypedHeader<UserAgent>>) -> Device {
    Device::from_user_agent(user_agent.as_ref().map(|TypedHeader(ua)| ua.as_str()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tables/{table_id}/checkout
async fn checkout(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let payer_name = req.payer_name.trim();
    if payer_name.is_empty() {
        return Err(AppError::ValidationError("Payer name is required".to_string()));
    }
    if payer_name.chars().count() > MAX_PAYER_NAME_CHARS {
        return Err(AppError::ValidationError(format!(
            "Payer name must be at most {} characters",
            MAX_PAYER_NAME_CHARS
        )));
    }
    let method = PaymentMethod::parse(req.payment_method.as_deref().unwrap_or_default())?;

    let cart = state.carts.get(&table_id).await;
    if cart.is_empty() {
        return Err(AppError::ValidationError("Cart is empty".to_string()));
    }

    let pre_order = PreOrderRequest {
        payer_name: payer_name.to_string(),
        total_amount: cart.total_price(),
        items: cart.to_order_items(),
        payment_method: Some(method.upstream_value().to_string()),
    };
    let resp = state.api.create_pre_order(&table_id, &pre_order).await?;
    if resp.redirect_url.trim().is_empty() {
        tracing::error!("Pre-order {} came back without a redirect URL", resp.order_id);
        return Err(AppError::BadGateway("Payment redirect URL missing".to_string()));
    }

    let session = PaymentSession::open(
        &table_id,
        &resp.order_id,
        payer_name,
        pre_order.total_amount,
        &resp.redirect_url,
        cart.items().to_vec(),
    )?;
    let navigation = session.navigation(device_of(user_agent));
    let response = CheckoutResponse {
        order_id: session.order_id.clone(),
        redirect_url: session.redirect_url.clone(),
        provider: session.provider,
        navigation,
        total_amount: session.total_amount,
    };
    state.sessions.insert(session).await;

    Ok(Json(response))
}

/// GET /api/payments/{order_id}
async fn get_session(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentSession>, AppError> {
    Ok(Json(state.sessions.get(&order_id).await?))
}

/// POST /api/payments/{order_id}/confirm
async fn confirm_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    user_agent: Option<TypedHeader<UserAgent>>,
) -> Result<Json<PaymentOutcome>, AppError> {
    let (session, start) = state.sessions.update(&order_id, |s| s.begin_check()).await?;
    if start == CheckStart::AlreadyCompleted {
        return Ok(Json(outcome(&session, None)));
    }

    let delay = state.payment.confirm_delay();
    let session = spawn_check(&state, &order_id, delay, OnStatusError::Abort).await?;
    let navigation = retry_navigation(&session, device_of(user_agent));
    Ok(Json(outcome(&session, navigation)))
}

/// POST /api/payments/{order_id}/retry
async fn retry_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    user_agent: Option<TypedHeader<UserAgent>>,
) -> Result<Json<Navigation>, AppError> {
    let (session, _) = state.sessions.update(&order_id, |s| s.retry()).await?;
    tracing::info!("Payer retrying order {} (attempt {})", order_id, session.attempts + 1);
    Ok(Json(session.navigation(device_of(user_agent))))
}

/// GET /api/tables/{table_id}/payment-result?order_id=
///
/// Return path from the payment provider. Any upstream failure reads as
/// "not paid yet" so the payer lands on the retry screen.
async fn payment_result(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    Query(query): Query<PaymentResultQuery>,
    user_agent: Option<TypedHeader<UserAgent>>,
) -> Result<Json<PaymentOutcome>, AppError> {
    let order_id = query.order_id;
    if state.sessions.get(&order_id).await?.table_id != table_id {
        return Err(AppError::NotFoundError(format!(
            "Order {} does not belong to this table",
            order_id
        )));
    }

    let (session, start) = state.sessions.update(&order_id, |s| s.begin_check()).await?;
    if start == CheckStart::AlreadyCompleted {
        return Ok(Json(outcome(&session, None)));
    }

    let delay = state.payment.result_delay();
    let session = spawn_check(&state, &order_id, delay, OnStatusError::Unpaid).await?;
    let navigation = retry_navigation(&session, device_of(user_agent));
    Ok(Json(outcome(&session, navigation)))
}

// ============================================================================
// Helpers
// ============================================================================

/// What a failed upstream status call means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnStatusError {
    /// Back to AwaitingConfirmation and surface the error.
    Abort,
    /// Count it as not paid yet.
    Unpaid,
}

/// Runs the delayed status check on its own task. The session leaves
/// `Checking` even when the caller hangs up mid-delay.
async fn spawn_check(
    state: &AppState,
    order_id: &str,
    delay: Duration,
    on_error: OnStatusError,
) -> Result<PaymentSession, AppError> {
    let state = state.clone();
    let order_id = order_id.to_string();
    let task = tokio::spawn(async move { check_payment(&state, &order_id, delay, on_error).await });

    task.await
        .map_err(|e| AppError::InternalServerError(format!("Payment check task failed: {}", e)))?
}

async fn check_payment(
    state: &AppState,
    order_id: &str,
    delay: Duration,
    on_error: OnStatusError,
) -> Result<PaymentSession, AppError> {
    tokio::time::sleep(delay).await;

    let paid = match state.api.payment_status(order_id).await {
        Ok(status) => status.payment_completed,
        Err(e) => {
            tracing::warn!("Payment status check for {} failed: {}", order_id, e);
            state.metrics.record_payment_check("error");
            if on_error == OnStatusError::Abort {
                state
                    .sessions
                    .update(order_id, |s| {
                        s.abort_check();
                        Ok(())
                    })
                    .await?;
                return Err(e.into());
            }
            false
        }
    };

    finish(state, order_id, paid).await
}

async fn finish(state: &AppState, order_id: &str, paid: bool) -> Result<PaymentSession, AppError> {
    let (session, next) = state.sessions.update(order_id, |s| s.finish_check(paid)).await?;

    if next == SessionState::Completed {
        state.metrics.record_payment_check("completed");
        on_payment_completed(state, &session).await;
    } else {
        state.metrics.record_payment_check("incomplete");
        tracing::info!("Payment for order {} not seen yet", order_id);
    }
    Ok(session)
}

async fn on_payment_completed(state: &AppState, session: &PaymentSession) {
    tracing::info!(
        "Payment completed for order {} at table {} by {}",
        session.order_id,
        session.table_id,
        session.payer_name
    );

    // Only what was in the cart at checkout is paid for.
    let items: Vec<NotifiedItem> = session
        .items
        .iter()
        .map(|item| NotifiedItem {
            name: item.food.name.clone(),
            quantity: item.quantity,
            price: item.food.price,
        })
        .collect();
    state
        .carts
        .update(&session.table_id, |cart| cart.deduct(&session.items))
        .await;

    state
        .events
        .publish(TableEvent::order_complete(&session.table_id, &session.order_id));

    let table_name = match state.api.get_table(&session.table_id).await {
        Ok(table) => Some(table.display_name()),
        Err(_) => None,
    };
    state
        .notifier
        .notify_payment(
            &session.order_id,
            &session.payer_name,
            session.total_amount,
            table_name.as_deref(),
            &items,
        )
        .await;
}

fn retry_navigation(session: &PaymentSession, device: Device) -> Option<Navigation> {
    (session.state == SessionState::Incomplete).then(|| session.navigation(device))
}

fn outcome(session: &PaymentSession, navigation: Option<Navigation>) -> PaymentOutcome {
    PaymentOutcome {
        order_id: session.order_id.clone(),
        state: session.state,
        payment_completed: session.state == SessionState::Completed,
        navigation,
    }
}
