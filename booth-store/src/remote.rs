//! `BoothApi` over the upstream REST API.

use async_trait::async_trait;
use booth_core::{ApiError, ApiResult, BoothApi};
use booth_shared::{
    CreateFoodRequest, CreateOrderRequest, Food, FoodCategory, Order, OrderHistory,
    PaymentStatusResponse, PreOrderRequest, PreOrderResponse, Table, UpdateFoodRequest,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_config::UpstreamConfig;

pub struct HttpBoothApi {
    base_url: Url,
    client: reqwest::Client,
}

/// Rejects ids that would not name a single upstream path segment.
fn segment(id: &str) -> ApiResult<&str> {
    match id.trim() {
        "" | "." | ".." => Err(ApiError::NotFound(format!("invalid id {:?}", id))),
        _ => Ok(id),
    }
}

impl HttpBoothApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("unusable base URL {:?}", base_url.as_str())));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &UpstreamConfig) -> ApiResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // =====================================================
    // HTTP helpers
    // =====================================================

    /// `base/seg1/seg2/` with every segment percent-encoded on its own,
    /// so `/` or `?` inside an id never changes the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{}: {}", path, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        warn!("Upstream {} answered {}: {}", path, status, body);
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<T> {
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        let response = self.send(self.request(Method::GET, url).query(query), &path).await?;
        Self::decode(response, &path).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        let response = self.send(self.request(method, url).json(body), &path).await?;
        Self::decode(response, &path).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        let response = self.send(self.request(Method::POST, url), &path).await?;
        Self::decode(response, &path).await
    }

    /// DELETE whose body, if any, is ignored.
    async fn delete(&self, segments: &[&str]) -> ApiResult<()> {
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        self.send(self.request(Method::DELETE, url), &path).await?;
        Ok(())
    }
}

#[async_trait]
impl BoothApi for HttpBoothApi {
    async fn list_foods(&self, category: Option<FoodCategory>) -> ApiResult<Vec<Food>> {
        match category {
            Some(category) => self.get(&["foods"], &[("category", category.as_str())]).await,
            None => self.get(&["foods"], &[]).await,
        }
    }

    async fn get_food(&self, food_id: i64) -> ApiResult<Food> {
        self.get(&["foods", &food_id.to_string()], &[]).await
    }

    async fn create_food(&self, req: &CreateFoodRequest) -> ApiResult<Food> {
        self.send_json(Method::POST, &["foods"], req).await
    }

    async fn update_food(&self, food_id: i64, req: &UpdateFoodRequest) -> ApiResult<Food> {
        self.send_json(Method::PATCH, &["foods", &food_id.to_string()], req)
            .await
    }

    async fn delete_food(&self, food_id: i64) -> ApiResult<()> {
        self.delete(&["foods", &food_id.to_string()]).await
    }

    async fn list_tables(&self) -> ApiResult<Vec<Table>> {
        self.get(&["tables"], &[]).await
    }

    async fn get_table(&self, table_id: &str) -> ApiResult<Table> {
        self.get(&["tables", segment(table_id)?], &[]).await
    }

    async fn create_table(&self) -> ApiResult<Table> {
        self.post_empty(&["tables", "create"]).await
    }

    async fn create_order(&self, req: &CreateOrderRequest) -> ApiResult<Order> {
        self.send_json(Method::POST, &["orders"], req).await
    }

    async fn create_pre_order(
        &self,
        table_id: &str,
        req: &PreOrderRequest,
    ) -> ApiResult<PreOrderResponse> {
        self.send_json(Method::POST, &["orders", "pre-order", segment(table_id)?], req)
            .await
    }

    async fn order_history(&self, table_id: Option<&str>) -> ApiResult<OrderHistory> {
        match table_id {
            Some(table_id) => {
                self.get(&["orders", "history"], &[("table_id", table_id)])
                    .await
            }
            None => self.get(&["orders", "history"], &[]).await,
        }
    }

    async fn table_orders(&self, table_id: &str) -> ApiResult<OrderHistory> {
        self.get(&["tables", segment(table_id)?, "orders"], &[])
            .await
    }

    async fn payment_status(&self, order_id: &str) -> ApiResult<PaymentStatusResponse> {
        self.get(&["orders", segment(order_id)?, "payment-status"], &[])
            .await
    }

    async fn reset_table_orders(&self, table_id: &str) -> ApiResult<()> {
        self.delete(&["tables", segment(table_id)?, "orders", "reset"])
            .await
    }
}
