use booth_shared::money::format_won;
use booth_shared::pii::Masked;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::app_config::NotifyConfig;

const PAYMENT_COLOR: u32 = 0x00ff00;
const STAFF_CALL_COLOR: u32 = 0xff9900;
const FOOTER: &str = "Festival booth ordering";

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
    pub footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.into(),
        inline,
    }
}

/// A line of the paid order as shown in the notification.
#[derive(Debug, Clone)]
pub struct NotifiedItem {
    pub name: String,
    pub quantity: u32,
    pub price: i64,
}

/// Staff-facing alerts posted to Discord webhooks.
///
/// Delivery is best effort: failures are logged and reported as `false`,
/// never surfaced to the customer.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
    payment_webhook_url: Option<String>,
    staff_webhook_url: Option<String>,
}

impl DiscordNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            payment_webhook_url: non_blank(config.payment_webhook_url.as_deref()),
            staff_webhook_url: non_blank(config.staff_webhook_url.as_deref()),
        }
    }

    pub fn payment_payload(
        order_id: &str,
        payer_name: &str,
        total_amount: i64,
        table_name: Option<&str>,
        items: &[NotifiedItem],
    ) -> WebhookPayload {
        let payer = if payer_name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            payer_name.to_string()
        };

        let mut fields = vec![
            field("Order", format!("`{}`", order_id), true),
            field("Payer", payer, true),
        ];
        if let Some(table_name) = table_name {
            fields.push(field("Table", table_name, true));
        }
        fields.push(field("Amount", format_won(total_amount), true));

        if !items.is_empty() {
            let menu = items
                .iter()
                .map(|item| format!("• {} x{} ({})", item.name, item.quantity, format_won(item.price)))
                .collect::<Vec<_>>()
                .join("\n");
            fields.push(field("Items", menu, false));
        }

        WebhookPayload {
            username: "Order Bot".to_string(),
            embeds: vec![Embed {
                title: "🎉 Payment completed".to_string(),
                description: "A new order has been paid.".to_string(),
                color: PAYMENT_COLOR,
                fields,
                timestamp: Utc::now().to_rfc3339(),
                footer: EmbedFooter { text: FOOTER.to_string() },
            }],
        }
    }

    pub fn staff_call_payload(table_name: &str, message: Option<&str>) -> WebhookPayload {
        let mut description = format!("Staff requested at {}!", table_name);
        let mut fields = vec![field("Table", table_name, true)];
        if let Some(message) = message {
            description.push_str(&format!(" Message: {}", message));
            fields.push(field("Customer message", message, false));
        }

        WebhookPayload {
            username: "Staff Call Bot".to_string(),
            embeds: vec![Embed {
                title: "🔔 Staff call".to_string(),
                description,
                color: STAFF_CALL_COLOR,
                fields,
                timestamp: Utc::now().to_rfc3339(),
                footer: EmbedFooter { text: FOOTER.to_string() },
            }],
        }
    }

    pub async fn notify_payment(
        &self,
        order_id: &str,
        payer_name: &Masked<String>,
        total_amount: i64,
        table_name: Option<&str>,
        items: &[NotifiedItem],
    ) -> bool {
        let Some(url) = self.payment_webhook_url.as_deref() else {
            warn!("Payment webhook URL is not configured; skipping notification for {}", order_id);
            return false;
        };
        let payload = Self::payment_payload(order_id, payer_name.as_inner(), total_amount, table_name, items);
        let sent = self.post(url, &payload).await;
        if sent {
            info!("Payment notification sent for order {} ({})", order_id, payer_name);
        }
        sent
    }

    pub async fn notify_staff_call(&self, table_name: &str, message: Option<&str>) -> bool {
        let Some(url) = self.staff_webhook_url.as_deref() else {
            warn!("Staff call webhook URL is not configured; skipping call from {}", table_name);
            return false;
        };
        let sent = self.post(url, &Self::staff_call_payload(table_name, message)).await;
        if sent {
            info!("Staff call notification sent for {}", table_name);
        }
        sent
    }

    async fn post(&self, url: &str, payload: &WebhookPayload) -> bool {
        match self.client.post(url).json(payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!("Discord webhook answered {}: {}", status, body);
                false
            }
            Err(e) => {
                error!("Discord webhook unreachable: {}", e);
                false
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
