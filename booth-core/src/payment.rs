use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// User-Agent tokens that mark a phone or tablet.
const MOBILE_TOKENS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Wallet apps reached through a custom URL scheme.
const WALLET_SCHEMES: [&str; 3] = ["supertoss", "toss", "kakaopay"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or_default().to_ascii_lowercase();
        if MOBILE_TOKENS.iter().any(|token| ua.contains(token)) {
            Device::Mobile
        } else {
            Device::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Bank {
    Woori,
    Hana,
    KakaoBank,
}

impl Bank {
    pub fn label(&self) -> &'static str {
        match self {
            Bank::Woori => "우리",
            Bank::Hana => "하나",
            Bank::KakaoBank => "카카오뱅크",
        }
    }
}

/// How the payer chose to pay on the name-entry screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "bank")]
pub enum PaymentMethod {
    Toss,
    BankApp(Bank),
}

impl PaymentMethod {
    pub fn parse(value: &str) -> CoreResult<Self> {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "" | "toss" | "토스" => Ok(PaymentMethod::Toss),
            "woori" | "우리" => Ok(PaymentMethod::BankApp(Bank::Woori)),
            "hana" | "하나" => Ok(PaymentMethod::BankApp(Bank::Hana)),
            "kakaobank" | "kakao_bank" | "카카오뱅크" => Ok(PaymentMethod::BankApp(Bank::KakaoBank)),
            other => Err(CoreError::ValidationError(format!("unknown payment method: {}", other))),
        }
    }

    /// Value forwarded upstream with the pre-order.
    pub fn upstream_value(&self) -> &'static str {
        match self {
            PaymentMethod::Toss => "toss",
            PaymentMethod::BankApp(bank) => bank.label(),
        }
    }
}

/// What kind of page or app the pre-order redirect URL points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    HostedCheckout,
    BankDeepLink,
    WalletLink,
}

impl PaymentProvider {
    pub fn classify(redirect_url: &str) -> CoreResult<Self> {
        let url = redirect_url.trim();
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .filter(|scheme| !scheme.is_empty())
            .ok_or_else(|| {
                CoreError::ValidationError(format!("redirect URL has no scheme: {:?}", url))
            })?;

        Ok(match scheme.as_str() {
            "http" | "https" => PaymentProvider::HostedCheckout,
            s if WALLET_SCHEMES.contains(&s) => PaymentProvider::WalletLink,
            other => {
                tracing::debug!("Treating {}:// redirect as a bank app link", other);
                PaymentProvider::BankDeepLink
            }
        })
    }
}

/// Instruction for the client on how to reach the payment page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "mode", content = "url")]
pub enum Navigation {
    /// Replace the current page.
    Redirect(String),
    /// Open in a separate window and keep the confirmation page around.
    NewWindow(String),
}

impl Navigation {
    pub fn plan(provider: PaymentProvider, device: Device, redirect_url: &str) -> Self {
        let url = redirect_url.trim().to_string();
        match (provider, device) {
            (PaymentProvider::HostedCheckout, Device::Desktop) => Navigation::NewWindow(url),
            _ => Navigation::Redirect(url),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Navigation::Redirect(url) | Navigation::NewWindow(url) => url,
        }
    }
}
