//! Billing-API compatible views of the fal balance
//!
//! fal exposes a single USD amount. OpenAI-style dashboards expect one of
//! three billing shapes; each is derived from that amount.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// `access_until` horizon for the subscription shape
pub const ACCESS_WINDOW_SECS: i64 = 365 * 86_400;

/// Leading decimal number, as a lenient float parser would accept it
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Response shape selected by the billing path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceFormat {
    Subscription,
    CreditGrants,
    Usage,
    /// Any unrecognized key
    Summary,
}

impl BalanceFormat {
    pub fn from_key(key: &str) -> Self {
        match key {
            "subscription" => BalanceFormat::Subscription,
            "credit_grants" => BalanceFormat::CreditGrants,
            "usage" => BalanceFormat::Usage,
            _ => BalanceFormat::Summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSubscription {
    pub object: &'static str,
    pub has_payment_method: bool,
    pub soft_limit_usd: f64,
    pub hard_limit_usd: f64,
    pub system_hard_limit_usd: f64,
    pub access_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditSummary {
    pub object: &'static str,
    pub total_granted: i64,
    pub total_used: i64,
    pub total_available: i64,
    pub grants: CreditGrantList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditGrantList {
    pub object: &'static str,
    pub data: Vec<CreditGrant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditGrant {
    pub object: &'static str,
    pub id: &'static str,
    pub grant_amount: i64,
    pub used_amount: i64,
    pub effective_at: i64,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingUsage {
    pub object: &'static str,
    pub total_usage: i64,
    pub daily_costs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSummary {
    pub balance: f64,
    pub currency: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BillingResponse {
    Subscription(BillingSubscription),
    CreditGrants(CreditSummary),
    Usage(BillingUsage),
    Summary(BalanceSummary),
}

/// Parse the plain-text balance body and round it to cents
pub fn parse_balance(text: &str) -> AppResult<f64> {
    let invalid = || AppError::Parse("Invalid balance format".to_string());

    let number = LEADING_NUMBER
        .find(text.trim_start())
        .ok_or_else(invalid)?
        .as_str();
    let raw: f64 = number.parse().map_err(|_| invalid())?;
    if !raw.is_finite() {
        return Err(invalid());
    }

    Ok(round_cents(raw))
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn to_minor_units(balance: f64) -> i64 {
    (balance * 100.0).round() as i64
}

/// Render `balance` in the requested shape as of `now`
pub fn render_balance(balance: f64, format: BalanceFormat, now: DateTime<Utc>) -> BillingResponse {
    let now_secs = now.timestamp();

    match format {
        BalanceFormat::Subscription => BillingResponse::Subscription(BillingSubscription {
            object: "billing_subscription",
            has_payment_method: true,
            soft_limit_usd: balance,
            hard_limit_usd: balance,
            system_hard_limit_usd: balance,
            access_until: now_secs + ACCESS_WINDOW_SECS,
        }),
        BalanceFormat::CreditGrants => {
            let cents = to_minor_units(balance);
            BillingResponse::CreditGrants(CreditSummary {
                object: "credit_summary",
                total_granted: cents,
                total_used: 0,
                total_available: cents,
                grants: CreditGrantList {
                    object: "list",
                    data: vec![CreditGrant {
                        object: "credit_grant",
                        id: "fal-balance",
                        grant_amount: cents,
                        used_amount: 0,
                        effective_at: now_secs,
                        expires_at: None,
                    }],
                },
            })
        }
        BalanceFormat::Usage => BillingResponse::Usage(BillingUsage {
            object: "billing_usage",
            total_usage: 0,
            daily_costs: Vec::new(),
        }),
        BalanceFormat::Summary => BillingResponse::Summary(BalanceSummary {
            balance,
            currency: "USD",
        }),
    }
}
