//! Checkout plans and token balance rules.

use serde::Serialize;

use crate::error::CoreError;

/// Tokens granted to a new account.
pub const SIGNUP_TOKEN_GRANT: i32 = 10;

/// What a checkout price id buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanKind {
    /// Sets the profile's paid flag.
    Subscription,
    /// Adds a fixed number of tokens.
    TokenPack { tokens: i32 },
}

/// A purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub price_id: &'static str,
    pub label: &'static str,
    pub kind: PlanKind,
}

pub const PLANS: &[Plan] = &[
    Plan {
        price_id: "price_pro_monthly",
        label: "Pro (monthly)",
        kind: PlanKind::Subscription,
    },
    Plan {
        price_id: "price_tokens_100",
        label: "100 tokens",
        kind: PlanKind::TokenPack { tokens: 100 },
    },
    Plan {
        price_id: "price_tokens_500",
        label: "500 tokens",
        kind: PlanKind::TokenPack { tokens: 500 },
    },
];

impl Plan {
    /// Resolve a checkout price id.
    pub fn lookup(price_id: &str) -> Result<&'static Plan, CoreError> {
        PLANS
            .iter()
            .find(|p| p.price_id == price_id)
            .ok_or_else(|| CoreError::Validation(format!("unknown price id '{price_id}'")))
    }
}

/// Token balances are absolute values and never negative.
pub fn validate_balance(balance: i32) -> Result<(), CoreError> {
    if balance < 0 {
        return Err(CoreError::Validation(format!(
            "token balance must be >= 0, got {balance}"
        )));
    }
    Ok(())
}
