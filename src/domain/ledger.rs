use {
    super::{error::LedgerError, id::TransactionId, money::Money},
    chrono::TimeDelta,
    std::{future::Future, pin::Pin},
};

/// Length of one paid period for a subscription plan. Unknown plans are
/// billed monthly.
pub fn plan_period(plan_type: &str) -> TimeDelta {
    match plan_type {
        "weekly" => TimeDelta::days(7),
        "quarterly" => TimeDelta::days(90),
        "yearly" | "annual" => TimeDelta::days(365),
        _ => TimeDelta::days(30),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The credit was recorded.
    Applied,
    /// This transaction id was already credited; nothing changed.
    Duplicate,
}

impl LedgerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Duplicate => "duplicate",
        }
    }
}

pub type LedgerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<LedgerOutcome, LedgerError>> + Send + 'a>>;

/// System of record for performer earnings, subscriptions and token balances.
///
/// Every mutation carries the provider transaction id. Implementations must
/// record it atomically with the mutation and answer
/// [`LedgerOutcome::Duplicate`] on a second delivery of the same id, and must
/// apply concurrent credits to the same target without losing any.
pub trait Ledger: Send + Sync {
    fn credit_tip<'a>(
        &'a self,
        performer_id: &'a str,
        money: &'a Money,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a>;

    fn activate_subscription<'a>(
        &'a self,
        user_id: &'a str,
        plan_type: &'a str,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a>;

    fn credit_tokens<'a>(
        &'a self,
        user_id: &'a str,
        amount: u64,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a>;
}
