use {
    crate::domain::{
        error::LedgerError,
        id::TransactionId,
        ledger::{Ledger, LedgerFuture, LedgerOutcome, plan_period},
        money::{Currency, Money},
    },
    chrono::{DateTime, Utc},
    dashmap::{DashMap, mapref::entry::Entry},
    rust_decimal::Decimal,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub plan_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Process-local ledger. Each map entry is locked for the duration of its
/// update, and the transaction id is claimed under the same lock.
#[derive(Default)]
pub struct InMemoryLedger {
    processed: DashMap<TransactionId, ()>,
    earnings: DashMap<(String, Currency), Decimal>,
    subscriptions: DashMap<String, Subscription>,
    tokens: DashMap<String, u64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn earnings(&self, performer_id: &str, currency: &Currency) -> Decimal {
        self.earnings
            .get(&(performer_id.to_string(), currency.clone()))
            .map(|v| *v)
            .unwrap_or_default()
    }

    pub fn token_balance(&self, user_id: &str) -> u64 {
        self.tokens.get(user_id).map(|v| *v).unwrap_or_default()
    }

    pub fn subscription(&self, user_id: &str) -> Option<Subscription> {
        self.subscriptions.get(user_id).map(|s| s.clone())
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    fn once(
        &self,
        transaction_id: &TransactionId,
        apply: impl FnOnce() -> Result<(), LedgerError>,
    ) -> Result<LedgerOutcome, LedgerError> {
        match self.processed.entry(transaction_id.clone()) {
            Entry::Occupied(_) => Ok(LedgerOutcome::Duplicate),
            Entry::Vacant(slot) => {
                apply()?;
                slot.insert(());
                Ok(LedgerOutcome::Applied)
            }
        }
    }
}

impl Ledger for InMemoryLedger {
    fn credit_tip<'a>(
        &'a self,
        performer_id: &'a str,
        money: &'a Money,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        let result = self.once(transaction_id, || {
            *self
                .earnings
                .entry((performer_id.to_string(), money.currency().clone()))
                .or_default() += money.amount();
            Ok(())
        });
        Box::pin(async move { result })
    }

    fn activate_subscription<'a>(
        &'a self,
        user_id: &'a str,
        plan_type: &'a str,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        let result = self.once(transaction_id, || {
            let now = Utc::now();
            let period = plan_period(plan_type);
            self.subscriptions
                .entry(user_id.to_string())
                .and_modify(|s| {
                    s.plan_type = plan_type.to_string();
                    s.expires_at = s.expires_at.max(now) + period;
                })
                .or_insert_with(|| Subscription {
                    plan_type: plan_type.to_string(),
                    expires_at: now + period,
                });
            Ok(())
        });
        Box::pin(async move { result })
    }

    fn credit_tokens<'a>(
        &'a self,
        user_id: &'a str,
        amount: u64,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        let result = self.once(transaction_id, || {
            let mut balance = self.tokens.entry(user_id.to_string()).or_default();
            *balance = balance.checked_add(amount).ok_or_else(|| {
                LedgerError::Validation(format!("token balance overflow for {user_id}"))
            })?;
            Ok(())
        });
        Box::pin(async move { result })
    }
}
