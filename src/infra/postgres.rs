pub mod ledger_repo;

use {
    crate::domain::{
        error::LedgerError,
        id::TransactionId,
        ledger::{Ledger, LedgerFuture, LedgerOutcome, plan_period},
        money::Money,
    },
    sqlx::PgPool,
};

/// Ledger backed by Postgres. The transaction-id claim and the balance
/// update commit together, so a retried delivery can never credit twice.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn credit_tip_inner(
        &self,
        performer_id: &str,
        money: &Money,
        transaction_id: &TransactionId,
    ) -> Result<LedgerOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if !ledger_repo::claim_transaction(&mut tx, transaction_id.as_str(), "tip", performer_id)
            .await?
        {
            tx.commit().await?;
            return Ok(LedgerOutcome::Duplicate);
        }
        ledger_repo::add_earnings(&mut tx, performer_id, money).await?;
        tx.commit().await?;
        Ok(LedgerOutcome::Applied)
    }

    async fn activate_subscription_inner(
        &self,
        user_id: &str,
        plan_type: &str,
        transaction_id: &TransactionId,
    ) -> Result<LedgerOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if !ledger_repo::claim_transaction(&mut tx, transaction_id.as_str(), "subscription", user_id)
            .await?
        {
            tx.commit().await?;
            return Ok(LedgerOutcome::Duplicate);
        }
        let days = i32::try_from(plan_period(plan_type).num_days())
            .map_err(|_| LedgerError::Validation(format!("plan period too long: {plan_type}")))?;
        ledger_repo::extend_subscription(&mut tx, user_id, plan_type, days).await?;
        tx.commit().await?;
        Ok(LedgerOutcome::Applied)
    }

    async fn credit_tokens_inner(
        &self,
        user_id: &str,
        amount: u64,
        transaction_id: &TransactionId,
    ) -> Result<LedgerOutcome, LedgerError> {
        let amount = i64::try_from(amount)
            .map_err(|_| LedgerError::Validation(format!("token amount too large: {amount}")))?;
        let mut tx = self.pool.begin().await?;
        if !ledger_repo::claim_transaction(&mut tx, transaction_id.as_str(), "tokens", user_id)
            .await?
        {
            tx.commit().await?;
            return Ok(LedgerOutcome::Duplicate);
        }
        ledger_repo::add_tokens(&mut tx, user_id, amount).await?;
        tx.commit().await?;
        Ok(LedgerOutcome::Applied)
    }
}

impl Ledger for PgLedger {
    fn credit_tip<'a>(
        &'a self,
        performer_id: &'a str,
        money: &'a Money,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(self.credit_tip_inner(performer_id, money, transaction_id))
    }

    fn activate_subscription<'a>(
        &'a self,
        user_id: &'a str,
        plan_type: &'a str,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(self.activate_subscription_inner(user_id, plan_type, transaction_id))
    }

    fn credit_tokens<'a>(
        &'a self,
        user_id: &'a str,
        amount: u64,
        transaction_id: &'a TransactionId,
    ) -> LedgerFuture<'a> {
        Box::pin(self.credit_tokens_inner(user_id, amount, transaction_id))
    }
}
