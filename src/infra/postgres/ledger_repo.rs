use {crate::domain::money::Money, rust_decimal::Decimal};

type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

/// Record a transaction id. Returns `false` if it was already recorded.
pub async fn claim_transaction(
    tx: &mut PgTx<'_>,
    transaction_id: &str,
    kind: &str,
    target_id: &str,
) -> Result<bool, sqlx::Error> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO ledger_transactions (transaction_id, kind, target_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (transaction_id) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(transaction_id)
    .bind(kind)
    .bind(target_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(inserted.is_some())
}

pub async fn add_earnings(
    tx: &mut PgTx<'_>,
    performer_id: &str,
    money: &Money,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO performer_earnings (performer_id, currency, total)
        VALUES ($1, $2, $3)
        ON CONFLICT (performer_id, currency)
        DO UPDATE SET total = performer_earnings.total + EXCLUDED.total, updated_at = now()
        "#,
    )
    .bind(performer_id)
    .bind(money.currency().as_str())
    .bind(money.amount())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn extend_subscription(
    tx: &mut PgTx<'_>,
    user_id: &str,
    plan_type: &str,
    days: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, plan_type, expires_at)
        VALUES ($1, $2, now() + make_interval(days => $3))
        ON CONFLICT (user_id)
        DO UPDATE SET plan_type = EXCLUDED.plan_type,
                      expires_at = GREATEST(subscriptions.expires_at, now()) + make_interval(days => $3),
                      updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(plan_type)
    .bind(days)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn add_tokens(tx: &mut PgTx<'_>, user_id: &str, amount: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO token_balances (user_id, balance)
        VALUES ($1, $2)
        ON CONFLICT (user_id)
        DO UPDATE SET balance = token_balances.balance + EXCLUDED.balance, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn earnings(
    pool: &sqlx::PgPool,
    performer_id: &str,
    currency: &str,
) -> Result<Decimal, sqlx::Error> {
    let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT total FROM performer_earnings WHERE performer_id = $1 AND currency = $2",
    )
    .bind(performer_id)
    .bind(currency)
    .fetch_optional(pool)
    .await?;

    Ok(total.unwrap_or_default())
}

pub async fn token_balance(pool: &sqlx::PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    let balance: Option<i64> =
        sqlx::query_scalar("SELECT balance FROM token_balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(balance.unwrap_or_default())
}
