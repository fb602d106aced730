use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Invoice, InvoiceChanges, NewInvoice};
use crate::store::InvoiceStore;

/// PostgreSQL-backed [`InvoiceStore`].
///
/// Customer ids are bound as text and cast in SQL, so a malformed id is
/// rejected by the database like any other constraint violation.
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    #[instrument(skip(self))]
    async fn insert(&self, invoice: NewInvoice) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status)
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $2::uuid, amount = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.customer_id)
        .bind(changes.amount_cents)
        .bind(changes.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            ORDER BY date DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Invoice>, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatus;
    use chrono::NaiveDate;

    /// Test helper to create a test database pool.
    ///
    /// Needs DATABASE_URL pointing at a migrated database with at least
    /// one customer.
    async fn create_test_store() -> Result<(PgInvoiceStore, String), anyhow::Error> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL not set for tests"))?;

        let pool = PgPool::connect(&database_url).await?;
        crate::db::run_migrations(&pool).await?;

        let customer_id: Uuid = sqlx::query_scalar(
            "INSERT INTO customers (name, email) VALUES ('Test Customer', 'test@example.com') RETURNING id",
        )
        .fetch_one(&pool)
        .await?;

        Ok((PgInvoiceStore::new(pool), customer_id.to_string()))
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_insert_update_delete_roundtrip() {
        let (store, customer_id) = create_test_store().await.expect("Failed to create test store");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let id = store
            .insert(NewInvoice {
                customer_id: customer_id.clone(),
                amount_cents: 4999,
                status: InvoiceStatus::Pending,
                date,
            })
            .await
            .expect("Insert should succeed");

        store
            .update(
                id,
                InvoiceChanges {
                    customer_id,
                    amount_cents: 10000,
                    status: InvoiceStatus::Paid,
                },
            )
            .await
            .expect("Update should succeed");

        let invoice = store.find(id).await.unwrap().expect("Invoice should exist");
        assert_eq!(invoice.id, id);
        assert_eq!(invoice.amount, 10000);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.date, date);

        store.delete(id).await.expect("Delete should succeed");
        assert!(store.find(id).await.unwrap().is_none());
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_malformed_customer_id_is_a_database_error() {
        let (store, _) = create_test_store().await.expect("Failed to create test store");

        let result = store
            .insert(NewInvoice {
                customer_id: "not-a-uuid".to_string(),
                amount_cents: 100,
                status: InvoiceStatus::Paid,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
