//! Persistence port for invoices.

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Invoice, InvoiceChanges, NewInvoice};

pub use postgres::PgInvoiceStore;

/// A relational store of invoices.
///
/// Every mutating method issues exactly one statement; the store's own
/// statement atomicity is the only consistency guarantee.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts a new invoice and returns the id the store assigned.
    async fn insert(&self, invoice: NewInvoice) -> Result<Uuid, StoreError>;

    /// Overwrites customer, amount and status. `id` and `date` never change.
    ///
    /// Returns [`StoreError::NotFound`] when no row matches `id`.
    async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<(), StoreError>;

    /// Removes the invoice. Returns [`StoreError::NotFound`] when no row matches.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// All invoices, newest first.
    async fn list(&self) -> Result<Vec<Invoice>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Invoice>, StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
