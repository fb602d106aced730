//! In-memory invoice store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Invoice, InvoiceChanges, NewInvoice};
use crate::store::InvoiceStore;

/// In-memory [`InvoiceStore`]. Counts mutating calls and can be told to
/// fail every statement.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<Uuid, Invoice>>>,
    mutations: Arc<AtomicUsize>,
    fail_with: Arc<RwLock<Option<String>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(detail: &str) -> Self {
        let store = Self::default();
        *store.fail_with.write().unwrap() = Some(detail.to_string());
        store
    }

    pub fn seed(&self, invoice: Invoice) {
        self.invoices.write().unwrap().insert(invoice.id, invoice);
    }

    pub fn get(&self, id: Uuid) -> Option<Invoice> {
        self.invoices.read().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.invoices.read().unwrap().len()
    }

    /// Number of insert/update/delete statements issued.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.fail_with.read().unwrap().as_ref() {
            Some(detail) => Err(StoreError::Backend(detail.clone())),
            None => Ok(()),
        }
    }

    fn parse_customer(customer_id: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(customer_id).map_err(|e| {
            StoreError::Backend(format!("invalid input syntax for type uuid: {}", e))
        })
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<Uuid, StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let id = Uuid::new_v4();
        let row = Invoice {
            id,
            customer_id: Self::parse_customer(&invoice.customer_id)?,
            amount: invoice.amount_cents,
            status: invoice.status,
            date: invoice.date,
        };
        self.invoices.write().unwrap().insert(id, row);
        Ok(id)
    }

    async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let customer_id = Self::parse_customer(&changes.customer_id)?;
        let mut invoices = self.invoices.write().unwrap();
        let invoice = invoices.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        invoice.customer_id = customer_id;
        invoice.amount = changes.amount_cents;
        invoice.status = changes.status;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        self.invoices
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        self.check_failure()?;
        let mut invoices: Vec<Invoice> = self.invoices.read().unwrap().values().cloned().collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(invoices)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Invoice>, StoreError> {
        self.check_failure()?;
        Ok(self.get(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_failure()
    }
}
