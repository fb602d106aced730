use std::sync::Arc;

use uuid::Uuid;

use crate::effects::{ViewCache, INVOICES_PATH};
use crate::error::StoreError;
use crate::models::Invoice;
use crate::store::InvoiceStore;

/// Read side of the dashboard. The listing is served through the view
/// cache that the mutations invalidate.
#[derive(Clone)]
pub struct InvoiceQueries {
    store: Arc<dyn InvoiceStore>,
    listing: ViewCache<Vec<Invoice>>,
}

impl InvoiceQueries {
    pub fn new(store: Arc<dyn InvoiceStore>, listing: ViewCache<Vec<Invoice>>) -> Self {
        Self { store, listing }
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        let store = self.store.clone();
        self.listing
            .get_or_load(INVOICES_PATH, || async move { store.list().await })
            .await
    }

    pub async fn fetch_invoice(&self, id: Uuid) -> Result<Invoice, StoreError> {
        self.store.find(id).await?.ok_or(StoreError::NotFound(id))
    }
}
