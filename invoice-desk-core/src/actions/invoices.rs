use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::effects::{ViewInvalidator, INVOICES_PATH};
use crate::error::StoreError;
use crate::models::{FormState, InvoiceChanges, NewInvoice};
use crate::store::InvoiceStore;
use crate::validation::{validate_invoice_form, RawForm};

pub const INVOICE_DELETED_MESSAGE: &str = "Invoice deleted";
const CREATE_INVALID_MESSAGE: &str = "Missing field. Failed to create invoice";
const UPDATE_INVALID_MESSAGE: &str = "Missing field. Failed to edit invoice";

/// What the caller should do after a mutation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The mutation succeeded; navigate to `to`.
    Redirect { to: &'static str },
    /// The mutation succeeded and there is nowhere to navigate.
    Completed(FormState),
    /// The store rejected the mutation.
    Failed(FormState),
    /// The form did not validate; nothing was persisted.
    Invalid(FormState),
}

impl ActionOutcome {
    pub fn into_form_state(self) -> Option<FormState> {
        match self {
            ActionOutcome::Redirect { .. } => None,
            ActionOutcome::Completed(state)
            | ActionOutcome::Failed(state)
            | ActionOutcome::Invalid(state) => Some(state),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

/// Executes validated invoice mutations and applies their effects.
///
/// Each call validates, issues at most one store statement, and on success
/// invalidates the listing view exactly once.
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    views: Arc<dyn ViewInvalidator>,
    expose_error_detail: bool,
    today: Arc<dyn Fn() -> NaiveDate + Send + Sync>,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, views: Arc<dyn ViewInvalidator>) -> Self {
        Self {
            store,
            views,
            expose_error_detail: false,
            today: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Append the underlying store error to failure messages.
    pub fn with_error_detail(mut self, expose: bool) -> Self {
        self.expose_error_detail = expose;
        self
    }

    /// Replace the clock used to date new invoices.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    /// Creates an invoice dated today (UTC) from the submitted form.
    #[instrument(skip(self, form))]
    pub async fn create_invoice(&self, form: &RawForm) -> ActionOutcome {
        let input = match validate_invoice_form(form) {
            Ok(input) => input,
            Err(errors) => {
                return ActionOutcome::Invalid(FormState::invalid(errors, CREATE_INVALID_MESSAGE))
            }
        };

        let invoice = NewInvoice {
            customer_id: input.customer_id,
            amount_cents: input.amount_cents,
            status: input.status,
            date: (self.today)(),
        };

        match self.store.insert(invoice).await {
            Ok(id) => {
                info!("Created invoice {}", id);
                self.redirect_to_listing()
            }
            Err(e) => self.failed(Mutation::Create, e),
        }
    }

    /// Overwrites customer, amount and status of invoice `id`.
    #[instrument(skip(self, form))]
    pub async fn update_invoice(&self, id: Uuid, form: &RawForm) -> ActionOutcome {
        let input = match validate_invoice_form(form) {
            Ok(input) => input,
            Err(errors) => {
                return ActionOutcome::Invalid(FormState::invalid(errors, UPDATE_INVALID_MESSAGE))
            }
        };

        match self.store.update(id, InvoiceChanges::from(&input)).await {
            Ok(()) => {
                info!("Updated invoice {}", id);
                self.redirect_to_listing()
            }
            Err(e) => self.failed(Mutation::Update, e),
        }
    }

    /// Deletes invoice `id`. Does not navigate.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: Uuid) -> ActionOutcome {
        match self.store.delete(id).await {
            Ok(()) => {
                info!("Deleted invoice {}", id);
                self.views.invalidate(INVOICES_PATH);
                ActionOutcome::Completed(FormState::message(INVOICE_DELETED_MESSAGE))
            }
            Err(e) => self.failed(Mutation::Delete, e),
        }
    }

    fn redirect_to_listing(&self) -> ActionOutcome {
        self.views.invalidate(INVOICES_PATH);
        ActionOutcome::Redirect { to: INVOICES_PATH }
    }

    fn failed(&self, mutation: Mutation, err: StoreError) -> ActionOutcome {
        let verb = mutation.verb();
        let message = match &err {
            StoreError::NotFound(id) => {
                warn!("Failed to {} invoice: {} not found", verb, id);
                format!("Invoice not found. Failed to {} invoice.", verb)
            }
            other => {
                error!("Failed to {} invoice: {}", verb, other);
                if self.expose_error_detail {
                    format!("Database error. Failed to {} invoice: {}", verb, other)
                } else {
                    format!("Database error. Failed to {} invoice.", verb)
                }
            }
        };
        ActionOutcome::Failed(FormState::message(message))
    }
}
