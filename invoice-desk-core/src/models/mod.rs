pub mod form_state;
pub mod invoice;
pub mod user;

pub use form_state::{FieldErrors, FormState};
pub use invoice::{Invoice, InvoiceChanges, InvoiceInput, InvoiceStatus, NewInvoice};
pub use user::{Credentials, User};
