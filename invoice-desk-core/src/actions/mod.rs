pub mod authenticate;
pub mod invoices;
pub mod queries;


pub use authenticate::{authenticate, SignInOutcome};
pub use invoices::{ActionOutcome, InvoiceActions};
pub use queries::InvoiceQueries;
