use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Invoice status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar")]
pub enum InvoiceStatus {
    #[sqlx(rename = "pending")]
    Pending,
    #[sqlx(rename = "paid")]
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(()),
        }
    }
}

/// Invoice model representing a billing record.
///
/// This struct maps to the `invoices` table. `amount` is stored in cents
/// and `date` is assigned once, when the invoice is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier for the invoice
    pub id: Uuid,

    /// Customer being billed
    pub customer_id: Uuid,

    /// Amount in cents
    pub amount: i64,

    /// Invoice status
    pub status: InvoiceStatus,

    /// Date the invoice was created
    pub date: NaiveDate,
}

/// Validated form input for create and update.
///
/// Produced only by the schema validator. `amount` is the decimal value
/// entered by the user; `amount_cents` is the value that gets stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount: rust_decimal::Decimal,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

/// Row to insert for a new invoice. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// The fields an update is allowed to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

impl From<&InvoiceInput> for InvoiceChanges {
    fn from(input: &InvoiceInput) -> Self {
        InvoiceChanges {
            customer_id: input.customer_id.clone(),
            amount_cents: input.amount_cents,
            status: input.status,
        }
    }
}
