//! Schema validation for invoice forms.
//!
//! Raw form data arrives as an untyped field map. [`validate_invoice_form`]
//! checks every rule, collects all violations, and only hands back a typed
//! [`InvoiceInput`] when every field passes.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

use crate::models::{FieldErrors, InvoiceInput, InvoiceStatus};

/// Untyped form payload: field name to raw value.
pub type RawForm = Map<String, Value>;

pub const CUSTOMER_ID_FIELD: &str = "customerId";
pub const AMOUNT_FIELD: &str = "amount";
pub const STATUS_FIELD: &str = "status";

pub const CUSTOMER_ID_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please insert a number greater than 0";
pub const STATUS_MESSAGE: &str = "Please select an invoice status";

/// Builds a [`RawForm`] from url-encoded form pairs.
pub fn form_from_pairs(pairs: HashMap<String, String>) -> RawForm {
    pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Converts a decimal amount to whole cents, rounding half away from zero.
///
/// Returns `None` if the result does not fit in an `i64`.
pub fn cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Validates the create/update invoice form.
///
/// `id` and `date` are not part of the schema; if the caller sends them
/// they are ignored.
pub fn validate_invoice_form(form: &RawForm) -> Result<InvoiceInput, FieldErrors> {
    let mut errors = FieldErrors::default();

    let customer_id = match customer_id(form.get(CUSTOMER_ID_FIELD)) {
        Ok(id) => Some(id),
        Err(message) => {
            errors.push_customer_id(message);
            None
        }
    };

    let amount = match amount(form.get(AMOUNT_FIELD)) {
        Ok(amount) => Some(amount),
        Err(message) => {
            errors.push_amount(message);
            None
        }
    };

    let status = match status(form.get(STATUS_FIELD)) {
        Ok(status) => Some(status),
        Err(message) => {
            errors.push_status(message);
            None
        }
    };

    match (customer_id, amount, status) {
        (Some(customer_id), Some((amount, amount_cents)), Some(status)) => Ok(InvoiceInput {
            customer_id,
            amount,
            amount_cents,
            status,
        }),
        _ => Err(errors),
    }
}

fn customer_id(value: Option<&Value>) -> Result<String, &'static str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(CUSTOMER_ID_MESSAGE),
    }
}

fn amount(value: Option<&Value>) -> Result<(Decimal, i64), &'static str> {
    let amount = coerce_number(value).ok_or(AMOUNT_MESSAGE)?;
    if amount <= Decimal::ZERO {
        return Err(AMOUNT_MESSAGE);
    }
    // Sub-cent amounts would store as zero.
    match cents(amount) {
        Some(c) if c > 0 => Ok((amount, c)),
        _ => Err(AMOUNT_MESSAGE),
    }
}

fn status(value: Option<&Value>) -> Result<InvoiceStatus, &'static str> {
    value
        .and_then(Value::as_str)
        .and_then(|s| InvoiceStatus::from_str(s).ok())
        .ok_or(STATUS_MESSAGE)
}

/// Number coercion for form values: missing, null and blank become zero;
/// anything that is not a number is rejected.
fn coerce_number(value: Option<&Value>) -> Option<Decimal> {
    match value {
        None | Some(Value::Null) => Some(Decimal::ZERO),
        Some(Value::Bool(b)) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return Some(Decimal::ZERO);
    }
    // Plain decimal or exponent notation only.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
