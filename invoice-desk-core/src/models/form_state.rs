use serde::{Deserialize, Serialize};

/// Per-field validation messages, in the order the rules were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
}

impl FieldErrors {
    pub(crate) fn push_customer_id(&mut self, message: &str) {
        self.customer_id
            .get_or_insert_with(Vec::new)
            .push(message.to_string());
    }

    pub(crate) fn push_amount(&mut self, message: &str) {
        self.amount
            .get_or_insert_with(Vec::new)
            .push(message.to_string());
    }

    pub(crate) fn push_status(&mut self, message: &str) {
        self.status
            .get_or_insert_with(Vec::new)
            .push(message.to_string());
    }
}

/// Result handed back to the form after a mutation attempt.
///
/// Never persisted. The form keeps the user's input; this only carries the
/// feedback to render next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    pub fn message(message: impl Into<String>) -> Self {
        FormState {
            errors: None,
            message: Some(message.into()),
        }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        FormState {
            errors: Some(errors),
            message: Some(message.into()),
        }
    }
}
