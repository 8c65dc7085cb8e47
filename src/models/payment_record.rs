// models/payment_record.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::{AppError, Result};

/// Field the store stamps with its own clock when a payment record is written.
pub const RECEIVED_AT_FIELD: &str = "receivedAt";

/// Field the store stamps on failure audit records.
pub const FAILED_AT_FIELD: &str = "failedAt";

pub const NO_CODE: &str = "NO-CODE";
pub const UNKNOWN_PHONE: &str = "UNKNOWN";
pub const NO_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Canonical record derived from one callback and stored under `reference`.
///
/// `receivedAt` is not part of the struct: the store assigns it on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub transaction_code: String,
    pub amount: f64,
    pub phone: String,
    pub status: PaymentStatus,
    pub result_code: Option<Number>,
    pub result_description: String,
    pub reference: String,

    // Extra identifiers PayHero delivers alongside the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_status: Option<String>,

    pub raw_callback: Map<String, Value>,
}

impl PaymentRecord {
    /// The record as store fields, ready for a merge-write.
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        to_document_fields(self)
    }
}

/// 200 body returned to the gateway once a record is stored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackAck {
    pub success: bool,
    pub document_id: String,
    pub status: PaymentStatus,
}

impl From<&PaymentRecord> for CallbackAck {
    fn from(record: &PaymentRecord) -> Self {
        CallbackAck {
            success: true,
            document_id: record.reference.clone(),
            status: record.status,
        }
    }
}

/// Written best-effort when a payment record could not be stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureAudit<'a> {
    pub reference: &'a str,
    pub error: String,
    pub raw_callback: &'a Map<String, Value>,
}

impl FailureAudit<'_> {
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        to_document_fields(self)
    }
}

/// Serializes an outbound value into store fields. Failures here are ours, not the
/// gateway's, so they never surface as a malformed payload.
pub(crate) fn to_document_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(value).map_err(|e| AppError::Serialization(e.to_string()))?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::Serialization(format!(
            "expected a document, serialized to {}",
            other
        ))),
    }
}
