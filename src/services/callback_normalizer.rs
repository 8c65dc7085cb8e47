// services/callback_normalizer.rs
use chrono::Utc;
use serde_json::{Number, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::errors::{AppError, Result};
use crate::models::callback::InboundCallback;
use crate::models::payment_record::{
    FailureAudit, PaymentRecord, PaymentStatus, FAILED_AT_FIELD, NO_CODE, NO_DESCRIPTION,
    RECEIVED_AT_FIELD, UNKNOWN_PHONE,
};

/// Keys tried for one step of a field's fallback chain.
pub type FieldRule = &'static [&'static str];

// Fallback chains, highest priority first. Each rule is looked up in the nested
// payload, then at the top level, before the next rule is tried.
pub const RESULT_CODE_KEYS: &[FieldRule] = &[&["ResultCode", "resultCode"]];
pub const TRANSACTION_CODE_KEYS: &[FieldRule] = &[&["MpesaReceiptNumber"], &["CheckoutRequestID"]];
pub const AMOUNT_KEYS: &[FieldRule] = &[&["Amount", "amount"]];
pub const PHONE_KEYS: &[FieldRule] = &[&["MSISDN", "Phone"]];
pub const REFERENCE_KEYS: &[FieldRule] = &[
    &["ExternalReference", "external_reference"],
    &["CheckoutRequestID"],
];
pub const RESULT_DESCRIPTION_KEYS: &[FieldRule] = &[&["ResultDesc", "resultDesc", "ResultDescription"]];
pub const CHECKOUT_REQUEST_ID_KEYS: &[FieldRule] = &[&["CheckoutRequestID"]];
pub const MERCHANT_REQUEST_ID_KEYS: &[FieldRule] = &[&["MerchantRequestID"]];
pub const GATEWAY_STATUS_KEYS: &[FieldRule] = &[&["Status"]];

const FALLBACK_PREFIX: &str = "FALLBACK";

/// First present value along a fallback chain.
///
/// Null and blank strings count as absent. The winning value is returned as-is;
/// coercion happens afterwards so a present-but-garbled value still wins.
pub fn first_present<'a>(callback: &'a InboundCallback, chain: &[FieldRule]) -> Option<&'a Value> {
    let sources = callback.sources();
    for rule in chain {
        for &source in &sources {
            let found = rule
                .iter()
                .filter_map(|key| source.get(*key))
                .find(|value| is_present(value));
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Strings pass through trimmed; numbers are rendered. Anything else has no text form.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|a| a.is_finite())
}

pub fn coerce_result_code(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        _ => None,
    }
}

/// Only a numeric zero is a successful payment. `"0"` and a missing code are failures.
pub fn status_for(result_code: Option<&Number>) -> PaymentStatus {
    match result_code.and_then(Number::as_f64) {
        Some(code) if code == 0.0 => PaymentStatus::Success,
        _ => PaymentStatus::Failed,
    }
}

/// Drops every character outside `[A-Za-z0-9_-]`.
pub fn sanitize_reference(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Synthesizes a document key for callbacks that carry no usable reference.
///
/// Shape: `FALLBACK-<unix millis>[-<last 4 phone digits>]-<8 random hex>`. Not
/// guaranteed unique, only unlikely to collide.
pub fn fallback_reference(phone: Option<&str>) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();

    let digits: Vec<char> = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    if digits.len() >= 4 {
        let tail: String = digits[digits.len() - 4..].iter().collect();
        format!("{}-{}-{}-{}", FALLBACK_PREFIX, millis, tail, random)
    } else {
        format!("{}-{}-{}", FALLBACK_PREFIX, millis, random)
    }
}

/// Derives the canonical record for a callback. Never fails: unusable fields fall
/// back to their documented defaults.
pub fn normalize(callback: &InboundCallback) -> PaymentRecord {
    let text = |chain: &[FieldRule]| first_present(callback, chain).and_then(coerce_text);

    let result_code = first_present(callback, RESULT_CODE_KEYS).and_then(coerce_result_code);
    let status = status_for(result_code.as_ref());

    let amount = match first_present(callback, AMOUNT_KEYS) {
        Some(value) => coerce_amount(value).unwrap_or_else(|| {
            debug!("Amount {} is not numeric, recording 0", value);
            0.0
        }),
        None => 0.0,
    };

    let phone = text(PHONE_KEYS);

    let reference = text(REFERENCE_KEYS)
        .map(|raw| sanitize_reference(&raw))
        .filter(|sanitized| !sanitized.is_empty())
        .unwrap_or_else(|| fallback_reference(phone.as_deref()));

    PaymentRecord {
        transaction_code: text(TRANSACTION_CODE_KEYS).unwrap_or_else(|| NO_CODE.to_string()),
        amount,
        phone: phone.unwrap_or_else(|| UNKNOWN_PHONE.to_string()),
        status,
        result_code,
        result_description: text(RESULT_DESCRIPTION_KEYS)
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        reference,
        checkout_request_id: text(CHECKOUT_REQUEST_ID_KEYS),
        merchant_request_id: text(MERCHANT_REQUEST_ID_KEYS),
        gateway_status: text(GATEWAY_STATUS_KEYS),
        raw_callback: callback.raw().clone(),
    }
}

/// Normalizes inbound callbacks and merge-writes them into the document store.
#[derive(Clone)]
pub struct CallbackService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    failure_collection: String,
    timeout: Duration,
}

impl CallbackService {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        CallbackService {
            store,
            collection: config.callback_collection.clone(),
            failure_collection: config.failure_collection.clone(),
            timeout: config.store_timeout(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Stores the record for `callback` under its reference.
    ///
    /// Store failures are returned unchanged after a best-effort audit write; nothing is
    /// retried here.
    pub async fn record(&self, callback: InboundCallback) -> Result<PaymentRecord> {
        let raw_payload = serde_json::Value::Object(callback.raw().clone());
        debug!("Raw callback payload: {}", raw_payload);

        let record = normalize(&callback);

        match self.persist(&record).await {
            Ok(()) => {
                info!(
                    "✅ Callback stored: reference={} status={} backend={}",
                    record.reference,
                    record.status.as_str(),
                    self.backend()
                );
                Ok(record)
            }
            Err(e) => {
                error!("❌ Failed to store callback {}: {}", record.reference, e);
                self.audit_failure(&record, &e).await;
                Err(e)
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        bounded(self.timeout, self.store.ping()).await
    }

    async fn persist(&self, record: &PaymentRecord) -> Result<()> {
        let fields = record.to_fields()?;
        bounded(
            self.timeout,
            self.store
                .upsert_merge(&self.collection, &record.reference, fields, RECEIVED_AT_FIELD),
        )
        .await
    }

    async fn audit_failure(&self, record: &PaymentRecord, cause: &AppError) {
        let audit = FailureAudit {
            reference: &record.reference,
            error: cause.to_string(),
            raw_callback: &record.raw_callback,
        };

        let fields = match audit.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Could not build failure audit for {}: {}", record.reference, e);
                return;
            }
        };

        let key = fallback_reference(Some(&record.phone));
        let write = self
            .store
            .upsert_merge(&self.failure_collection, &key, fields, FAILED_AT_FIELD);

        if let Err(e) = bounded(self.timeout, write).await {
            warn!("⚠️ Failure audit for {} was not written: {}", record.reference, e);
        }
    }
}

async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreTimeout(limit.as_millis() as u64)),
    }
}
