//! REST API types for client integration.
//!
//! Every conversion answers with the same envelope: a status tag, a
//! human-readable message, the extracted records, the stats and the
//! ready-to-import CSV text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ConvertError;
use crate::transform::pipeline::{CustomerOutcome, ProductOutcome};

/// Status tag for a fatal conversion failure.
pub const PARSE_ERROR_STATUS: &str = "parse_error";

/// Response sent after a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    /// Unique job identifier
    pub job_id: String,

    /// `customers_found`, `no_customers_extracted`, `products_found`
    /// or `no_products_extracted`
    pub status: String,

    pub message: String,

    /// Customers or product rows, as JSON objects
    pub records: Vec<Value>,

    pub stats: Value,

    /// Target import CSV (header only when nothing was extracted)
    pub csv: String,

    pub converted_at: DateTime<Utc>,
}

impl ConversionResponse {
    fn new(status: &str, message: &str, records: Vec<Value>, stats: Value, csv: String) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            message: message.to_string(),
            records,
            stats,
            csv,
            converted_at: Utc::now(),
        }
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

impl From<CustomerOutcome> for ConversionResponse {
    fn from(outcome: CustomerOutcome) -> Self {
        let status = match outcome {
            CustomerOutcome::CustomersFound { .. } => "customers_found",
            CustomerOutcome::NoCustomersExtracted { .. } => "no_customers_extracted",
        };
        let stats = serde_json::to_value(outcome.stats()).unwrap_or(Value::Null);

        ConversionResponse::new(
            status,
            outcome.message(),
            to_values(outcome.customers()),
            stats,
            outcome.to_csv(),
        )
    }
}

impl From<ProductOutcome> for ConversionResponse {
    fn from(outcome: ProductOutcome) -> Self {
        let status = match outcome {
            ProductOutcome::ProductsFound { .. } => "products_found",
            ProductOutcome::NoProductsExtracted { .. } => "no_products_extracted",
        };
        let stats = serde_json::to_value(outcome.stats()).unwrap_or(Value::Null);

        ConversionResponse::new(
            status,
            outcome.message(),
            to_values(outcome.rows()),
            stats,
            outcome.to_csv(),
        )
    }
}

/// Body for a fatal conversion error.
pub fn error_response(error: &ConvertError) -> Value {
    error_body(PARSE_ERROR_STATUS, &error.to_string())
}

/// Body for a malformed request.
pub fn request_error(message: &str) -> Value {
    error_body("error", message)
}

fn error_body(status: &str, message: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": status,
        "message": message,
        "records": [],
        "stats": null,
        "csv": "",
        "convertedAt": Utc::now(),
    })
}
