//! # Shopmigrate - Store export conversion to the Shopify import schema
//!
//! Shopmigrate reads the customer and product CSV exports of a legacy store
//! and rewrites them as CSV files the Shopify importers accept.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Export CSV │────▶│   Parser    │────▶│  Transform   │────▶│ Shopify CSV │
//! │  (ISO/UTF8) │     │ (auto-enc)  │     │ (reconcile)  │     │  (emitter)  │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shopmigrate::{convert_products_file, ProductOutcome};
//!
//! let outcome = convert_products_file("catalog_product.csv".as_ref(), None)?;
//! if let ProductOutcome::ProductsFound { rows, .. } = &outcome {
//!     println!("{} rows", rows.len());
//! }
//! std::fs::write("products_export.csv", outcome.to_csv())?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Fatal error types
//! - [`models`] - Target records (customers, product rows)
//! - [`parser`] - Decoding, delimiter detection, tokenizing, header resolution
//! - [`transform`] - Customer and product reconciliation
//! - [`export`] - CSV emission
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConvertError, ConvertResult, ServerError, ServerResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ContinuationVariantRow,
    CustomerRecord,
    ParentVariantRow,
    ProductDetails,
    ProductRow,
    VariantDetails,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_bytes_auto,
    decode_content,
    detect_delimiter,
    detect_encoding,
    tokenize_line,
    DecodedInput,
    HeaderIndex,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert_customers,
    convert_customers_bytes,
    convert_customers_file,
    convert_products,
    convert_products_bytes,
    convert_products_file,
    CustomerOutcome,
    ProductOutcome,
};

pub use transform::{CustomerStats, ConversionStats};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{customers_to_csv, products_to_csv, CUSTOMER_HEADERS, PRODUCT_HEADERS};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ConversionResponse};
pub use config::Config;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
