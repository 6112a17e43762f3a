//! High-level conversion API: raw export in, discriminated outcome out.
//!
//! Each entry point is synchronous and stateless. Fatal problems come back
//! as [`ConvertError`]; a valid file with nothing to import is a regular
//! outcome, so callers can tell "bad file" from "nothing to import".
//!
//! # Example
//!
//! ```rust,ignore
//! use shopmigrate::{convert_products, ProductOutcome};
//!
//! let outcome = convert_products(&text, Some("https://shop.example.com/media/catalog/product"))?;
//! println!("{}", outcome.message());
//! std::fs::write("shopify_products.csv", outcome.to_csv())?;
//! ```

use serde::Serialize;
use std::path::Path;

use super::customers::{extract_customers, CustomerStats};
use super::products::{extract_products, ConversionStats};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::ConvertResult;
use crate::export::{customers_to_csv, products_to_csv};
use crate::models::{CustomerRecord, ProductRow};
use crate::parser::decode_bytes_auto;

/// How many unresolved variant SKUs are listed in the log.
const UNRESOLVED_SAMPLE: usize = 5;

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a customer conversion that did not fail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CustomerOutcome {
    CustomersFound {
        customers: Vec<CustomerRecord>,
        stats: CustomerStats,
        message: String,
    },
    NoCustomersExtracted {
        stats: CustomerStats,
        message: String,
    },
}

impl CustomerOutcome {
    pub fn message(&self) -> &str {
        match self {
            CustomerOutcome::CustomersFound { message, .. }
            | CustomerOutcome::NoCustomersExtracted { message, .. } => message,
        }
    }

    pub fn stats(&self) -> &CustomerStats {
        match self {
            CustomerOutcome::CustomersFound { stats, .. }
            | CustomerOutcome::NoCustomersExtracted { stats, .. } => stats,
        }
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        match self {
            CustomerOutcome::CustomersFound { customers, .. } => customers,
            CustomerOutcome::NoCustomersExtracted { .. } => &[],
        }
    }

    /// Target CSV text for the extracted customers.
    pub fn to_csv(&self) -> String {
        customers_to_csv(self.customers())
    }
}

/// Result of a product conversion that did not fail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProductOutcome {
    ProductsFound {
        rows: Vec<ProductRow>,
        stats: ConversionStats,
        message: String,
    },
    NoProductsExtracted {
        stats: ConversionStats,
        message: String,
    },
}

impl ProductOutcome {
    pub fn message(&self) -> &str {
        match self {
            ProductOutcome::ProductsFound { message, .. }
            | ProductOutcome::NoProductsExtracted { message, .. } => message,
        }
    }

    pub fn stats(&self) -> &ConversionStats {
        match self {
            ProductOutcome::ProductsFound { stats, .. }
            | ProductOutcome::NoProductsExtracted { stats, .. } => stats,
        }
    }

    pub fn rows(&self) -> &[ProductRow] {
        match self {
            ProductOutcome::ProductsFound { rows, .. } => rows,
            ProductOutcome::NoProductsExtracted { .. } => &[],
        }
    }

    /// Target CSV text for the produced rows.
    pub fn to_csv(&self) -> String {
        products_to_csv(self.rows())
    }
}

// =============================================================================
// Customers
// =============================================================================

/// Convert customer export text.
pub fn convert_customers(text: &str) -> ConvertResult<CustomerOutcome> {
    log_info("👥 Converting customer export...");
    let extraction = extract_customers(text)?;
    let stats = extraction.stats;

    log_success(format!(
        "Header found on line {} (separator '{}')",
        stats.header_line, stats.delimiter
    ));
    log_info(format!("Mapped columns: {}", stats.columns_resolved.join(", ")));
    if stats.skipped_column_mismatch > 0 {
        log_warning(format!(
            "{} rows skipped (column count mismatch)",
            stats.skipped_column_mismatch
        ));
    }
    if stats.dropped_without_content > 0 {
        log_warning(format!(
            "{} rows dropped (no name, email, company, address or phone)",
            stats.dropped_without_content
        ));
    }

    if extraction.customers.is_empty() {
        let message = format!(
            "No customers could be extracted from {} data rows",
            stats.lines_processed
        );
        log_warning(&message);
        return Ok(CustomerOutcome::NoCustomersExtracted { stats, message });
    }

    let message = format!(
        "Found {} customers in {} data rows",
        extraction.customers.len(),
        stats.lines_processed
    );
    log_success(&message);
    Ok(CustomerOutcome::CustomersFound {
        customers: extraction.customers,
        stats,
        message,
    })
}

/// Convert customer export bytes in any supported encoding.
pub fn convert_customers_bytes(bytes: &[u8]) -> ConvertResult<CustomerOutcome> {
    let decoded = decode_bytes_auto(bytes);
    log_info(format!("Detected encoding: {}", decoded.encoding));
    convert_customers(&decoded.text)
}

/// Read and convert a customer export file.
pub fn convert_customers_file(path: &Path) -> ConvertResult<CustomerOutcome> {
    let bytes = std::fs::read(path)?;
    convert_customers_bytes(&bytes)
}

// =============================================================================
// Products
// =============================================================================

/// Convert product export text, resolving relative image paths against `base_url`.
pub fn convert_products(text: &str, base_url: Option<&str>) -> ConvertResult<ProductOutcome> {
    log_info("📦 Converting product export...");
    let extraction = extract_products(text, base_url)?;
    let stats = extraction.stats;

    log_info(format!("{} data rows processed", stats.lines_processed));
    log_info(format!(
        "{} simple, {} configurable, {} other types skipped",
        stats.simple_products, stats.configurable_products, stats.other_types_skipped
    ));
    if stats.skipped_no_sku > 0 {
        log_warning(format!("{} rows skipped (no SKU)", stats.skipped_no_sku));
    }
    if stats.skipped_column_mismatch > 0 {
        log_warning(format!(
            "{} rows skipped (column count mismatch)",
            stats.skipped_column_mismatch
        ));
    }
    if stats.duplicate_configurables > 0 {
        log_warning(format!(
            "{} configurables skipped (SKU already used by another configurable)",
            stats.duplicate_configurables
        ));
    }
    log_info(format!("{} variants attached to configurables", stats.variants_processed));
    if stats.variant_sku_not_found > 0 {
        let sample: Vec<&str> = extraction
            .unresolved_skus
            .iter()
            .take(UNRESOLVED_SAMPLE)
            .map(String::as_str)
            .collect();
        log_warning(format!(
            "{} variant SKUs not found: {}",
            stats.variant_sku_not_found,
            sample.join(", ")
        ));
    }
    if stats.handle_conflicts > 0 {
        log_warning(format!(
            "{} simple products dropped (SKU is also a configurable handle)",
            stats.handle_conflicts
        ));
    }
    if base_url.is_none() && has_relative_images(&extraction.rows) {
        log_warning("Relative image paths kept as-is (no base URL given)");
    }

    if extraction.rows.is_empty() {
        let message = format!(
            "No products could be extracted from {} data rows",
            stats.lines_processed
        );
        log_warning(&message);
        return Ok(ProductOutcome::NoProductsExtracted { stats, message });
    }

    let message = format!(
        "Converted {} products into {} rows ({} configurable, {} standalone)",
        stats.configurable_products + stats.standalone_products,
        stats.rows_emitted,
        stats.configurable_products,
        stats.standalone_products
    );
    log_success(&message);
    Ok(ProductOutcome::ProductsFound {
        rows: extraction.rows,
        stats,
        message,
    })
}

/// Convert product export bytes in any supported encoding.
pub fn convert_products_bytes(bytes: &[u8], base_url: Option<&str>) -> ConvertResult<ProductOutcome> {
    let decoded = decode_bytes_auto(bytes);
    log_info(format!("Detected encoding: {}", decoded.encoding));
    convert_products(&decoded.text, base_url)
}

/// Read and convert a product export file.
pub fn convert_products_file(path: &Path, base_url: Option<&str>) -> ConvertResult<ProductOutcome> {
    let bytes = std::fs::read(path)?;
    convert_products_bytes(&bytes, base_url)
}

fn has_relative_images(rows: &[ProductRow]) -> bool {
    rows.iter().any(|row| {
        let src = &row.variant().image_src;
        !src.is_empty() && !src.starts_with("http://") && !src.starts_with("https://")
    })
}
