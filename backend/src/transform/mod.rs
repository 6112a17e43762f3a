//! Transformation module.
//!
//! This module turns tokenized export rows into target records:
//! - Fields: Logical field tables and their header aliases
//! - Customers: One customer per source row
//! - Products: Three-pass reconciliation of simple and configurable products
//! - Pipeline: Decoding, conversion and outcome reporting

pub mod customers;
pub mod fields;
pub mod image;
pub mod pipeline;
pub mod products;
pub mod tags;
pub mod values;

pub use customers::{extract_customers, inspect_customer_header, CustomerExtraction, CustomerStats};
pub use fields::{CustomerField, ProductField};
pub use image::resolve_image_url;
pub use pipeline::*;
pub use products::{extract_products, ConversionStats, ProductExtraction};
pub use tags::category_tags;
