//! Domain models produced by the conversion engine.
//!
//! - [`CustomerRecord`] - One customer in the target import schema
//! - [`ProductRow`] - One row of the target product schema, either the
//!   [`ParentVariantRow`] that opens a handle or a [`ContinuationVariantRow`]
//! - [`ProductDetails`] / [`VariantDetails`] - Product-level and variant-level fields
//!
//! Records are built once by the reconcilers and never mutated afterwards.

use serde::{Deserialize, Serialize};

// =============================================================================
// Customers
// =============================================================================

/// A customer in the target import schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Opaque identity token (source id, or a generated UUID).
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub province_code: String,
    pub country: String,
    pub country_code: String,
    pub zip: String,
    pub accepts_email_marketing: bool,
    pub accepts_sms_marketing: bool,
    pub tags: String,
    pub note: String,
    pub tax_exempt: bool,
}

impl CustomerRecord {
    /// A record is worth importing when any identifying or contact field is set.
    pub fn has_content(&self) -> bool {
        [
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.address1,
            &self.phone,
        ]
        .iter()
        .any(|v| !v.is_empty())
    }
}

// =============================================================================
// Products
// =============================================================================

/// Option name/value pair used when a product has no real variants.
pub const DEFAULT_OPTION_NAME: &str = "Title";
pub const DEFAULT_OPTION_VALUE: &str = "Default Title";

/// Fields stated once per handle, on its first row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
    pub published: bool,
    pub seo_title: String,
    pub seo_description: String,
}

/// Fields every row carries for its own variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetails {
    pub sku: String,
    pub option_name: String,
    pub option_value: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<f64>,
    pub inventory_qty: i64,
    /// Weight in kilograms.
    pub weight: f64,
    pub barcode: String,
    pub image_src: String,
    /// 1-based row position within the handle.
    pub image_position: u32,
    pub image_alt: String,
    pub published: bool,
}

/// First row of a handle: the product itself and its first variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentVariantRow {
    pub handle: String,
    pub product: ProductDetails,
    pub variant: VariantDetails,
}

/// Any further variant under an already-opened handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationVariantRow {
    pub handle: String,
    pub variant: VariantDetails,
}

/// One row of the target product schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProductRow {
    Parent(ParentVariantRow),
    Continuation(ContinuationVariantRow),
}

impl ProductRow {
    pub fn handle(&self) -> &str {
        match self {
            ProductRow::Parent(row) => &row.handle,
            ProductRow::Continuation(row) => &row.handle,
        }
    }

    pub fn variant(&self) -> &VariantDetails {
        match self {
            ProductRow::Parent(row) => &row.variant,
            ProductRow::Continuation(row) => &row.variant,
        }
    }

    /// Product-level fields, present only on the row that opens a handle.
    pub fn product(&self) -> Option<&ProductDetails> {
        match self {
            ProductRow::Parent(row) => Some(&row.product),
            ProductRow::Continuation(_) => None,
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, ProductRow::Parent(_))
    }
}

// =============================================================================
// Tests
// =============================================================================
