//! CSV emission in the target import schema.
//!
//! Output is the header row followed by one line per record, joined with
//! `\n` and without a trailing newline. A field is quoted (with internal
//! quotes doubled) only when it contains a comma, a quote or a line break.

use std::borrow::Cow;

use crate::models::{CustomerRecord, ProductDetails, ProductRow};

/// Customer import columns, in order.
pub const CUSTOMER_HEADERS: [&str; 17] = [
    "First Name",
    "Last Name",
    "Email",
    "Company",
    "Address1",
    "Address2",
    "City",
    "Province",
    "Province Code",
    "Country",
    "Country Code",
    "Zip",
    "Phone",
    "Accepts Marketing",
    "Tags",
    "Note",
    "Tax Exempt",
];

/// Product import columns, in order.
pub const PRODUCT_HEADERS: [&str; 51] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Product Category",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Google Shopping / Google Product Category",
    "Google Shopping / Gender",
    "Google Shopping / Age Group",
    "Google Shopping / MPN",
    "Google Shopping / AdWords Grouping",
    "Google Shopping / AdWords Labels",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
    "Price / International",
    "Compare At Price / International",
    "Status",
];

const GOOGLE_SHOPPING_COLUMNS: usize = 13;

/// Quote a field only when it needs it.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render a decimal without trailing zeros: `10`, `10.5`, `9.99`.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn upper_bool(flag: bool) -> &'static str {
    if flag {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn render_line<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| escape_field(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn render<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    std::iter::once(render_line(headers))
        .chain(rows.into_iter().map(|cells| render_line(&cells)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize customers under [`CUSTOMER_HEADERS`].
pub fn customers_to_csv(customers: &[CustomerRecord]) -> String {
    render(&CUSTOMER_HEADERS, customers.iter().map(customer_cells))
}

fn customer_cells(c: &CustomerRecord) -> Vec<String> {
    vec![
        c.first_name.clone(),
        c.last_name.clone(),
        c.email.clone(),
        c.company.clone(),
        c.address1.clone(),
        c.address2.clone(),
        c.city.clone(),
        c.province.clone(),
        c.province_code.clone(),
        c.country.clone(),
        c.country_code.clone(),
        c.zip.clone(),
        c.phone.clone(),
        yes_no(c.accepts_email_marketing).to_string(),
        c.tags.clone(),
        c.note.clone(),
        yes_no(c.tax_exempt).to_string(),
    ]
}

/// Serialize product rows under [`PRODUCT_HEADERS`].
///
/// Product-level columns are filled only on a handle's parent row.
pub fn products_to_csv(rows: &[ProductRow]) -> String {
    render(&PRODUCT_HEADERS, rows.iter().map(product_cells))
}

fn product_cells(row: &ProductRow) -> Vec<String> {
    let product = row.product();
    let variant = row.variant();
    let product_text = |f: fn(&ProductDetails) -> &str| {
        product.map(f).unwrap_or("").to_string()
    };

    let mut cells = Vec::with_capacity(PRODUCT_HEADERS.len());
    cells.push(row.handle().to_string());
    cells.push(product_text(|p| &p.title));
    cells.push(product_text(|p| &p.body_html));
    cells.push(product_text(|p| &p.vendor));
    cells.push(String::new()); // Product Category
    cells.push(product_text(|p| &p.product_type));
    cells.push(product_text(|p| &p.tags));
    cells.push(product.map(|p| upper_bool(p.published)).unwrap_or("").to_string());
    cells.push(variant.option_name.clone());
    cells.push(variant.option_value.clone());
    cells.extend(std::iter::repeat(String::new()).take(4)); // Option2/Option3
    cells.push(variant.sku.clone());
    cells.push(format!("{}", (variant.weight * 1000.0).round() as i64));
    cells.push("shopify".to_string());
    cells.push(variant.inventory_qty.to_string());
    cells.push("deny".to_string());
    cells.push("manual".to_string());
    cells.push(format_decimal(variant.price));
    cells.push(variant.compare_at_price.map(format_decimal).unwrap_or_default());
    cells.push(upper_bool(true).to_string()); // Requires Shipping
    cells.push(upper_bool(true).to_string()); // Taxable
    cells.push(variant.barcode.clone());
    cells.push(variant.image_src.clone());
    cells.push(if variant.image_src.is_empty() {
        String::new()
    } else {
        variant.image_position.to_string()
    });
    cells.push(variant.image_alt.clone());
    cells.push(product.map(|_| upper_bool(false)).unwrap_or("").to_string()); // Gift Card
    cells.push(product_text(|p| &p.seo_title));
    cells.push(product_text(|p| &p.seo_description));
    cells.extend(std::iter::repeat(String::new()).take(GOOGLE_SHOPPING_COLUMNS));
    cells.push(variant.image_src.clone()); // Variant Image
    cells.push("kg".to_string());
    cells.extend(std::iter::repeat(String::new()).take(4)); // tax code, cost, international prices
    cells.push(if variant.published { "active" } else { "draft" }.to_string());
    cells
}
