//! Product reconciliation: flat simple/configurable rows to handle-grouped rows.
//!
//! # Algorithm
//!
//! ```text
//! Pass 1  classify     every data row → simple map (by SKU) | configurable list | skipped
//! Pass 2  expand       each configurable → ParentVariantRow (first resolved variant)
//!                                          + ContinuationVariantRow per further variant
//!                      resolved simples are taken out of the map
//! Pass 3  standalone   simples never referenced → one ParentVariantRow each
//! ```
//!
//! Configurables reference simples by SKU string only. A reference to a SKU
//! missing from the map is counted and skipped, never fatal.
//!
//! Every handle opens exactly one parent row: a repeated configurable SKU is
//! skipped, and a leftover simple whose SKU is already a configurable handle
//! is not emitted standalone.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::fields::ProductField;
use super::image::resolve_image_url;
use super::tags::category_tags;
use super::values::{is_published, parse_decimal, parse_quantity};
use crate::error::{ConvertError, ConvertResult};
use crate::models::{
    ContinuationVariantRow, ParentVariantRow, ProductDetails, ProductRow, VariantDetails,
    DEFAULT_OPTION_NAME, DEFAULT_OPTION_VALUE,
};
use crate::parser::{detect_delimiter, tokenize_line, HeaderIndex, RawRecord};

/// Option name used when a configurable has no variation labels.
pub const FALLBACK_OPTION_NAME: &str = "Option";

/// Attribute set names that carry no product-type information.
const GENERIC_ATTRIBUTE_SETS: &[&str] = &["default"];

type Record<'a> = RawRecord<'a, ProductField>;

/// Per-stage counters of one product conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub lines_processed: usize,
    pub skipped_no_sku: usize,
    pub skipped_column_mismatch: usize,
    pub simple_products: usize,
    pub configurable_products: usize,
    /// Configurables whose SKU was already seen on an earlier configurable.
    pub duplicate_configurables: usize,
    pub other_types_skipped: usize,
    pub variants_processed: usize,
    pub variant_sku_not_found: usize,
    pub standalone_products: usize,
    /// Unreferenced simples dropped because a configurable owns their handle.
    pub handle_conflicts: usize,
    pub rows_emitted: usize,
}

/// Rows produced from one product export.
#[derive(Debug, Clone)]
pub struct ProductExtraction {
    pub rows: Vec<ProductRow>,
    pub stats: ConversionStats,
    /// Variant SKUs referenced by a configurable but absent from the export.
    pub unresolved_skus: Vec<String>,
}

/// One entry of a configurable's variation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationSpec {
    pub sku: String,
    pub option_value: String,
}

/// Simple products by SKU, in first-seen order.
///
/// A repeated SKU replaces the earlier row but keeps its position.
struct SimpleCatalog<'a> {
    slots: Vec<Option<Record<'a>>>,
    by_sku: HashMap<String, usize>,
}

impl<'a> SimpleCatalog<'a> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_sku: HashMap::new(),
        }
    }

    fn insert(&mut self, sku: String, record: Record<'a>) {
        match self.by_sku.get(&sku) {
            Some(&slot) => self.slots[slot] = Some(record),
            None => {
                self.by_sku.insert(sku, self.slots.len());
                self.slots.push(Some(record));
            }
        }
    }

    /// Remove and return a simple product; it is consumed as a variant.
    fn take(&mut self, sku: &str) -> Option<Record<'a>> {
        let slot = self.by_sku.remove(sku)?;
        self.slots.get_mut(slot).and_then(Option::take)
    }

    fn into_remaining(self) -> impl Iterator<Item = Record<'a>> {
        self.slots.into_iter().flatten()
    }
}

/// Image position counter of one handle: 1 on the first row, then one more per row.
struct ImagePositions {
    next: u32,
}

impl ImagePositions {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn advance(&mut self) -> u32 {
        let position = self.next;
        self.next += 1;
        position
    }
}

/// Convert a product export into target rows.
///
/// The header must be on the first line and resolve a SKU column.
pub fn extract_products(text: &str, base_url: Option<&str>) -> ConvertResult<ProductExtraction> {
    if text.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.iter().filter(|l| !l.trim().is_empty()).count() < 2 {
        return Err(ConvertError::TooFewLines);
    }

    let header_line = lines[0];
    let delimiter = detect_delimiter(header_line);
    let index = HeaderIndex::<ProductField>::resolve(&tokenize_line(header_line, delimiter));
    if !index.contains(ProductField::Sku) {
        return Err(ConvertError::MissingColumn("sku"));
    }

    let mut stats = ConversionStats::default();
    let mut simples = SimpleCatalog::new();
    let mut configurables: Vec<Record<'_>> = Vec::new();
    let mut handles: HashSet<String> = HashSet::new();

    // Pass 1: classification
    for (i, line) in lines.iter().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        stats.lines_processed += 1;

        let record = RawRecord::new(&index, tokenize_line(line, delimiter), i + 1);

        let Some(sku) = record.non_empty(ProductField::Sku).map(String::from) else {
            stats.skipped_no_sku += 1;
            continue;
        };

        if record.len() != index.width() {
            stats.skipped_column_mismatch += 1;
            continue;
        }

        let product_type = record
            .non_empty(ProductField::ProductType)
            .map(str::to_lowercase)
            .unwrap_or_else(|| "simple".to_string());

        match product_type.as_str() {
            "simple" => {
                stats.simple_products += 1;
                simples.insert(sku, record);
            }
            "configurable" => {
                if handles.insert(sku) {
                    stats.configurable_products += 1;
                    configurables.push(record);
                } else {
                    stats.duplicate_configurables += 1;
                }
            }
            _ => stats.other_types_skipped += 1,
        }
    }

    let mut rows = Vec::new();
    let mut unresolved_skus = Vec::new();

    // Pass 2: configurable expansion
    for configurable in &configurables {
        expand_configurable(
            configurable,
            &mut simples,
            base_url,
            &mut rows,
            &mut stats,
            &mut unresolved_skus,
        );
    }

    // Pass 3: standalone simples
    for simple in simples.into_remaining() {
        if handles.contains(simple.text(ProductField::Sku)) {
            stats.handle_conflicts += 1;
            continue;
        }
        stats.standalone_products += 1;
        rows.push(single_variant_row(&simple, base_url));
    }

    stats.rows_emitted = rows.len();
    Ok(ProductExtraction {
        rows,
        stats,
        unresolved_skus,
    })
}

/// Emit the rows of one configurable product.
///
/// The first resolvable variant shares the parent row; later ones become
/// continuation rows. Without any resolvable variant the configurable is
/// emitted as a single-variant product.
fn expand_configurable(
    configurable: &Record<'_>,
    simples: &mut SimpleCatalog<'_>,
    base_url: Option<&str>,
    rows: &mut Vec<ProductRow>,
    stats: &mut ConversionStats,
    unresolved: &mut Vec<String>,
) {
    let handle = configurable.text(ProductField::Sku).to_string();
    let option_name = option_name(configurable.get(ProductField::ConfigurableVariationLabels));
    let specs = parse_variations(
        configurable.text(ProductField::ConfigurableVariations),
        &option_name,
    );

    let mut product = Some(product_details(configurable));
    let mut positions = ImagePositions::new();

    for spec in specs {
        let Some(simple) = simples.take(&spec.sku) else {
            stats.variant_sku_not_found += 1;
            unresolved.push(spec.sku);
            continue;
        };
        stats.variants_processed += 1;

        let option_value = if spec.option_value.is_empty() {
            spec.sku
        } else {
            spec.option_value
        };
        let mut variant = variant_details(&simple, base_url, &option_name, &option_value);

        match product.take() {
            Some(details) => {
                // The parent row falls back to the configurable's own image.
                if variant.image_src.is_empty() {
                    variant.image_src =
                        resolve_image_url(configurable.text(ProductField::Image), base_url);
                    variant.image_alt = configurable.text(ProductField::ImageLabel).to_string();
                }
                variant.image_position = positions.advance();
                rows.push(ProductRow::Parent(ParentVariantRow {
                    handle: handle.clone(),
                    product: details,
                    variant,
                }));
            }
            None => {
                variant.image_position = positions.advance();
                rows.push(ProductRow::Continuation(ContinuationVariantRow {
                    handle: handle.clone(),
                    variant,
                }));
            }
        }
    }

    if let Some(details) = product {
        let mut variant = variant_details(
            configurable,
            base_url,
            DEFAULT_OPTION_NAME,
            DEFAULT_OPTION_VALUE,
        );
        variant.image_position = positions.advance();
        rows.push(ProductRow::Parent(ParentVariantRow {
            handle,
            product: details,
            variant,
        }));
    }
}

/// A product that stands alone, with the default single option.
fn single_variant_row(record: &Record<'_>, base_url: Option<&str>) -> ProductRow {
    let mut variant = variant_details(record, base_url, DEFAULT_OPTION_NAME, DEFAULT_OPTION_VALUE);
    variant.image_position = ImagePositions::new().advance();

    ProductRow::Parent(ParentVariantRow {
        handle: record.text(ProductField::Sku).to_string(),
        product: product_details(record),
        variant,
    })
}

/// The option name is the label text before the first `=`.
pub fn option_name(labels: Option<&str>) -> String {
    labels
        .and_then(|l| l.split('=').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_OPTION_NAME)
        .to_string()
}

/// Parse a `|`-separated list of `key=value,key=value` variant specs.
///
/// The `sku` key matches case-insensitively, as does `option_name`.
pub fn parse_variations(raw: &str, option_name: &str) -> Vec<VariationSpec> {
    raw.split('|')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(|spec| {
            let mut variation = VariationSpec {
                sku: String::new(),
                option_value: String::new(),
            };
            for (key, value) in spec.split(',').filter_map(|pair| pair.split_once('=')) {
                let key = key.trim();
                if key.eq_ignore_ascii_case("sku") {
                    variation.sku = value.trim().to_string();
                } else if key.eq_ignore_ascii_case(option_name) {
                    variation.option_value = value.trim().to_string();
                }
            }
            variation
        })
        .collect()
}

fn publication(record: &Record<'_>) -> bool {
    is_published(
        record.get(ProductField::Visibility),
        record.get(ProductField::Status),
    )
}

fn product_details(record: &Record<'_>) -> ProductDetails {
    let body_html = record
        .non_empty(ProductField::Description)
        .or_else(|| record.non_empty(ProductField::ShortDescription))
        .unwrap_or("")
        .to_string();

    let product_type = record
        .non_empty(ProductField::AttributeSet)
        .filter(|set| !GENERIC_ATTRIBUTE_SETS.contains(&set.to_lowercase().as_str()))
        .unwrap_or("")
        .to_string();

    ProductDetails {
        title: record.text(ProductField::Name).to_string(),
        body_html,
        vendor: record.text(ProductField::Vendor).to_string(),
        product_type,
        tags: category_tags(record.text(ProductField::Categories)),
        published: publication(record),
        seo_title: record.text(ProductField::MetaTitle).to_string(),
        seo_description: record.text(ProductField::MetaDescription).to_string(),
    }
}

/// Variant-level fields of a row. Image position is assigned by the caller.
fn variant_details(
    record: &Record<'_>,
    base_url: Option<&str>,
    option_name: &str,
    option_value: &str,
) -> VariantDetails {
    let regular = parse_decimal(record.get(ProductField::Price));
    let special = parse_decimal(record.get(ProductField::SpecialPrice));
    let (price, compare_at_price) = if special > 0.0 && special < regular {
        (special, Some(regular))
    } else {
        (regular, None)
    };

    VariantDetails {
        sku: record.text(ProductField::Sku).to_string(),
        option_name: option_name.to_string(),
        option_value: option_value.to_string(),
        price,
        compare_at_price,
        inventory_qty: parse_quantity(record.get(ProductField::Qty)),
        weight: parse_decimal(record.get(ProductField::Weight)),
        barcode: record.text(ProductField::Barcode).to_string(),
        image_src: resolve_image_url(record.text(ProductField::Image), base_url),
        image_position: 0,
        image_alt: record.text(ProductField::ImageLabel).to_string(),
        published: publication(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "sku,product_type,name,price,configurable_variations,configurable_variation_labels";

    fn parents(rows: &[ProductRow]) -> usize {
        rows.iter().filter(|r| r.is_parent()).count()
    }

    #[test]
    fn test_configurable_consumes_its_simple() {
        let csv = format!(
            "{}\nA,simple,Widget,10,,\nCFG,configurable,Widget Group,,\"sku=A,Color=Red\",Color=Colour\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.rows.len(), 1);
        let ProductRow::Parent(row) = &result.rows[0] else {
            panic!("expected parent row");
        };
        assert_eq!(row.handle, "CFG");
        assert_eq!(row.product.title, "Widget Group");
        assert_eq!(row.variant.sku, "A");
        assert_eq!(row.variant.option_name, "Color");
        assert_eq!(row.variant.option_value, "Red");
        assert_eq!(row.variant.price, 10.0);

        assert_eq!(result.stats.variants_processed, 1);
        assert_eq!(result.stats.standalone_products, 0);
        assert!(result.rows.iter().all(|r| r.handle() != "A"));
    }

    #[test]
    fn test_multiple_variants_share_handle() {
        let csv = format!(
            "{}\nS,simple,Shirt S,10,,\nM,simple,Shirt M,12,,\nL,simple,Shirt L,14,,\n\
             SHIRT,configurable,Shirt,,\"sku=S,size=Small|sku=M,size=Medium|sku=L,size=Large\",size=Size\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.rows.len(), 3);
        assert_eq!(parents(&result.rows), 1);
        assert!(result.rows.iter().all(|r| r.handle() == "SHIRT"));
        assert!(result.rows[0].is_parent());

        let values: Vec<&str> = result
            .rows
            .iter()
            .map(|r| r.variant().option_value.as_str())
            .collect();
        assert_eq!(values, vec!["Small", "Medium", "Large"]);
        assert_eq!(result.rows[2].variant().price, 14.0);
        assert_eq!(result.stats.variants_processed, 3);
    }

    #[test]
    fn test_unresolved_variant_counted_and_skipped() {
        let csv = format!(
            "{}\nA,simple,Widget,10,,\nCFG,configurable,Group,,\"sku=MISSING,color=Blue|sku=A,color=Red\",color=Color\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.stats.variant_sku_not_found, 1);
        assert_eq!(result.unresolved_skus, vec!["MISSING".to_string()]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].variant().sku, "A");
        assert!(result.rows.iter().all(|r| r.variant().sku != "MISSING"));
    }

    #[test]
    fn test_configurable_without_resolvable_variants() {
        let csv = format!(
            "{}\nCFG,configurable,Lonely,25,\"sku=GONE,color=Red\",color=Color\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.rows.len(), 1);
        let variant = result.rows[0].variant();
        assert_eq!(variant.sku, "CFG");
        assert_eq!(variant.option_name, "Title");
        assert_eq!(variant.option_value, "Default Title");
        assert_eq!(variant.price, 25.0);
    }

    #[test]
    fn test_standalone_simples_keep_input_order() {
        let csv = format!("{}\nB,simple,Bee,1,,\nA,simple,Ay,2,,\n", HEADER);
        let result = extract_products(&csv, None).unwrap();

        let handles: Vec<&str> = result.rows.iter().map(ProductRow::handle).collect();
        assert_eq!(handles, vec!["B", "A"]);
        assert_eq!(result.stats.standalone_products, 2);
        assert_eq!(result.rows[0].variant().option_name, "Title");
    }

    #[test]
    fn test_row_level_skips() {
        let csv = format!(
            "{}\n,simple,No Sku,1,,\nX,simple,Short\nV,virtual,Download,5,,\nOK,simple,Fine,1,,\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.stats.lines_processed, 4);
        assert_eq!(result.stats.skipped_no_sku, 1);
        assert_eq!(result.stats.skipped_column_mismatch, 1);
        assert_eq!(result.stats.other_types_skipped, 1);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_missing_type_column_defaults_to_simple() {
        let csv = "sku,name,price\nA,Widget,3,50\n";
        let result = extract_products(csv, None).unwrap();
        // "3,50" splits into two fields, so the row is misaligned.
        assert_eq!(result.stats.skipped_column_mismatch, 1);

        let csv = "sku;name;price\nA;Widget;3,50\n";
        let result = extract_products(csv, None).unwrap();
        assert_eq!(result.stats.simple_products, 1);
        assert_eq!(result.rows[0].variant().price, 3.5);
    }

    #[test]
    fn test_fatal_conditions() {
        assert!(matches!(extract_products("", None), Err(ConvertError::EmptyInput)));
        assert!(matches!(extract_products("sku,name\n", None), Err(ConvertError::TooFewLines)));
        assert!(matches!(
            extract_products("id,name\n1,x\n", None),
            Err(ConvertError::MissingColumn("sku"))
        ));
    }

    #[test]
    fn test_product_fields_and_images() {
        let csv = "sku,name,description,categories,base_image,visibility,product_online,attribute_set_code,special_price,price\n\
                   A,Tee,<p>Soft</p>,\"Default Category/Men/Shirts,Default Category/Sale\",/t/e/tee.jpg,\"Catalog, Search\",1,Apparel,8,10\n";
        let result = extract_products(csv, Some("https://shop.example.com/media/")).unwrap();

        let ProductRow::Parent(row) = &result.rows[0] else {
            panic!("expected parent row");
        };
        assert_eq!(row.product.body_html, "<p>Soft</p>");
        assert_eq!(row.product.tags, "Men, Shirts, Sale");
        assert_eq!(row.product.product_type, "Apparel");
        assert!(row.product.published);
        assert_eq!(row.variant.image_src, "https://shop.example.com/media/t/e/tee.jpg");
        assert_eq!(row.variant.image_position, 1);
        assert_eq!(row.variant.price, 8.0);
        assert_eq!(row.variant.compare_at_price, Some(10.0));
    }

    #[test]
    fn test_image_positions_sequential_per_handle() {
        let csv = "sku,product_type,image,configurable_variations,configurable_variation_labels\n\
                   R,simple,r.jpg,,\nG,simple,g.jpg,,\nCFG,configurable,cfg.jpg,\"sku=R,color=Red|sku=G,color=Green\",color=Color\n";
        let result = extract_products(csv, None).unwrap();

        let positions: Vec<u32> = result.rows.iter().map(|r| r.variant().image_position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(result.rows[0].variant().image_src, "r.jpg");
    }

    #[test]
    fn test_image_positions_count_rows_without_images() {
        let csv = "sku,product_type,image,configurable_variations,configurable_variation_labels\n\
                   R,simple,,,\nG,simple,g.jpg,,\nS,simple,,,\nCFG,configurable,,\"sku=R,color=Red|sku=G,color=Green\",color=Color\n";
        let result = extract_products(csv, None).unwrap();

        let positions: Vec<(&str, &str, u32)> = result
            .rows
            .iter()
            .map(|r| (r.handle(), r.variant().sku.as_str(), r.variant().image_position))
            .collect();
        assert_eq!(positions, vec![("CFG", "R", 1), ("CFG", "G", 2), ("S", "S", 1)]);
        assert_eq!(result.rows[0].variant().image_src, "");
        assert_eq!(result.rows[1].variant().image_src, "g.jpg");
    }

    #[test]
    fn test_configurable_and_simple_sharing_sku_open_one_handle() {
        let csv = "sku,product_type,name,configurable_variations,configurable_variation_labels\n\
                   X,simple,Plain X,,\nY,simple,Plain Y,,\nX,configurable,Group X,\"sku=Y,c=1\",c=C\n";
        let result = extract_products(csv, None).unwrap();

        let parents: Vec<&str> = result
            .rows
            .iter()
            .filter(|r| r.is_parent())
            .map(ProductRow::handle)
            .collect();
        assert_eq!(parents, vec!["X"]);
        assert_eq!(result.rows[0].product().unwrap().title, "Group X");
        assert_eq!(result.rows[0].variant().sku, "Y");
        assert_eq!(result.stats.handle_conflicts, 1);
        assert_eq!(result.stats.standalone_products, 0);
    }

    #[test]
    fn test_repeated_configurable_skipped() {
        let csv = "sku,product_type,name,configurable_variations,configurable_variation_labels\n\
                   A,simple,A,,\nB,simple,B,,\n\
                   CFG,configurable,First,\"sku=A,c=1\",c=C\nCFG,configurable,Second,\"sku=B,c=2\",c=C\n";
        let result = extract_products(csv, None).unwrap();

        assert_eq!(result.rows.iter().filter(|r| r.is_parent()).count(), 2);
        assert_eq!(result.rows[0].handle(), "CFG");
        assert_eq!(result.rows[0].product().unwrap().title, "First");
        assert_eq!(result.rows[1].handle(), "B");
        assert_eq!(result.stats.configurable_products, 1);
        assert_eq!(result.stats.duplicate_configurables, 1);
    }

    #[test]
    fn test_missing_option_value_uses_variant_sku() {
        let csv = format!(
            "{}\nA-1,simple,One,5,,\nCFG,configurable,Group,,\"sku=A-1,size=\",color=Color\n",
            HEADER
        );
        let result = extract_products(&csv, None).unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].variant().option_name, "color");
        assert_eq!(result.rows[0].variant().option_value, "A-1");
    }

    #[test]
    fn test_duplicate_simple_sku_last_wins() {
        let csv = format!("{}\nA,simple,First,1,,\nA,simple,Second,2,,\n", HEADER);
        let result = extract_products(&csv, None).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].product().unwrap().title, "Second");
    }

    #[test]
    fn test_parse_variations() {
        let specs = parse_variations("sku=A,Color=Red| SKU=B , color = Blue |", "color");
        assert_eq!(
            specs,
            vec![
                VariationSpec { sku: "A".into(), option_value: "Red".into() },
                VariationSpec { sku: "B".into(), option_value: "Blue".into() },
            ]
        );
    }

    #[test]
    fn test_option_name() {
        assert_eq!(option_name(Some("Color=Colour,size=Size")), "Color");
        assert_eq!(option_name(Some("")), FALLBACK_OPTION_NAME);
        assert_eq!(option_name(None), FALLBACK_OPTION_NAME);
    }
}
