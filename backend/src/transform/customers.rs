//! Customer reconciliation: source customer export rows to [`CustomerRecord`]s.
//!
//! The header row is located by scanning (exports sometimes prepend banner
//! lines), then every following line is mapped through the resolved
//! [`HeaderIndex`]. Rows that are blank, badly misaligned, or carry no
//! identifying data are skipped and counted.

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use super::fields::CustomerField;
use super::values::parse_flag;
use crate::error::{ConvertError, ConvertResult};
use crate::models::CustomerRecord;
use crate::parser::{
    find_header_row, is_empty_row, tokenize_line, HeaderIndex, LogicalField, RawRecord,
    HEADER_SCAN_LINES,
};

/// Source columns folded into the synthesized tag list, with their tag keys.
const TAG_SOURCES: &[(&str, CustomerField)] = &[
    ("website", CustomerField::Website),
    ("store", CustomerField::Store),
    ("group", CustomerField::GroupId),
    ("created", CustomerField::CreatedAt),
    ("vat", CustomerField::VatNumber),
];

/// Per-run counters of the customer reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    /// 1-based line number of the detected header row.
    pub header_line: usize,
    pub delimiter: char,
    /// Logical fields that resolved to a column.
    pub columns_resolved: Vec<&'static str>,
    pub lines_processed: usize,
    pub skipped_blank: usize,
    pub skipped_column_mismatch: usize,
    pub dropped_without_content: usize,
    pub customers: usize,
}

/// Records extracted from one customer export.
#[derive(Debug, Clone)]
pub struct CustomerExtraction {
    pub customers: Vec<CustomerRecord>,
    pub stats: CustomerStats,
}

/// Map a customer export to customer records.
///
/// Fails only when the input is empty or no header row is found in the
/// scan window.
pub fn extract_customers(text: &str) -> ConvertResult<CustomerExtraction> {
    if text.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let lines: Vec<&str> = text.lines().collect();
    let header = find_header_row(
        &lines,
        CustomerField::Email,
        CustomerField::HEADER_KEYWORDS,
        CustomerField::MIN_HEADER_KEYWORDS,
    )
    .ok_or(ConvertError::HeaderNotFound {
        scanned: HEADER_SCAN_LINES,
    })?;

    let mut stats = CustomerStats {
        header_line: header.line_index + 1,
        delimiter: header.delimiter,
        columns_resolved: header
            .index
            .resolved()
            .into_iter()
            .map(|(field, _)| field.name())
            .collect(),
        ..Default::default()
    };

    let mut customers = Vec::new();

    for (offset, line) in lines.iter().enumerate().skip(header.line_index + 1) {
        if line.trim().is_empty() {
            stats.skipped_blank += 1;
            continue;
        }

        let fields = tokenize_line(line, header.delimiter);
        if is_empty_row(&fields) {
            stats.skipped_blank += 1;
            continue;
        }

        stats.lines_processed += 1;

        if diverges(fields.len(), header.index.width()) {
            stats.skipped_column_mismatch += 1;
            continue;
        }

        let record = RawRecord::new(&header.index, fields, offset + 1);
        let customer = build_customer(&record);

        if customer.has_content() {
            customers.push(customer);
        } else {
            stats.dropped_without_content += 1;
        }
    }

    stats.customers = customers.len();
    Ok(CustomerExtraction { customers, stats })
}

/// A row is misaligned when its width is off by more than half the header's.
fn diverges(row_width: usize, header_width: usize) -> bool {
    row_width.abs_diff(header_width) > header_width / 2
}

fn build_customer(record: &RawRecord<'_, CustomerField>) -> CustomerRecord {
    use CustomerField as F;

    let (first_name, last_name) = derive_names(
        record.get(F::LastName),
        record.get(F::ContactPerson),
        record.get(F::FirstName),
    );

    let country = record.text(F::Country).to_string();
    let mut country_code = record.text(F::CountryCode).to_string();
    if country_code.is_empty() && is_country_code(&country) {
        country_code = country.clone();
    }

    let id = record
        .non_empty(F::Id)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    CustomerRecord {
        id,
        first_name,
        last_name,
        email: record.text(F::Email).to_string(),
        phone: record.text(F::Phone).to_string(),
        company: record.text(F::Company).to_string(),
        address1: record.text(F::Address1).to_string(),
        address2: record.text(F::Address2).to_string(),
        city: record.text(F::City).to_string(),
        province: record.text(F::Province).to_string(),
        province_code: record.text(F::ProvinceCode).to_string(),
        country,
        country_code,
        zip: record.text(F::Zip).to_string(),
        // The source has no reliable consent column.
        accepts_email_marketing: false,
        accepts_sms_marketing: false,
        tags: synthesize_tags(record),
        note: record.text(F::Note).to_string(),
        tax_exempt: parse_flag(record.get(F::TaxExempt)),
    }
}

/// Work out first and last name from the available name columns.
///
/// 1. A last-name column is used verbatim.
/// 2. With a contact-person column as well, stripping the known last name
///    from its end leaves the first name.
/// 3. Otherwise the contact person is split on whitespace: first token is the
///    first name, the rest the last name if none is known yet.
/// 4. A still-missing first name falls back to the first-name column.
pub fn derive_names(
    last_name: Option<&str>,
    contact: Option<&str>,
    first_name: Option<&str>,
) -> (String, String) {
    let mut last = last_name.unwrap_or("").trim().to_string();
    let contact = contact.unwrap_or("").trim();
    let mut first = String::new();

    if !last.is_empty() && !contact.is_empty() {
        if let Some(stripped) = strip_trailing_name(contact, &last) {
            first = stripped;
        }
    }

    if first.is_empty() && !contact.is_empty() && !contact.eq_ignore_ascii_case(&last) {
        let mut parts = contact.split_whitespace();
        first = parts.next().unwrap_or("").to_string();
        if last.is_empty() {
            last = parts.collect::<Vec<_>>().join(" ");
        }
    }

    if first.is_empty() {
        first = first_name.unwrap_or("").trim().to_string();
    }

    (first, last)
}

/// Remove a trailing, case-insensitive occurrence of `name` from `full`.
fn strip_trailing_name(full: &str, name: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"(?i)\s*{}\s*$", regex::escape(name))).ok()?;
    if !pattern.is_match(full) {
        return None;
    }

    let rest = pattern.replace(full, "").trim().to_string();
    (!rest.is_empty()).then_some(rest)
}

/// Two upper-case ASCII letters, e.g. `DE`.
fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase())
}

/// Build `key:value` tags from the bookkeeping columns that carry a value.
fn synthesize_tags(record: &RawRecord<'_, CustomerField>) -> String {
    TAG_SOURCES
        .iter()
        .filter_map(|(key, field)| record.non_empty(*field).map(|v| format!("{}:{}", key, v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve only the header of a customer export, for inspection.
pub fn inspect_customer_header(text: &str) -> Option<(usize, HeaderIndex<CustomerField>)> {
    let lines: Vec<&str> = text.lines().collect();
    find_header_row(
        &lines,
        CustomerField::Email,
        CustomerField::HEADER_KEYWORDS,
        CustomerField::MIN_HEADER_KEYWORDS,
    )
    .map(|row| (row.line_index + 1, row.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extraction() {
        let csv = "email,firstname,lastname,city,country_id\n\
                   ada@example.com,Ada,Lovelace,London,GB\n";
        let result = extract_customers(csv).unwrap();

        assert_eq!(result.customers.len(), 1);
        let ada = &result.customers[0];
        assert_eq!(ada.email, "ada@example.com");
        assert_eq!(ada.first_name, "Ada");
        assert_eq!(ada.last_name, "Lovelace");
        assert_eq!(ada.country, "GB");
        assert_eq!(ada.country_code, "GB");
        assert!(!ada.accepts_email_marketing);
        assert!(!ada.id.is_empty());
        assert_eq!(result.stats.header_line, 1);
    }

    #[test]
    fn test_header_after_banner_lines() {
        let csv = "Customer export\nGenerated by shop admin\n\nCompany;City;Telephone\nACME;Berlin;030 123\n";
        let result = extract_customers(csv).unwrap();

        assert_eq!(result.stats.header_line, 4);
        assert_eq!(result.stats.delimiter, ';');
        assert_eq!(result.customers[0].company, "ACME");
        assert_eq!(result.customers[0].phone, "030 123");
    }

    #[test]
    fn test_header_on_line_eleven_not_found() {
        let mut csv = String::new();
        for i in 0..10 {
            csv.push_str(&format!("banner line {}\n", i));
        }
        csv.push_str("email,firstname\nx@example.com,X\n");

        let err = extract_customers(&csv).unwrap_err();
        assert!(matches!(err, ConvertError::HeaderNotFound { scanned: 10 }));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(extract_customers("  \n "), Err(ConvertError::EmptyInput)));
    }

    #[test]
    fn test_names_last_name_and_contact() {
        let (first, last) = derive_names(Some("Hopper"), Some("Grace HOPPER"), None);
        assert_eq!(first, "Grace");
        assert_eq!(last, "Hopper");
    }

    #[test]
    fn test_names_regex_characters_escaped() {
        let (first, last) = derive_names(Some("Smith (Jr.)"), Some("John Smith (Jr.)"), None);
        assert_eq!(first, "John");
        assert_eq!(last, "Smith (Jr.)");
    }

    #[test]
    fn test_names_split_contact_without_last_name() {
        let (first, last) = derive_names(None, Some("Jean Luc Picard"), Some("ignored"));
        assert_eq!(first, "Jean");
        assert_eq!(last, "Luc Picard");
    }

    #[test]
    fn test_names_contact_not_ending_in_last_name() {
        let (first, last) = derive_names(Some("Doe"), Some("John Smith"), None);
        assert_eq!(first, "John");
        assert_eq!(last, "Doe");
    }

    #[test]
    fn test_names_contact_equal_to_last_name_is_not_split() {
        let (first, last) = derive_names(Some("Smith"), Some("smith"), Some("John"));
        assert_eq!(first, "John");
        assert_eq!(last, "Smith");

        let (first, _) = derive_names(Some("Smith"), Some("SMITH"), None);
        assert_eq!(first, "");
    }

    #[test]
    fn test_names_fall_back_to_first_name_column() {
        let (first, last) = derive_names(Some("Curie"), None, Some("Marie"));
        assert_eq!(first, "Marie");
        assert_eq!(last, "Curie");
    }

    #[test]
    fn test_tags_synthesized_from_present_values() {
        let csv = "email,_website,_store,group_id,created_at,taxvat\n\
                   a@example.com,base,,1,2024-01-02,\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(
            result.customers[0].tags,
            "website:base, group:1, created:2024-01-02"
        );
    }

    #[test]
    fn test_rows_without_content_dropped() {
        let csv = "email,firstname,lastname,note\n,,,just a note\nb@example.com,,,\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(result.customers.len(), 1);
        assert_eq!(result.stats.dropped_without_content, 1);
    }

    #[test]
    fn test_blank_and_misaligned_rows_skipped() {
        let csv = "email,firstname,lastname,city\n\n,,,\nshort\na@example.com,A,B,C\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(result.customers.len(), 1);
        assert_eq!(result.stats.skipped_blank, 2);
        assert_eq!(result.stats.skipped_column_mismatch, 1);
    }

    #[test]
    fn test_lower_case_country_is_not_a_code() {
        let csv = "email,country\na@example.com,de\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(result.customers[0].country_code, "");
    }

    #[test]
    fn test_source_id_kept() {
        let csv = "entity_id,email\n42,a@example.com\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(result.customers[0].id, "42");
    }

    #[test]
    fn test_bom_on_first_header() {
        let csv = "\u{feff}email,firstname\na@example.com,A\n";
        let result = extract_customers(csv).unwrap();
        assert_eq!(result.customers[0].email, "a@example.com");
    }

    #[test]
    fn test_inspect_header() {
        let (line, index) = inspect_customer_header("x\nemail,phone\n").unwrap();
        assert_eq!(line, 2);
        assert_eq!(index.position(CustomerField::Phone), Some(1));
    }
}
