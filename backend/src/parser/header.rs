//! Header resolution: mapping logical fields to column positions.
//!
//! Each entity declares its logical fields as an enum implementing
//! [`LogicalField`], with an ordered alias list per field. A header row is
//! resolved once into a [`HeaderIndex`]; rows are then read through it by
//! enum value rather than by column name.

use std::marker::PhantomData;

use super::{detect_delimiter, strip_bom, tokenize_line};

/// How many non-blank lines are tried as header candidates.
pub const HEADER_SCAN_LINES: usize = 10;

/// A fixed set of logical fields with their accepted column spellings.
pub trait LogicalField: Copy + Eq + std::fmt::Debug + 'static {
    /// Every field, in ordinal order.
    const ALL: &'static [Self];

    /// Position of this field in [`Self::ALL`].
    fn ordinal(self) -> usize;

    /// Accepted header spellings, lower-case, highest priority first.
    fn aliases(self) -> &'static [&'static str];

    /// Stable identifier used in diagnostics.
    fn name(self) -> &'static str;
}

/// Normalizes a header cell: BOM stripped (first column only), trimmed, lower-cased.
pub fn normalize_header(value: &str, column: usize) -> String {
    let value = if column == 0 { strip_bom(value) } else { value };
    value.trim().to_lowercase()
}

/// Resolved positions of every logical field of `F` in one header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex<F: LogicalField> {
    positions: Vec<Option<usize>>,
    columns: Vec<String>,
    _field: PhantomData<F>,
}

impl<F: LogicalField> HeaderIndex<F> {
    /// Resolve a tokenized header row.
    ///
    /// For each field the aliases are tried in order and the first one present
    /// wins, so a field never maps to more than one column.
    pub fn resolve(headers: &[String]) -> Self {
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| normalize_header(h, i))
            .collect();

        let mut positions = vec![None; F::ALL.len()];
        for field in F::ALL {
            positions[field.ordinal()] = field
                .aliases()
                .iter()
                .find_map(|alias| columns.iter().position(|c| c == alias));
        }

        Self {
            positions,
            columns,
            _field: PhantomData,
        }
    }

    /// Column position of a field, if it resolved.
    pub fn position(&self, field: F) -> Option<usize> {
        self.positions.get(field.ordinal()).copied().flatten()
    }

    pub fn contains(&self, field: F) -> bool {
        self.position(field).is_some()
    }

    /// Number of columns in the header row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Normalized header names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fields that resolved, in ordinal order.
    pub fn resolved(&self) -> Vec<(F, usize)> {
        F::ALL
            .iter()
            .filter_map(|f| self.position(*f).map(|pos| (*f, pos)))
            .collect()
    }
}

/// One data row read through a [`HeaderIndex`].
#[derive(Debug, Clone)]
pub struct RawRecord<'a, F: LogicalField> {
    index: &'a HeaderIndex<F>,
    fields: Vec<String>,
    /// 1-based line number in the source text.
    pub line: usize,
}

impl<'a, F: LogicalField> RawRecord<'a, F> {
    pub fn new(index: &'a HeaderIndex<F>, fields: Vec<String>, line: usize) -> Self {
        Self {
            index,
            fields,
            line,
        }
    }

    /// Value of a field, or `None` when the column is absent from the header
    /// or missing from this row.
    pub fn get(&self, field: F) -> Option<&str> {
        self.index
            .position(field)
            .and_then(|pos| self.fields.get(pos))
            .map(String::as_str)
    }

    /// Value of a field, empty when absent.
    pub fn text(&self, field: F) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Non-empty value of a field.
    pub fn non_empty(&self, field: F) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn has_column(&self, field: F) -> bool {
        self.index.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A located header row.
#[derive(Debug, Clone)]
pub struct HeaderRow<F: LogicalField> {
    /// 0-based index of the header line in the input's line list.
    pub line_index: usize,
    pub delimiter: char,
    pub index: HeaderIndex<F>,
}

/// Scan the first [`HEADER_SCAN_LINES`] non-blank lines for a header row.
///
/// A candidate is accepted when `anchor` resolves, or when at least
/// `min_keywords` of `keywords` resolve. Each candidate is tokenized with its
/// own detected delimiter.
pub fn find_header_row<F: LogicalField>(
    lines: &[&str],
    anchor: F,
    keywords: &[F],
    min_keywords: usize,
) -> Option<HeaderRow<F>> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .take(HEADER_SCAN_LINES)
        .find_map(|(line_index, line)| {
            let delimiter = detect_delimiter(line);
            let index = HeaderIndex::<F>::resolve(&tokenize_line(line, delimiter));
            let keyword_hits = keywords.iter().filter(|k| index.contains(**k)).count();

            (index.contains(anchor) || keyword_hits >= min_keywords).then_some(HeaderRow {
                line_index,
                delimiter,
                index,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Demo {
        Key,
        Label,
        Amount,
    }

    impl LogicalField for Demo {
        const ALL: &'static [Self] = &[Demo::Key, Demo::Label, Demo::Amount];

        fn ordinal(self) -> usize {
            self as usize
        }

        fn aliases(self) -> &'static [&'static str] {
            match self {
                Demo::Key => &["key", "id"],
                Demo::Label => &["label", "name"],
                Demo::Amount => &["amount"],
            }
        }

        fn name(self) -> &'static str {
            match self {
                Demo::Key => "key",
                Demo::Label => "label",
                Demo::Amount => "amount",
            }
        }
    }

    fn headers(line: &str) -> Vec<String> {
        tokenize_line(line, ',')
    }

    #[test]
    fn test_resolve_case_insensitive_and_trimmed() {
        let index = HeaderIndex::<Demo>::resolve(&headers(" KEY , Label"));
        assert_eq!(index.position(Demo::Key), Some(0));
        assert_eq!(index.position(Demo::Label), Some(1));
        assert_eq!(index.position(Demo::Amount), None);
    }

    #[test]
    fn test_alias_priority_beats_column_order() {
        // "key" is listed before "id", so it wins even though "id" comes first.
        let index = HeaderIndex::<Demo>::resolve(&headers("id,key"));
        assert_eq!(index.position(Demo::Key), Some(1));
    }

    #[test]
    fn test_bom_only_stripped_from_first_column() {
        let index = HeaderIndex::<Demo>::resolve(&headers("\u{feff}key,\u{feff}label"));
        assert_eq!(index.position(Demo::Key), Some(0));
        assert_eq!(index.position(Demo::Label), None);
    }

    #[test]
    fn test_raw_record_access() {
        let index = HeaderIndex::<Demo>::resolve(&headers("key,label"));
        let record = RawRecord::new(&index, headers("A,"), 2);
        assert_eq!(record.get(Demo::Key), Some("A"));
        assert_eq!(record.non_empty(Demo::Label), None);
        assert_eq!(record.get(Demo::Amount), None);
        assert_eq!(record.text(Demo::Amount), "");
    }

    #[test]
    fn test_find_header_skips_banner_lines() {
        let lines = vec!["Export of 2024-01-01", "", "name;amount;other", "x;1;2"];
        let row = find_header_row(&lines, Demo::Key, &[Demo::Label, Demo::Amount], 2).unwrap();
        assert_eq!(row.line_index, 2);
        assert_eq!(row.delimiter, ';');
    }

    #[test]
    fn test_find_header_anchor_alone_suffices() {
        let lines = vec!["banner", "id,whatever"];
        let row = find_header_row(&lines, Demo::Key, &[Demo::Label, Demo::Amount], 2).unwrap();
        assert_eq!(row.line_index, 1);
    }

    #[test]
    fn test_find_header_respects_scan_window() {
        let mut lines: Vec<&str> = vec!["banner"; HEADER_SCAN_LINES];
        lines.push("key,label");
        assert!(find_header_row(&lines, Demo::Key, &[Demo::Label], 1).is_none());

        lines.remove(0);
        assert!(find_header_row(&lines, Demo::Key, &[Demo::Label], 1).is_some());
    }
}
