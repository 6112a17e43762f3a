//! Tag derivation from category paths.

/// Root segment every category tree of the source platform starts with.
const ROOT_CATEGORY: &str = "default category";

/// Turn a category field into a tag list.
///
/// Trees are comma-separated and levels slash-separated. Every level becomes
/// a tag, in order of first appearance, without duplicates, empty segments,
/// or the root category.
///
/// ```
/// use shopmigrate::transform::tags::category_tags;
///
/// assert_eq!(
///     category_tags("Default Category/Men/Shirts, Default Category/Sale"),
///     "Men, Shirts, Sale"
/// );
/// ```
pub fn category_tags(categories: &str) -> String {
    let mut tags: Vec<&str> = Vec::new();

    for segment in categories.split(',').flat_map(|tree| tree.split('/')) {
        let segment = segment.trim();
        if segment.is_empty() || segment.eq_ignore_ascii_case(ROOT_CATEGORY) {
            continue;
        }
        if !tags.contains(&segment) {
            tags.push(segment);
        }
    }

    tags.join(", ")
}
