use super::item::Item;

/// Project `items` onto those whose title contains `query`, ignoring case.
///
/// A blank query (empty or whitespace only) matches everything. Order is preserved.
pub fn derive_filtered_list(items: &[Item], query: &str) -> Vec<Item> {
    if query.trim().is_empty() {
        return items.to_vec();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
