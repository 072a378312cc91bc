//! Query parameters for the paged emission-factor search.

use crate::config::types::ExtractSettings;

/// Query for one search page: page size, non-empty filters sorted by
/// name, then the page number.
#[must_use]
pub fn build_search_query(settings: &ExtractSettings, page: u32) -> Vec<(String, String)> {
    let mut query = Vec::with_capacity(settings.filters.len() + 2);
    query.push((
        "results_per_page".to_string(),
        settings.results_per_page.to_string(),
    ));
    query.extend(
        settings
            .filters
            .iter()
            .map(|(name, value)| (name, value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.clone(), value.to_string())),
    );
    query.push(("page".to_string(), page.to_string()));
    query
}
