use crate::models::Tender;
use crate::services::currency::within_bounds;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selector value meaning "no constraint" for category and location.
pub const ALL: &str = "all";
/// Group label for tenders whose category is empty.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Client-side tender filter. Every field is optional; an absent field, an
/// empty string or the `all` sentinel places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TenderFilter {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

fn selector(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty() && *s != ALL)
}

impl TenderFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.search_needle().is_none()
            && selector(&self.category).is_none()
            && selector(&self.location).is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
    }

    fn search_needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a single tender satisfies every active criterion.
    pub fn matches(&self, tender: &Tender) -> bool {
        if let Some(needle) = self.search_needle() {
            if !matches_search(tender, &needle) {
                return false;
            }
        }

        if let Some(category) = selector(&self.category) {
            if category_key(tender) != category {
                return false;
            }
        }

        if let Some(location) = selector(&self.location) {
            if !tender.location.contains(location) {
                return false;
            }
        }

        within_bounds(tender.value, self.min_value, self.max_value)
    }
}

fn matches_search(tender: &Tender, needle: &str) -> bool {
    [
        Some(tender.title.as_str()),
        Some(tender.authority.as_str()),
        tender.organization.as_deref(),
        Some(tender.category.as_str()),
        tender.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Keep the tenders matching `filter`, preserving their order.
pub fn filter_tenders(tenders: &[Tender], filter: &TenderFilter) -> Vec<Tender> {
    let filtered: Vec<Tender> = tenders.iter().filter(|t| filter.matches(t)).cloned().collect();

    tracing::debug!("Tender filter kept {} of {} tenders", filtered.len(), tenders.len());

    filtered
}

pub fn filter_by_category(tenders: &[Tender], category: &str) -> Vec<Tender> {
    if category.is_empty() || category == ALL {
        return tenders.to_vec();
    }
    tenders.iter().filter(|t| category_key(t) == category).cloned().collect()
}

/// Group label for a tender, substituting [`UNCATEGORIZED`] for blanks.
pub fn category_key(tender: &Tender) -> &str {
    let category = tender.category.trim();
    if category.is_empty() {
        UNCATEGORIZED
    } else {
        category
    }
}

/// Group tenders by category. Keys keep first-seen order and each group keeps
/// the input order of its tenders.
pub fn group_by_category<I>(tenders: I) -> IndexMap<String, Vec<Tender>>
where
    I: IntoIterator<Item = Tender>,
{
    let mut groups: IndexMap<String, Vec<Tender>> = IndexMap::new();
    for tender in tenders {
        let key = category_key(&tender).to_string();
        groups.entry(key).or_default().push(tender);
    }
    groups
}

/// Distinct categories, sorted, for the category selector.
pub fn available_categories(tenders: &[Tender]) -> Vec<String> {
    tenders
        .iter()
        .map(|t| category_key(t).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct known locations, sorted. Blank and `N/A` locations are skipped.
pub fn available_locations(tenders: &[Tender]) -> Vec<String> {
    tenders
        .iter()
        .map(|t| t.location.trim())
        .filter(|loc| !loc.is_empty() && *loc != "N/A")
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The first category mentioning "Civil" in encounter order, or `all`.
pub fn default_category(tenders: &[Tender]) -> String {
    tenders
        .iter()
        .map(|t| t.category.as_str())
        .find(|category| category.contains("Civil"))
        .unwrap_or(ALL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tender;

    #[test]
    fn test_search_checks_every_text_field() {
        let mut with_org = tender("1", "Bridge repair", "Civil", None);
        with_org.organization = Some("Public Works Department".to_string());
        let mut with_desc = tender("2", "Road", "Civil", None);
        with_desc.description = Some("Widening of the ring road near the airport".to_string());

        let filter = TenderFilter { search_term: Some("WORKS".to_string()), ..Default::default() };
        assert!(filter.matches(&with_org));
        assert!(!filter.matches(&with_desc));

        let filter = TenderFilter { search_term: Some("airport".to_string()), ..Default::default() };
        assert!(filter.matches(&with_desc));
    }

    #[test]
    fn test_sentinels_are_unconstrained() {
        let filter = TenderFilter {
            search_term: Some("  ".to_string()),
            category: Some(ALL.to_string()),
            location: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.is_unconstrained());
    }

    #[test]
    fn test_category_key_for_blank_category() {
        assert_eq!(category_key(&tender("1", "x", "  ", None)), UNCATEGORIZED);
        assert_eq!(category_key(&tender("1", "x", "Roads", None)), "Roads");
    }

    #[test]
    fn test_default_category_prefers_civil() {
        let tenders = vec![
            tender("1", "a", "Railway", None),
            tender("2", "b", "Civil Works", None),
            tender("3", "c", "Civil", None),
        ];
        assert_eq!(default_category(&tenders), "Civil Works");
        assert_eq!(default_category(&tenders[..1]), ALL);
    }
}
