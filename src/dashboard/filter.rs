//! Search, tier filter and pagination over the tenant list

use std::fmt;
use std::str::FromStr;

use crate::api::{ParseTierError, TenantRecord, TierName};

/// Tier selection of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Only(TierName),
}

impl TierFilter {
    /// Exact match on the raw tier name
    pub fn matches(&self, tenant: &TenantRecord) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(tier) => tenant.tier_name.as_deref() == Some(tier.as_str()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TierFilter::All => "All Tiers",
            TierFilter::Only(tier) => tier.as_str(),
        }
    }
}

impl fmt::Display for TierFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TierFilter {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TierFilter::All);
        }
        s.parse().map(TierFilter::Only)
    }
}

/// Tenants whose name or email contains `search` (ignoring case) and whose
/// tier passes `tier`, in their original order
pub fn filter_tenants<'a>(
    tenants: &'a [TenantRecord],
    search: &str,
    tier: TierFilter,
) -> Vec<&'a TenantRecord> {
    let needle = search.to_lowercase();

    tenants
        .iter()
        .filter(|t| {
            t.full_name.to_lowercase().contains(&needle) || t.email.to_lowercase().contains(&needle)
        })
        .filter(|t| tier.matches(t))
        .collect()
}

/// One page of `items`. `page` is 1-based; pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let page = page.max(1);
    let size = size.max(1);

    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(id: &str, name: &str, email: &str, tier: Option<&str>) -> TenantRecord {
        TenantRecord {
            user_id: id.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            patient_count: 0,
            successful_recordings: 0,
            failed_recordings: 0,
            total_hours: 0.0,
            avg_length_seconds: 0.0,
            avg_file_size_bytes: 0.0,
            tier_name: tier.map(str::to_string),
        }
    }

    fn ids(tenants: &[&TenantRecord]) -> Vec<String> {
        tenants.iter().map(|t| t.user_id.clone()).collect()
    }

    fn sample() -> Vec<TenantRecord> {
        vec![
            tenant("1", "Alice", "alice@clinic.example", Some("Basic")),
            tenant("2", "Bob", "bob@hospital.example", Some("Enterprise")),
            tenant("3", "Carol Alison", "carol@clinic.example", None),
        ]
    }

    #[test]
    fn search_is_case_insensitive() {
        let tenants = sample();
        assert_eq!(ids(&filter_tenants(&tenants[..2], "ali", TierFilter::All)), ["1"]);
        assert_eq!(ids(&filter_tenants(&tenants, "ALI", TierFilter::All)), ["1", "3"]);
    }

    #[test]
    fn search_matches_email() {
        let tenants = sample();
        assert_eq!(
            ids(&filter_tenants(&tenants, "Clinic.Example", TierFilter::All)),
            ["1", "3"]
        );
    }

    #[test]
    fn empty_search_keeps_everything_in_order() {
        let tenants = sample();
        assert_eq!(ids(&filter_tenants(&tenants, "", TierFilter::All)), ["1", "2", "3"]);
    }

    #[test]
    fn tier_filter_is_exact() {
        let tenants = sample();
        let only = TierFilter::Only(TierName::Enterprise);
        assert_eq!(ids(&filter_tenants(&tenants, "", only)), ["2"]);

        let result = filter_tenants(&tenants, "", TierFilter::Only(TierName::Basic));
        assert!(result.iter().all(|t| t.tier_name.as_deref() == Some("Basic")));
    }

    #[test]
    fn search_and_tier_combine() {
        let tenants = sample();
        let result = filter_tenants(&tenants, "clinic", TierFilter::Only(TierName::Basic));
        assert_eq!(ids(&result), ["1"]);
    }

    #[test]
    fn tier_filter_parses() {
        assert_eq!("All".parse::<TierFilter>(), Ok(TierFilter::All));
        assert_eq!(
            "professional".parse::<TierFilter>(),
            Ok(TierFilter::Only(TierName::Professional))
        );
        assert!("Gold".parse::<TierFilter>().is_err());
    }

    #[test]
    fn pages_are_bounded_by_size() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 3, 5), &[11, 12]);
        assert!(paginate(&items, 4, 5).is_empty());

        for size in 1..=13 {
            for page in 1..=14 {
                assert!(paginate(&items, page, size).len() <= size);
            }
        }
    }

    #[test]
    fn degenerate_page_arguments_are_clamped() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 2), &[1, 2]);
        assert_eq!(paginate(&items, 1, 0), &[1]);
        assert!(paginate::<u8>(&[], 1, 5).is_empty());
    }
}
