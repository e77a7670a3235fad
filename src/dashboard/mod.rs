//! Tenant dashboard: list state, filtering and pagination

mod card;
mod filter;
mod revalidate;

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::TenantRecord;

pub use card::*;
pub use filter::*;
pub use revalidate::*;

pub const PAGE_SIZE_OPTIONS: [usize; 2] = [5, 10];
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Dashboard state
///
/// The visible page is derived in a fixed order: search, then tier, then
/// pagination.
#[derive(Debug, Clone)]
pub struct Dashboard {
    tenants: TenantSnapshot,
    search_term: String,
    selected_tier: TierFilter,
    current_page: usize,
    page_size: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Dashboard {
    pub fn new(tenants: Vec<TenantRecord>) -> Self {
        Self {
            tenants: Arc::new(tenants),
            search_term: String::new(),
            selected_tier: TierFilter::All,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn tenants(&self) -> &[TenantRecord] {
        &self.tenants
    }

    /// Swap in a freshly loaded list; filters and page are kept
    pub fn replace_tenants(&mut self, tenants: TenantSnapshot) {
        self.tenants = tenants;
    }

    /// Apply the newest snapshot from a [`Revalidator`], if there is one
    pub fn sync(&mut self, receiver: &mut watch::Receiver<TenantSnapshot>) -> bool {
        if !receiver.has_changed().unwrap_or(false) {
            return false;
        }
        let snapshot = receiver.borrow_and_update().clone();
        self.replace_tenants(snapshot);
        true
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Change the search term. The current page is left as it is.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn selected_tier(&self) -> TierFilter {
        self.selected_tier
    }

    pub fn set_tier_filter(&mut self, tier: TierFilter) {
        self.selected_tier = tier;
        self.current_page = 1;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.current_page = 1;
    }

    /// Tenants passing search and tier filter
    pub fn filtered(&self) -> Vec<&TenantRecord> {
        filter_tenants(&self.tenants, &self.search_term, self.selected_tier)
    }

    /// Tenants on the current page
    pub fn visible(&self) -> Vec<&TenantRecord> {
        let filtered = self.filtered();
        paginate(&filtered, self.current_page, self.page_size).to_vec()
    }

    pub fn total_filtered(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_count(&self) -> usize {
        let total = self.total_filtered();
        (total + self.page_size - 1) / self.page_size
    }

    pub fn cards(&self) -> Vec<TenantCard<'_>> {
        self.visible().into_iter().map(TenantCard::new).collect()
    }
}
