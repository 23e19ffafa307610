use std::collections::BTreeMap;

use serde::Serialize;

pub const PARAM_LIMIT: &str = "limit";
pub const PARAM_OFFSET: &str = "offset";
pub const PARAM_NAME_STARTS_WITH: &str = "nameStartsWith";
pub const PARAM_API_KEY: &str = "apikey";

/// One immutable snapshot of what the user is asking for.
///
/// Transitions never edit a snapshot in place; each returns the next one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryState {
    pub search: String,
    pub page_size: u32,
    pub page: i64,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            page_size,
            page: 0,
        }
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: 0,
            ..self.clone()
        }
    }

    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self {
            page_size,
            page: 0,
            ..self.clone()
        }
    }

    /// Not clamped: a negative or past-the-end page is the caller's problem.
    pub fn moved_by(&self, delta: i64) -> Self {
        Self {
            page: self.page.saturating_add(delta),
            ..self.clone()
        }
    }

    pub fn display_page(&self) -> i64 {
        self.page.saturating_add(1)
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(i64::from(self.page_size))
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::default();
        params.insert(PARAM_LIMIT, self.page_size.to_string());
        params.insert(PARAM_OFFSET, self.offset().to_string());
        if !self.search.is_empty() {
            params.insert(PARAM_NAME_STARTS_WITH, self.search.clone());
        }
        params
    }
}

/// Query string handed to the transport. Ordered so requests log and compare
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with the credential removed, for logs and events.
    pub fn redacted(&self) -> Self {
        let mut params = self.clone();
        if params.0.contains_key(PARAM_API_KEY) {
            params.insert(PARAM_API_KEY, "<redacted>");
        }
        params
    }
}

/// `ceil(total / page_size)`; a zero page size yields zero pages.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub requests_issued: u64,
    pub responses_applied: u64,
    pub responses_discarded: u64,
    pub failures: u64,
    pub duplicates_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_page_size_reset_page() {
        let state = QueryState::new(10).moved_by(3);
        assert_eq!(state.page, 3);
        assert_eq!(state.with_search("spi").page, 0);
        assert_eq!(state.with_page_size(25).page, 0);
        assert_eq!(state.with_page_size(25).search, "");
    }

    #[test]
    fn move_page_is_not_clamped() {
        let state = QueryState::new(25).moved_by(-2);
        assert_eq!(state.page, -2);
        assert_eq!(state.offset(), -50);
        assert_eq!(state.display_page(), -1);
    }

    #[test]
    fn params_omit_empty_search() {
        let params = QueryState::new(10).to_params();
        assert_eq!(params.get(PARAM_LIMIT), Some("10"));
        assert_eq!(params.get(PARAM_OFFSET), Some("0"));
        assert!(!params.contains_key(PARAM_NAME_STARTS_WITH));
    }

    #[test]
    fn params_carry_search_and_offset() {
        let params = QueryState::new(25).with_search("Spi").moved_by(2).to_params();
        assert_eq!(params.get(PARAM_NAME_STARTS_WITH), Some("Spi"));
        assert_eq!(params.get(PARAM_OFFSET), Some("50"));
        assert_eq!(params.get(PARAM_LIMIT), Some("25"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(101, 25), 5);
        assert_eq!(total_pages(100, 25), 4);
        assert_eq!(total_pages(0, 25), 0);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn redacted_params_hide_credential() {
        let mut params = QueryState::new(10).to_params();
        params.insert(PARAM_API_KEY, "secret");
        let redacted = params.redacted();
        assert_eq!(redacted.get(PARAM_API_KEY), Some("<redacted>"));
        assert_eq!(params.get(PARAM_API_KEY), Some("secret"));
    }
}
