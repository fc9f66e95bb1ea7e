use std::collections::HashMap;

use crate::error::ApiError;
use crate::model::SchemeScope;

pub const PAGE_DEFAULT: u64 = 0;
pub const PER_PAGE_DEFAULT: u64 = 60;
pub const PER_PAGE_MAXIMUM: u64 = 200;

/// Typed request parameters, populated once when the request context is
/// built and immutable afterwards. Empty strings mean "not provided";
/// whether that is an error is the validation chain's call, not ours.
/// The one exception is a value that cannot be coerced at all (a
/// non-integer page, an unknown scope token), which fails here.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub user_id: String,
    pub scheme_id: String,
    pub category: String,
    pub preference_name: String,
    pub scope: Option<SchemeScope>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            scheme_id: String::new(),
            category: String::new(),
            preference_name: String::new(),
            scope: None,
            page: PAGE_DEFAULT,
            per_page: PER_PAGE_DEFAULT,
        }
    }
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the query string into the store. Scope, page, and per_page are
    /// coerced to their typed forms; per_page is clamped to the maximum.
    pub fn apply_query(&mut self, query: &HashMap<String, String>) -> Result<(), ApiError> {
        if let Some(raw) = query.get("scope") {
            self.scope = SchemeScope::from_param(raw).ok_or_else(|| ApiError::invalid_param("scope"))?;
        }

        if let Some(raw) = query.get("page") {
            self.page = raw.parse().map_err(|_| ApiError::invalid_param("page"))?;
        }

        if let Some(raw) = query.get("per_page") {
            let per_page: u64 = raw.parse().map_err(|_| ApiError::invalid_param("per_page"))?;
            self.per_page = per_page.min(PER_PAGE_MAXIMUM);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let mut params = RequestParams::new();
        params.apply_query(&query(&[])).unwrap();

        assert_eq!(params.page, PAGE_DEFAULT);
        assert_eq!(params.per_page, PER_PAGE_DEFAULT);
        assert_eq!(params.scope, None);
    }

    #[test]
    fn per_page_is_clamped_to_maximum() {
        let mut params = RequestParams::new();
        params.apply_query(&query(&[("per_page", "100000")])).unwrap();

        assert_eq!(params.per_page, PER_PAGE_MAXIMUM);
    }

    #[test]
    fn scope_tokens_coerce_to_the_enum() {
        let mut params = RequestParams::new();
        params.apply_query(&query(&[("scope", "team")])).unwrap();
        assert_eq!(params.scope, Some(SchemeScope::Team));

        let mut params = RequestParams::new();
        params.apply_query(&query(&[("scope", "")])).unwrap();
        assert_eq!(params.scope, None);
    }

    #[test]
    fn unknown_scope_token_is_a_structural_failure() {
        let mut params = RequestParams::new();
        let err = params.apply_query(&query(&[("scope", "global")])).unwrap_err();
        assert_eq!(err, ApiError::invalid_param("scope"));
    }

    #[test]
    fn non_integer_page_is_a_structural_failure() {
        let mut params = RequestParams::new();
        let err = params.apply_query(&query(&[("page", "two")])).unwrap_err();
        assert_eq!(err, ApiError::invalid_param("page"));

        // negative values cannot coerce into an unsigned page either
        let mut params = RequestParams::new();
        let err = params.apply_query(&query(&[("page", "-1")])).unwrap_err();
        assert_eq!(err, ApiError::invalid_param("page"));
    }
}
