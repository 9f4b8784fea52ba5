use std::collections::BTreeMap;

use crate::model::DocumentId;

/// Fixed ceiling for "fetch everything" list calls. The store caps response
/// sizes anyway; asking for more than this is a sign the caller wants
/// pagination instead.
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Options accepted by every list-returning repository call.
///
/// Unset pagination leaves the store's defaults in charge (page 1, store
/// page size). Filters are field-to-value equality matches; `user` scopes
/// the list to records authored by one member.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Sort keys in `field` or `field:desc` form, applied in order.
    pub sort: Vec<String>,
    pub filters: BTreeMap<String, String>,
    pub user: Option<DocumentId>,
    /// Escape hatch for operators the equality filters cannot express,
    /// passed through verbatim.
    pub raw: Vec<(String, String)>,
}

impl ListOptions {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Options for an unpaginated fetch, bounded by [`MAX_LIST_LIMIT`].
    pub fn unbounded() -> Self {
        Self {
            page: Some(1),
            page_size: Some(MAX_LIST_LIMIT),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn by_user(mut self, user: DocumentId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn raw_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.raw.push((key.into(), value.into()));
        self
    }

    /// Render as store query parameters.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("pagination[page]".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        }
        for (i, key) in self.sort.iter().enumerate() {
            params.push((format!("sort[{i}]"), key.clone()));
        }
        for (field, value) in &self.filters {
            params.push((format!("filters{}[$eq]", bracketed(field)), value.clone()));
        }
        if let Some(user) = &self.user {
            params.push((
                "filters[author][documentId][$eq]".to_string(),
                user.to_string(),
            ));
        }
        params.extend(self.raw.iter().cloned());
        params
    }
}

/// Render a dotted field path as store bracket syntax:
/// `tournament.documentId` becomes `[tournament][documentId]`.
fn bracketed(field: &str) -> String {
    field
        .split('.')
        .map(|segment| format!("[{segment}]"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pagination_sort_and_filters() {
        let params = ListOptions::page(2, 10)
            .sorted_by("matchDate:desc")
            .filter("homeTeam", "SC Blau-Weiß")
            .by_user(DocumentId::from("u-1"))
            .to_params();
        assert!(params.contains(&("pagination[page]".into(), "2".into())));
        assert!(params.contains(&("pagination[pageSize]".into(), "10".into())));
        assert!(params.contains(&("sort[0]".into(), "matchDate:desc".into())));
        assert!(params.contains(&("filters[homeTeam][$eq]".into(), "SC Blau-Weiß".into())));
        assert!(params.contains(&("filters[author][documentId][$eq]".into(), "u-1".into())));
    }

    #[test]
    fn dotted_filter_paths_nest() {
        let params = ListOptions::default()
            .filter("tournament.documentId", "t-3")
            .to_params();
        assert!(params.contains(&("filters[tournament][documentId][$eq]".into(), "t-3".into())));
    }

    #[test]
    fn default_options_send_nothing() {
        assert!(ListOptions::default().to_params().is_empty());
    }

    #[test]
    fn unbounded_uses_the_fixed_limit() {
        let params = ListOptions::unbounded().to_params();
        assert!(params.contains(&("pagination[pageSize]".into(), MAX_LIST_LIMIT.to_string())));
    }
}
